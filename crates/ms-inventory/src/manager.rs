//! Entry points the network layer calls: joining users, opening and closing
//! windows, clicks, direct slot writes and item pickup.
//!
//! Every handler appends the view updates it causes to `out` before it
//! returns, so the caller can flush them in order.

use std::collections::HashMap;

use ms_item::ItemStack;
use tracing::{debug, info, warn};

use crate::click::{ClaimedItem, ClickAction, ClickContext, ClickWindow};
use crate::container::{ActionLog, Container, ContainerArena};
use crate::error::{ClickError, InventoryError};
use crate::outbound::{Outbound, CURSOR_SLOT, CURSOR_WINDOW};
use crate::player::{PlayerInventory, PlayerState, HOTBAR, MAIN};
use crate::recipe::RecipeBook;
use crate::storage::ContainerStorage;
use crate::view::WindowView;
use crate::window::{WindowKind, WindowSession, WindowTarget};
use crate::{BlockPos, UserId};

/// Result of a click that passed validation.
struct ClickOutcome {
    changed: bool,
    container_changed: bool,
    drops: Vec<ItemStack>,
}

/// Owns every joined user's inventory, the open containers and the recipe
/// book.
pub struct InventoryManager {
    players: HashMap<UserId, PlayerState>,
    containers: ContainerArena,
    recipes: RecipeBook,
}

impl InventoryManager {
    pub fn new(recipes: RecipeBook) -> Self {
        Self {
            players: HashMap::new(),
            containers: ContainerArena::new(),
            recipes,
        }
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    pub fn player(&self, user: UserId) -> Option<&PlayerState> {
        self.players.get(&user)
    }

    pub fn player_mut(&mut self, user: UserId) -> Option<&mut PlayerState> {
        self.players.get_mut(&user)
    }

    pub fn container(&self, pos: BlockPos) -> Option<&Container> {
        self.containers.get(&pos)
    }

    /// Number of open containers.
    pub fn open_containers(&self) -> usize {
        self.containers.len()
    }

    /// Register a user. Returns false if they were already joined.
    pub fn join(&mut self, user: UserId, creative: bool) -> bool {
        if self.players.contains_key(&user) {
            return false;
        }
        self.players.insert(user, PlayerState::new(user, creative));
        debug!("{user} joined (creative: {creative})");
        true
    }

    /// Close every window of the user and forget them.
    pub fn leave(
        &mut self,
        user: UserId,
        storage: &mut dyn ContainerStorage,
        out: &mut Vec<Outbound>,
    ) -> Result<(), InventoryError> {
        let player = self.players.get(&user).ok_or(InventoryError::UnknownUser(user))?;
        let open = player.container_session();
        let result = match open {
            Some(session) => self.close_session(user, session, storage, out),
            None => Ok(()),
        };
        let player_window = self.close_session(user, WindowSession::player(), storage, out);
        self.players.remove(&user);
        debug!("{user} left");
        result.and(player_window)
    }

    fn session(&self, user: UserId, window_id: i8) -> Result<WindowSession, InventoryError> {
        self.players
            .get(&user)
            .ok_or(InventoryError::UnknownUser(user))?
            .session(window_id)
            .ok_or(InventoryError::UnknownWindow { user, window_id })
    }

    /// Open the container at `pos` for `user` and send its contents. Any
    /// other container window the user has open is closed first.
    pub fn window_open(
        &mut self,
        user: UserId,
        kind: WindowKind,
        pos: BlockPos,
        storage: &mut dyn ContainerStorage,
        out: &mut Vec<Outbound>,
    ) -> Result<u8, InventoryError> {
        if kind == WindowKind::Player {
            return Err(InventoryError::NotAContainer(kind));
        }
        let player = self.players.get(&user).ok_or(InventoryError::UnknownUser(user))?;
        if let Some(existing) = self.containers.get(&pos) {
            if existing.kind() != kind {
                return Err(InventoryError::KindConflict {
                    pos,
                    existing: existing.kind(),
                    requested: kind,
                });
            }
        }
        if let Some(previous) = player.container_session() {
            out.push(Outbound::CloseWindow {
                user,
                window_id: previous.window_id,
            });
            self.close_session(user, previous, storage, out)?;
        }

        let container = self.containers.open_with(pos, || {
            let slots = if kind.is_persistent() {
                storage.load(pos, kind)?.unwrap_or_default()
            } else {
                Vec::new()
            };
            Ok::<_, InventoryError>(Container::with_contents(kind, pos, slots))
        })?;
        container.add_viewer(user);

        let player = self
            .players
            .get_mut(&user)
            .ok_or(InventoryError::UnknownUser(user))?;
        let window_id = player.allocate_window_id();
        let session = WindowSession::for_container(window_id, kind, pos);
        player.windows.push(session);

        out.push(Outbound::OpenWindow {
            user,
            window_id,
            kind,
            slots: kind.container_slots() as u8,
        });
        self.send_view(user, session, out);
        debug!("{user} opened {kind:?} at {pos} as window {window_id}");
        Ok(window_id)
    }

    /// Close a window at the user's request.
    pub fn window_close(
        &mut self,
        user: UserId,
        window_id: i8,
        storage: &mut dyn ContainerStorage,
        out: &mut Vec<Outbound>,
    ) -> Result<(), InventoryError> {
        let session = self.session(user, window_id)?;
        self.close_session(user, session, storage, out)
    }

    fn close_session(
        &mut self,
        user: UserId,
        session: WindowSession,
        storage: &mut dyn ContainerStorage,
        out: &mut Vec<Outbound>,
    ) -> Result<(), InventoryError> {
        let Self {
            players,
            containers,
            ..
        } = self;
        let player = players
            .get_mut(&user)
            .ok_or(InventoryError::UnknownUser(user))?;

        let cursor = std::mem::replace(&mut player.inventory.cursor, ItemStack::empty());
        let mut returned = vec![cursor];
        let mut saved = Ok(());

        match session.target {
            WindowTarget::Player => {
                returned.extend(player.inventory.take_grid());
                player.actions.clear_for(user);
            }
            WindowTarget::Crafting(pos) | WindowTarget::Container(pos) => {
                player.remove_session(session.window_id);
                let last = match containers.get_mut(&pos) {
                    Some(container) => {
                        container.remove_viewer(user);
                        !container.has_viewers()
                    }
                    None => false,
                };
                if last {
                    if let Some(container) = containers.remove(&pos) {
                        saved = Self::tear_down(container, &mut returned, storage);
                    }
                }
            }
        }

        for stack in returned.into_iter().filter(|s| !s.is_empty()) {
            let leftover = player.inventory.store(stack);
            if !leftover.is_empty() {
                out.push(Outbound::SpawnItem {
                    user,
                    item: leftover,
                });
            }
        }
        debug!("{user} closed window {}", session.window_id);
        self.send_view(user, WindowSession::player(), out);
        saved
    }

    /// The last viewer left: crafting grids go back to them, everything
    /// else goes to storage.
    fn tear_down(
        container: Container,
        returned: &mut Vec<ItemStack>,
        storage: &mut dyn ContainerStorage,
    ) -> Result<(), InventoryError> {
        let (kind, pos) = (container.kind(), container.pos());
        if let Some(grid) = kind.crafting_grid() {
            returned.extend(grid.slots().map(|i| container.slots[i].clone()));
        }
        if !kind.is_persistent() {
            return Ok(());
        }
        storage.save(pos, kind, &container.slots).map_err(|e| {
            warn!("Failed to save {kind:?} at {pos}: {e}");
            InventoryError::from(e)
        })
    }

    /// Every slot of a window as its viewer sees it.
    fn window_items(inv: &PlayerInventory, container: Option<&Container>) -> Vec<ItemStack> {
        match container {
            None => inv.slots.clone(),
            Some(c) => c
                .slots
                .iter()
                .chain(&inv.slots[MAIN.start..HOTBAR.end])
                .cloned()
                .collect(),
        }
    }

    fn send_view(&self, user: UserId, session: WindowSession, out: &mut Vec<Outbound>) {
        let Some(player) = self.players.get(&user) else {
            return;
        };
        let container = match session.target.pos() {
            Some(pos) => match self.containers.get(&pos) {
                Some(c) => Some(c),
                None => return,
            },
            None => None,
        };
        out.push(Outbound::WindowItems {
            user,
            window_id: session.window_id,
            items: Self::window_items(&player.inventory, container),
        });
        out.push(Outbound::cursor(user, player.inventory.cursor.clone()));
    }

    /// The session through which `viewer` sees the container at `pos`.
    fn viewer_session(&self, viewer: UserId, pos: BlockPos) -> Option<WindowSession> {
        self.players
            .get(&viewer)?
            .windows
            .iter()
            .find(|w| w.target.pos() == Some(pos))
            .copied()
    }

    /// Refresh every viewer of the container at `pos`.
    fn broadcast(&self, pos: BlockPos, out: &mut Vec<Outbound>) {
        let Some(container) = self.containers.get(&pos) else {
            return;
        };
        for &viewer in container.viewers() {
            if let Some(session) = self.viewer_session(viewer, pos) {
                self.send_view(viewer, session, out);
            }
        }
    }

    /// Send the full contents of a window and the cursor.
    pub fn update_inventory(
        &self,
        user: UserId,
        window_id: i8,
        out: &mut Vec<Outbound>,
    ) -> Result<(), InventoryError> {
        let session = self.session(user, window_id)?;
        self.send_view(user, session, out);
        Ok(())
    }

    /// Handle a click packet. The click is acknowledged either way; a
    /// refused click leaves every slot untouched and resends the window.
    pub fn window_click(
        &mut self,
        user: UserId,
        click: &ClickWindow,
        out: &mut Vec<Outbound>,
    ) -> Result<(), ClickError> {
        let player = self.players.get(&user).ok_or(ClickError::UnknownUser(user))?;
        let Some(session) = player.session(click.window_id) else {
            warn!("{user} clicked in unknown window {}", click.window_id);
            if let Ok(window_id) = u8::try_from(click.window_id) {
                out.push(Outbound::Transaction {
                    user,
                    window_id,
                    action_number: click.action_number,
                    accepted: false,
                });
                out.push(Outbound::CloseWindow { user, window_id });
            }
            return Err(ClickError::UnknownWindow {
                window_id: click.window_id,
            });
        };

        match self.apply_click(user, session, click) {
            Ok(outcome) => {
                out.push(Outbound::Transaction {
                    user,
                    window_id: session.window_id,
                    action_number: click.action_number,
                    accepted: true,
                });
                match session.target.pos() {
                    Some(pos) if outcome.container_changed => self.broadcast(pos, out),
                    _ if outcome.changed => self.send_view(user, session, out),
                    _ => {}
                }
                for item in outcome.drops {
                    out.push(Outbound::SpawnItem { user, item });
                }
                Ok(())
            }
            Err(e) => {
                warn!("Rejected click from {user} in window {}: {e}", session.window_id);
                out.push(Outbound::Transaction {
                    user,
                    window_id: session.window_id,
                    action_number: click.action_number,
                    accepted: false,
                });
                self.send_view(user, session, out);
                Err(e)
            }
        }
    }

    fn apply_click(
        &mut self,
        user: UserId,
        session: WindowSession,
        click: &ClickWindow,
    ) -> Result<ClickOutcome, ClickError> {
        let Self {
            players,
            containers,
            recipes,
        } = self;
        let player = players.get_mut(&user).ok_or(ClickError::UnknownUser(user))?;
        let PlayerState {
            inventory,
            actions: own_actions,
            creative,
            ..
        } = player;

        let (slots, actions): (&mut [ItemStack], &mut ActionLog) = match session.target.pos() {
            None => (Default::default(), own_actions),
            Some(pos) => {
                let container = containers
                    .get_mut(&pos)
                    .ok_or(ClickError::UnknownWindow {
                        window_id: click.window_id,
                    })?;
                (&mut container.slots[..], &mut container.actions)
            }
        };

        let view = WindowView::new(session.kind, slots, inventory);
        let before = view.items();
        let cursor_before = view.cursor().clone();
        let mut ctx = ClickContext {
            view,
            recipes,
            actions,
            user,
            creative: *creative,
            action_number: click.action_number,
            drops: Vec::new(),
        };

        if let Err(e) = Self::validate_and_apply(&mut ctx, session, click) {
            ctx.actions.clear_for(user);
            return Err(e);
        }

        let after = ctx.view.items();
        let n = session.kind.container_slots();
        Ok(ClickOutcome {
            changed: after != before || *ctx.view.cursor() != cursor_before,
            container_changed: after[..n] != before[..n],
            drops: ctx.drops,
        })
    }

    fn validate_and_apply(
        ctx: &mut ClickContext<'_>,
        session: WindowSession,
        click: &ClickWindow,
    ) -> Result<(), ClickError> {
        let action = ClickAction::parse(click, session.kind.max_slot())?;
        if let Some(slot) = action.claimed_slot() {
            let actual = ctx.view.slot(slot);
            if !click.claimed.matches(actual) {
                return Err(ClickError::Desync {
                    slot: click.slot,
                    claimed: click.claimed,
                    actual: ClaimedItem::of(actual),
                });
            }
        }
        debug!(
            "{} window {} action {}: {action:?}",
            ctx.user, session.window_id, click.action_number
        );
        ctx.apply(action)
    }

    /// Write a slot directly. Window -1 slot -1 is the cursor. Grid writes
    /// recompute the crafting output; container writes reach every viewer.
    pub fn set_slot(
        &mut self,
        user: UserId,
        window_id: i8,
        slot: i16,
        item: ItemStack,
        out: &mut Vec<Outbound>,
    ) -> Result<(), InventoryError> {
        if window_id == CURSOR_WINDOW && slot == CURSOR_SLOT {
            let player = self
                .players
                .get_mut(&user)
                .ok_or(InventoryError::UnknownUser(user))?;
            player.inventory.cursor = item.clone();
            out.push(Outbound::cursor(user, item));
            return Ok(());
        }

        let session = self.session(user, window_id)?;
        let kind = session.kind;
        let max = kind.max_slot();
        if !(0..=max).contains(&slot) {
            return Err(InventoryError::SlotOutOfRange { kind, slot, max });
        }

        let (before, after) = {
            let Self {
                players,
                containers,
                recipes,
            } = &mut *self;
            let player = players
                .get_mut(&user)
                .ok_or(InventoryError::UnknownUser(user))?;
            let slots: &mut [ItemStack] = match session.target.pos() {
                None => Default::default(),
                Some(pos) => match containers.get_mut(&pos) {
                    Some(c) => &mut c.slots[..],
                    None => {
                        return Err(InventoryError::UnknownWindow { user, window_id });
                    }
                },
            };
            let mut view = WindowView::new(kind, slots, &mut player.inventory);
            let before = view.items();
            *view.slot_mut(slot as usize) = item;
            if kind
                .crafting_grid()
                .is_some_and(|g| g.slots().contains(&(slot as usize)))
            {
                view.refresh_output(recipes);
            }
            (before, view.items())
        };

        let n = kind.container_slots();
        for (i, (old, new)) in before.iter().zip(&after).enumerate() {
            if old == new {
                continue;
            }
            match session.target.pos() {
                Some(pos) if i < n => {
                    let viewers = self
                        .containers
                        .get(&pos)
                        .map(|c| c.viewers().to_vec())
                        .unwrap_or_default();
                    for viewer in viewers {
                        if let Some(s) = self.viewer_session(viewer, pos) {
                            out.push(Outbound::SetSlot {
                                user: viewer,
                                window_id: s.window_id as i8,
                                slot: i as i16,
                                item: new.clone(),
                            });
                        }
                    }
                }
                _ => out.push(Outbound::SetSlot {
                    user,
                    window_id: session.window_id as i8,
                    slot: i as i16,
                    item: new.clone(),
                }),
            }
        }
        Ok(())
    }

    /// Whether `count` items would fit in the user's main inventory and
    /// hotbar.
    pub fn is_space(
        &self,
        user: UserId,
        item: i16,
        count: u8,
        health: i16,
    ) -> Result<bool, InventoryError> {
        let player = self.players.get(&user).ok_or(InventoryError::UnknownUser(user))?;
        Ok(player.inventory.is_space(item, count, health))
    }

    /// Give a picked-up stack to the user, all or nothing.
    pub fn add_items(
        &mut self,
        user: UserId,
        item: i16,
        count: u8,
        health: i16,
        out: &mut Vec<Outbound>,
    ) -> Result<(), InventoryError> {
        let player = self
            .players
            .get_mut(&user)
            .ok_or(InventoryError::UnknownUser(user))?;
        if !player.inventory.add_items(item, count, health) {
            return Err(InventoryError::NoSpace {
                item,
                count,
                health,
            });
        }
        let session = player
            .container_session()
            .unwrap_or_else(WindowSession::player);
        self.send_view(user, session, out);
        Ok(())
    }

    /// Write every open container to storage and close all container
    /// windows. Crafting grids and cursors go back to their users; what does
    /// not fit is dropped. Returns how many containers were saved.
    pub fn shutdown(
        &mut self,
        storage: &mut dyn ContainerStorage,
        out: &mut Vec<Outbound>,
    ) -> usize {
        let mut saved = 0;
        let mut returned: Vec<(UserId, ItemStack)> = Vec::new();
        for container in self.containers.drain() {
            let (kind, pos) = (container.kind(), container.pos());
            if let Some(grid) = kind.crafting_grid() {
                let stacks = grid
                    .slots()
                    .map(|i| container.slots[i].clone())
                    .filter(|s| !s.is_empty());
                match container.viewers().first() {
                    Some(&owner) => returned.extend(stacks.map(|s| (owner, s))),
                    None => {
                        let lost = stacks.count();
                        if lost > 0 {
                            warn!("Discarding {lost} crafting grid stack(s) at {pos}");
                        }
                    }
                }
                continue;
            }
            match storage.save(pos, kind, &container.slots) {
                Ok(()) => saved += 1,
                Err(e) => warn!("Failed to save {kind:?} at {pos}: {e}"),
            }
        }

        let mut closed: Vec<UserId> = Vec::new();
        for (&user, player) in self.players.iter_mut() {
            let Some(session) = player.container_session() else {
                continue;
            };
            out.push(Outbound::CloseWindow {
                user,
                window_id: session.window_id,
            });
            player.windows.retain(|w| w.window_id == 0);
            let cursor = std::mem::replace(&mut player.inventory.cursor, ItemStack::empty());
            if !cursor.is_empty() {
                returned.push((user, cursor));
            }
            closed.push(user);
        }
        closed.sort();

        for (user, stack) in returned {
            let Some(player) = self.players.get_mut(&user) else {
                continue;
            };
            let leftover = player.inventory.store(stack);
            if !leftover.is_empty() {
                out.push(Outbound::SpawnItem {
                    user,
                    item: leftover,
                });
            }
        }
        for user in closed {
            self.send_view(user, WindowSession::player(), out);
        }
        info!("Saved {saved} open container(s)");
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::click::OUTSIDE;
    use crate::error::DragError;
    use crate::recipe::Ingredient;
    use crate::storage::MemoryStorage;
    use ms_item::ids::*;

    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);
    const CHEST_POS: BlockPos = BlockPos { x: 10, y: 64, z: -3 };

    fn book() -> RecipeBook {
        let mut book = RecipeBook::new();
        book.add_recipe(
            1,
            2,
            vec![Ingredient::any(PLANKS), Ingredient::any(PLANKS)],
            4,
            STICK,
            0,
        )
        .unwrap();
        book
    }

    fn manager() -> InventoryManager {
        let mut m = InventoryManager::new(book());
        m.join(ALICE, false);
        m.join(BOB, false);
        m
    }

    fn click(window_id: u8, slot: i16, button: i8, mode: i8, claimed: &ItemStack) -> ClickWindow {
        ClickWindow {
            window_id: window_id as i8,
            slot,
            button,
            action_number: 7,
            mode,
            claimed: ClaimedItem::of(claimed),
        }
    }

    fn drag(window_id: u8, slot: i16, button: i8, action_number: i16) -> ClickWindow {
        ClickWindow {
            window_id: window_id as i8,
            slot,
            button,
            action_number,
            mode: 5,
            claimed: ClaimedItem::EMPTY,
        }
    }

    fn inv(m: &mut InventoryManager, user: UserId) -> &mut PlayerInventory {
        &mut m.player_mut(user).unwrap().inventory
    }

    fn chest_slots(m: &InventoryManager) -> &[ItemStack] {
        &m.container(CHEST_POS).unwrap().slots
    }

    /// Total count of `item` across both users and the chest.
    fn total(m: &InventoryManager, item: i16) -> u32 {
        let mut stacks: Vec<&ItemStack> = Vec::new();
        for user in [ALICE, BOB] {
            let p = m.player(user).unwrap();
            stacks.extend(p.inventory.slots.iter());
            stacks.push(&p.inventory.cursor);
        }
        if let Some(c) = m.container(CHEST_POS) {
            stacks.extend(c.slots.iter());
        }
        stacks
            .iter()
            .filter(|s| s.item() == item)
            .map(|s| s.count() as u32)
            .sum()
    }

    fn window_items_for(out: &[Outbound], user: UserId) -> usize {
        out.iter()
            .filter(|o| matches!(o, Outbound::WindowItems { user: u, .. } if *u == user))
            .count()
    }

    #[test]
    fn open_sends_current_contents() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let id = m
            .window_open(ALICE, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        assert_eq!(id, 1);
        assert!(matches!(
            out[0],
            Outbound::OpenWindow {
                window_id: 1,
                kind: WindowKind::Chest,
                slots: 27,
                ..
            }
        ));
        match &out[1] {
            Outbound::WindowItems { items, .. } => assert_eq!(items.len(), 63),
            other => panic!("expected WindowItems, got {other:?}"),
        }
        assert_eq!(out[2], Outbound::cursor(ALICE, ItemStack::empty()));
    }

    #[test]
    fn both_viewers_see_a_change() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let a = m
            .window_open(ALICE, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        m.window_open(BOB, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        inv(&mut m, ALICE).slots[9] = ItemStack::new(COBBLESTONE, 20, 0);

        out.clear();
        let c = click(a, 27, 0, 0, &ItemStack::new(COBBLESTONE, 20, 0));
        m.window_click(ALICE, &c, &mut out).unwrap();
        out.clear();
        let c = click(a, 0, 0, 0, &ItemStack::empty());
        m.window_click(ALICE, &c, &mut out).unwrap();

        assert_eq!(chest_slots(&m)[0], ItemStack::new(COBBLESTONE, 20, 0));
        assert!(out.contains(&Outbound::Transaction {
            user: ALICE,
            window_id: a,
            action_number: 7,
            accepted: true
        }));
        assert_eq!(window_items_for(&out, ALICE), 1);
        assert_eq!(window_items_for(&out, BOB), 1);
    }

    #[test]
    fn player_side_change_only_refreshes_clicker() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let a = m
            .window_open(ALICE, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        m.window_open(BOB, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        inv(&mut m, ALICE).slots[9] = ItemStack::new(DIRT, 3, 0);
        out.clear();
        let c = click(a, 27, 0, 0, &ItemStack::new(DIRT, 3, 0));
        m.window_click(ALICE, &c, &mut out).unwrap();
        assert_eq!(window_items_for(&out, ALICE), 1);
        assert_eq!(window_items_for(&out, BOB), 0);
    }

    #[test]
    fn desync_is_rejected_without_mutation() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let a = m
            .window_open(ALICE, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        m.set_slot(ALICE, a as i8, 4, ItemStack::new(DIRT, 5, 0), &mut out)
            .unwrap();
        out.clear();

        let c = click(a, 4, 0, 0, &ItemStack::new(DIRT, 6, 0));
        let err = m.window_click(ALICE, &c, &mut out).unwrap_err();
        assert!(matches!(err, ClickError::Desync { slot: 4, .. }));
        assert_eq!(chest_slots(&m)[4], ItemStack::new(DIRT, 5, 0));
        assert!(m.player(ALICE).unwrap().inventory.cursor.is_empty());
        assert_eq!(
            out[0],
            Outbound::Transaction {
                user: ALICE,
                window_id: a,
                action_number: 7,
                accepted: false
            }
        );
        assert_eq!(window_items_for(&out, ALICE), 1);
    }

    #[test]
    fn unknown_window_is_closed() {
        let mut m = manager();
        let mut out = Vec::new();
        let c = click(9, 0, 0, 0, &ItemStack::empty());
        assert!(matches!(
            m.window_click(ALICE, &c, &mut out),
            Err(ClickError::UnknownWindow { window_id: 9 })
        ));
        assert!(out.contains(&Outbound::CloseWindow {
            user: ALICE,
            window_id: 9
        }));
    }

    #[test]
    fn left_drag_splits_evenly_with_remainder_first() {
        let mut m = manager();
        inv(&mut m, ALICE).cursor = ItemStack::new(COBBLESTONE, 11, 0);
        let mut out = Vec::new();
        m.window_click(ALICE, &drag(0, OUTSIDE, 0, 3), &mut out).unwrap();
        for slot in [20, 12, 30] {
            m.window_click(ALICE, &drag(0, slot, 1, 3), &mut out).unwrap();
        }
        m.window_click(ALICE, &drag(0, OUTSIDE, 2, 3), &mut out).unwrap();

        let inv = &m.player(ALICE).unwrap().inventory;
        assert_eq!(inv.slots[20].count(), 5);
        assert_eq!(inv.slots[12].count(), 3);
        assert_eq!(inv.slots[30].count(), 3);
        assert!(inv.cursor.is_empty());
    }

    #[test]
    fn right_drag_places_one_each() {
        let mut m = manager();
        inv(&mut m, ALICE).cursor = ItemStack::new(DIRT, 5, 0);
        inv(&mut m, ALICE).slots[13] = ItemStack::new(DIRT, 2, 0);
        inv(&mut m, ALICE).slots[14] = ItemStack::new(WOOL, 2, 0);
        let mut out = Vec::new();
        m.window_click(ALICE, &drag(0, OUTSIDE, 4, 8), &mut out).unwrap();
        for slot in [12, 13, 14, 15] {
            m.window_click(ALICE, &drag(0, slot, 5, 8), &mut out).unwrap();
        }
        m.window_click(ALICE, &drag(0, OUTSIDE, 6, 8), &mut out).unwrap();

        let inv = &m.player(ALICE).unwrap().inventory;
        assert_eq!(inv.slots[12].count(), 1);
        assert_eq!(inv.slots[13].count(), 3);
        assert_eq!(inv.slots[14], ItemStack::new(WOOL, 2, 0));
        assert_eq!(inv.slots[15].count(), 1);
        assert_eq!(inv.cursor.count(), 2);
    }

    #[test]
    fn drag_framing_errors_reset_the_log() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let a = m
            .window_open(ALICE, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        let b = m
            .window_open(BOB, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        inv(&mut m, ALICE).cursor = ItemStack::new(DIRT, 4, 0);
        inv(&mut m, BOB).cursor = ItemStack::new(DIRT, 4, 0);

        assert!(matches!(
            m.window_click(ALICE, &drag(a, 0, 1, 1), &mut out),
            Err(ClickError::Drag(DragError::NotStarted))
        ));

        m.window_click(ALICE, &drag(a, OUTSIDE, 0, 1), &mut out).unwrap();
        assert!(matches!(
            m.window_click(BOB, &drag(b, OUTSIDE, 0, 2), &mut out),
            Err(ClickError::Drag(DragError::Foreign(ALICE)))
        ));
        assert!(m.container(CHEST_POS).unwrap().actions.is_recording());

        out.clear();
        assert!(matches!(
            m.window_click(ALICE, &drag(a, 0, 1, 5), &mut out),
            Err(ClickError::Drag(DragError::ActionMismatch { expected: 1, got: 5 }))
        ));
        assert!(!m.container(CHEST_POS).unwrap().actions.is_recording());
        assert!(out.iter().any(|o| matches!(o, Outbound::Transaction { accepted: false, .. })));
        assert_eq!(window_items_for(&out, ALICE), 1);
        assert!(chest_slots(&m).iter().all(ItemStack::is_empty));
    }

    #[test]
    fn drag_without_cursor_is_rejected() {
        let mut m = manager();
        let mut out = Vec::new();
        assert!(matches!(
            m.window_click(ALICE, &drag(0, OUTSIDE, 0, 1), &mut out),
            Err(ClickError::Drag(DragError::EmptyCursor))
        ));
        inv(&mut m, ALICE).cursor = ItemStack::new(DIRT, 4, 0);
        assert!(matches!(
            m.window_click(ALICE, &drag(0, OUTSIDE, 8, 1), &mut out),
            Err(ClickError::NotPermitted(_))
        ));
    }

    #[test]
    fn middle_click_needs_creative() {
        let mut m = manager();
        inv(&mut m, ALICE).slots[20] = ItemStack::new(DIRT, 1, 0);
        let mut out = Vec::new();
        let c = click(0, 20, 2, 3, &ItemStack::new(DIRT, 1, 0));
        assert!(matches!(
            m.window_click(ALICE, &c, &mut out),
            Err(ClickError::NotPermitted(_))
        ));
        m.player_mut(ALICE).unwrap().creative = true;
        m.window_click(ALICE, &c, &mut out).unwrap();
        assert_eq!(
            m.player(ALICE).unwrap().inventory.cursor,
            ItemStack::new(DIRT, 64, 0)
        );
    }

    #[test]
    fn clicks_conserve_items() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let a = m
            .window_open(ALICE, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        let b = m
            .window_open(BOB, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        inv(&mut m, ALICE).slots[9] = ItemStack::new(COBBLESTONE, 50, 0);
        inv(&mut m, BOB).slots[40] = ItemStack::new(COBBLESTONE, 30, 0);
        let start = total(&m, COBBLESTONE);

        // (user, window, slot, button, mode)
        let script: Vec<(UserId, u8, i16, i8, i8)> = vec![
            (ALICE, a, 27, 0, 1),
            (BOB, b, 58, 0, 1),
            (ALICE, a, 0, 1, 0),
            (BOB, b, 1, 0, 0),
            (BOB, b, 2, 1, 0),
            (ALICE, a, 3, 0, 0),
            (BOB, b, 0, 0, 6),
            (BOB, b, 40, 1, 0),
            (ALICE, a, 2, 0, 1),
        ];
        for (user, window, slot, button, mode) in script {
            let claimed = {
                let p = m.player(user).unwrap();
                let items = InventoryManager::window_items(&p.inventory, m.container(CHEST_POS));
                items[slot as usize].clone()
            };
            out.clear();
            m.window_click(user, &click(window, slot, button, mode, &claimed), &mut out)
                .unwrap();
            assert_eq!(total(&m, COBBLESTONE), start, "after {user} {mode}/{button} on {slot}");
        }
    }

    #[test]
    fn last_viewer_saves_and_reopen_loads() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let a = m
            .window_open(ALICE, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        let b = m
            .window_open(BOB, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        m.set_slot(ALICE, a as i8, 3, ItemStack::new(WOOL, 9, 2), &mut out)
            .unwrap();

        m.window_close(ALICE, a as i8, &mut storage, &mut out).unwrap();
        assert!(storage.is_empty());
        m.window_close(BOB, b as i8, &mut storage, &mut out).unwrap();
        assert_eq!(m.open_containers(), 0);
        assert_eq!(storage.get(&CHEST_POS).unwrap()[3], ItemStack::new(WOOL, 9, 2));

        let again = m
            .window_open(ALICE, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        assert_eq!(again, 2);
        assert_eq!(chest_slots(&m)[3], ItemStack::new(WOOL, 9, 2));
    }

    #[test]
    fn kind_conflict_is_refused() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        m.window_open(ALICE, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        assert!(matches!(
            m.window_open(BOB, WindowKind::Furnace, CHEST_POS, &mut storage, &mut out),
            Err(InventoryError::KindConflict { .. })
        ));
        assert!(matches!(
            m.window_open(BOB, WindowKind::Player, CHEST_POS, &mut storage, &mut out),
            Err(InventoryError::NotAContainer(_))
        ));
    }

    #[test]
    fn opening_another_container_closes_the_first() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let first = m
            .window_open(ALICE, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        out.clear();
        let furnace = BlockPos::new(0, 64, 0);
        m.window_open(ALICE, WindowKind::Furnace, furnace, &mut storage, &mut out)
            .unwrap();
        assert_eq!(
            out[0],
            Outbound::CloseWindow {
                user: ALICE,
                window_id: first
            }
        );
        assert!(m.container(CHEST_POS).is_none());
        assert_eq!(m.player(ALICE).unwrap().windows.len(), 2);
    }

    #[test]
    fn closing_returns_cursor_and_grid() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let bench = BlockPos::new(2, 70, 2);
        let w = m
            .window_open(ALICE, WindowKind::Workbench, bench, &mut storage, &mut out)
            .unwrap();
        m.set_slot(ALICE, w as i8, 5, ItemStack::new(PLANKS, 3, 0), &mut out)
            .unwrap();
        inv(&mut m, ALICE).cursor = ItemStack::new(DIRT, 2, 0);

        m.window_close(ALICE, w as i8, &mut storage, &mut out).unwrap();
        assert!(storage.is_empty());
        let inv = &m.player(ALICE).unwrap().inventory;
        assert!(inv.cursor.is_empty());
        assert_eq!(inv.slots[36], ItemStack::new(DIRT, 2, 0));
        assert_eq!(inv.slots[37], ItemStack::new(PLANKS, 3, 0));

        let mut m2 = manager();
        inv_slots_fill(&mut m2);
        m2.set_slot(ALICE, 0, 1, ItemStack::new(STONE, 1, 0), &mut out)
            .unwrap();
        out.clear();
        m2.window_close(ALICE, 0, &mut storage, &mut out).unwrap();
        assert!(out.contains(&Outbound::SpawnItem {
            user: ALICE,
            item: ItemStack::new(STONE, 1, 0)
        }));
    }

    fn inv_slots_fill(m: &mut InventoryManager) {
        let inv = inv(m, ALICE);
        for i in HOTBAR.chain(MAIN) {
            inv.slots[i] = ItemStack::new(DIRT, 64, 0);
        }
    }

    #[test]
    fn workbench_crafting() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let bench = BlockPos::new(2, 70, 2);
        let w = m
            .window_open(ALICE, WindowKind::Workbench, bench, &mut storage, &mut out)
            .unwrap();
        m.set_slot(ALICE, w as i8, 3, ItemStack::new(PLANKS, 3, 0), &mut out)
            .unwrap();
        out.clear();
        m.set_slot(ALICE, w as i8, 6, ItemStack::new(PLANKS, 2, 0), &mut out)
            .unwrap();
        assert!(out.contains(&Outbound::SetSlot {
            user: ALICE,
            window_id: w as i8,
            slot: 0,
            item: ItemStack::new(STICK, 4, 0)
        }));

        let c = click(w, 0, 0, 1, &ItemStack::new(STICK, 4, 0));
        m.window_click(ALICE, &c, &mut out).unwrap();
        let inv = &m.player(ALICE).unwrap().inventory;
        assert_eq!(inv.slots[36], ItemStack::new(STICK, 8, 0));
        let bench_slots = &m.container(bench).unwrap().slots;
        assert_eq!(bench_slots[3], ItemStack::new(PLANKS, 1, 0));
        assert!(bench_slots[6].is_empty());
        assert!(bench_slots[0].is_empty());
    }

    #[test]
    fn tool_and_planks_pattern_in_workbench() {
        let mut m = manager();
        m.recipes
            .add_recipe(
                2,
                2,
                vec![
                    Ingredient::exact(IRON_PICKAXE, 0),
                    Ingredient::any(PLANKS),
                    Ingredient::any(PLANKS),
                    Ingredient::any(PLANKS),
                ],
                16,
                STICK,
                0,
            )
            .unwrap();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let bench = BlockPos::new(-4, 70, 9);
        let w = m
            .window_open(ALICE, WindowKind::Workbench, bench, &mut storage, &mut out)
            .unwrap() as i8;

        // bottom-right corner of the 3x3 grid
        m.set_slot(ALICE, w, 5, ItemStack::new(IRON_PICKAXE, 1, 0), &mut out)
            .unwrap();
        m.set_slot(ALICE, w, 6, ItemStack::new(PLANKS, 2, 1), &mut out)
            .unwrap();
        m.set_slot(ALICE, w, 8, ItemStack::new(PLANKS, 2, 0), &mut out)
            .unwrap();
        m.set_slot(ALICE, w, 9, ItemStack::new(PLANKS, 2, 3), &mut out)
            .unwrap();
        let output = || m.container(bench).unwrap().slots[0].clone();
        assert_eq!(output(), ItemStack::new(STICK, 16, 0));

        m.set_slot(ALICE, w, 9, ItemStack::empty(), &mut out).unwrap();
        assert!(m.container(bench).unwrap().slots[0].is_empty());

        m.set_slot(ALICE, w, 9, ItemStack::new(PLANKS, 2, 3), &mut out)
            .unwrap();
        m.set_slot(ALICE, w, 5, ItemStack::new(IRON_PICKAXE, 1, 40), &mut out)
            .unwrap();
        assert!(m.container(bench).unwrap().slots[0].is_empty());

        m.set_slot(ALICE, w, 5, ItemStack::new(IRON_PICKAXE, 1, 0), &mut out)
            .unwrap();
        let c = click(w as u8, 0, 0, 0, &ItemStack::new(STICK, 16, 0));
        m.window_click(ALICE, &c, &mut out).unwrap();
        assert_eq!(
            m.player(ALICE).unwrap().inventory.cursor,
            ItemStack::new(STICK, 16, 0)
        );
        let grid = &m.container(bench).unwrap().slots;
        assert!(grid[5].is_empty());
        assert_eq!(grid[6].count(), 1);
        assert_eq!(grid[9].count(), 1);
        assert!(grid[0].is_empty());
    }

    #[test]
    fn shutdown_returns_grid_and_cursor() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let bench = BlockPos::new(2, 70, 2);
        let w = m
            .window_open(ALICE, WindowKind::Workbench, bench, &mut storage, &mut out)
            .unwrap();
        m.set_slot(ALICE, w as i8, 5, ItemStack::new(DIRT, 10, 0), &mut out)
            .unwrap();
        inv(&mut m, ALICE).cursor = ItemStack::new(DIRT, 5, 0);

        out.clear();
        assert_eq!(m.shutdown(&mut storage, &mut out), 0);
        assert!(storage.is_empty());
        assert_eq!(m.open_containers(), 0);

        let alice = m.player(ALICE).unwrap();
        assert_eq!(alice.windows.len(), 1);
        assert!(alice.inventory.cursor.is_empty());
        let dirt: u32 = alice
            .inventory
            .slots
            .iter()
            .filter(|s| s.item() == DIRT)
            .map(|s| s.count() as u32)
            .sum();
        assert_eq!(dirt, 15);
        assert!(out.contains(&Outbound::CloseWindow {
            user: ALICE,
            window_id: w
        }));
        assert_eq!(window_items_for(&out, ALICE), 1);
        assert_eq!(window_items_for(&out, BOB), 0);
    }

    #[test]
    fn shutdown_drops_what_does_not_fit() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let w = m
            .window_open(
                ALICE,
                WindowKind::Workbench,
                BlockPos::new(0, 0, 0),
                &mut storage,
                &mut out,
            )
            .unwrap();
        m.set_slot(ALICE, w as i8, 1, ItemStack::new(DIRT, 7, 0), &mut out)
            .unwrap();
        for slot in 9..45 {
            inv(&mut m, ALICE).slots[slot] = ItemStack::new(STONE, 64, 0);
        }

        out.clear();
        m.shutdown(&mut storage, &mut out);
        assert!(out.contains(&Outbound::SpawnItem {
            user: ALICE,
            item: ItemStack::new(DIRT, 7, 0)
        }));
    }

    #[test]
    fn furnace_output_is_take_only() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let pos = BlockPos::new(0, 64, 0);
        let w = m
            .window_open(ALICE, WindowKind::Furnace, pos, &mut storage, &mut out)
            .unwrap();
        m.set_slot(ALICE, w as i8, 2, ItemStack::new(IRON_INGOT, 3, 0), &mut out)
            .unwrap();
        inv(&mut m, ALICE).cursor = ItemStack::new(DIRT, 1, 0);
        let c = click(w, 2, 0, 0, &ItemStack::new(IRON_INGOT, 3, 0));
        m.window_click(ALICE, &c, &mut out).unwrap();
        assert_eq!(m.container(pos).unwrap().slots[2].item(), IRON_INGOT);
        assert_eq!(m.player(ALICE).unwrap().inventory.cursor.item(), DIRT);

        inv(&mut m, ALICE).cursor = ItemStack::empty();
        m.window_click(ALICE, &c, &mut out).unwrap();
        assert_eq!(
            m.player(ALICE).unwrap().inventory.cursor,
            ItemStack::new(IRON_INGOT, 3, 0)
        );
    }

    #[test]
    fn shift_click_into_chest_and_back() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        let a = m
            .window_open(ALICE, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        inv(&mut m, ALICE).slots[36] = ItemStack::new(DIRT, 10, 0);
        let hotbar0 = 27 + 27;
        let c = click(a, hotbar0, 0, 1, &ItemStack::new(DIRT, 10, 0));
        m.window_click(ALICE, &c, &mut out).unwrap();
        assert_eq!(chest_slots(&m)[0], ItemStack::new(DIRT, 10, 0));
        assert!(m.player(ALICE).unwrap().inventory.slots[36].is_empty());

        let c = click(a, 0, 0, 1, &ItemStack::new(DIRT, 10, 0));
        m.window_click(ALICE, &c, &mut out).unwrap();
        assert_eq!(
            m.player(ALICE).unwrap().inventory.slots[36],
            ItemStack::new(DIRT, 10, 0)
        );
    }

    #[test]
    fn set_slot_bounds() {
        let mut m = manager();
        let mut out = Vec::new();
        assert!(matches!(
            m.set_slot(ALICE, 0, 45, ItemStack::new(DIRT, 1, 0), &mut out),
            Err(InventoryError::SlotOutOfRange { max: 44, .. })
        ));
        assert!(matches!(
            m.set_slot(ALICE, 3, 0, ItemStack::new(DIRT, 1, 0), &mut out),
            Err(InventoryError::UnknownWindow { window_id: 3, .. })
        ));
        m.set_slot(ALICE, -1, -1, ItemStack::new(DIRT, 1, 0), &mut out)
            .unwrap();
        assert_eq!(
            m.player(ALICE).unwrap().inventory.cursor,
            ItemStack::new(DIRT, 1, 0)
        );
    }

    #[test]
    fn pickup_is_all_or_nothing() {
        let mut m = manager();
        let mut out = Vec::new();
        inv_slots_fill(&mut m);
        assert!(!m.is_space(ALICE, STONE, 1, 0).unwrap());
        assert!(matches!(
            m.add_items(ALICE, STONE, 1, 0, &mut out),
            Err(InventoryError::NoSpace { .. })
        ));
        assert!(out.is_empty());
        inv(&mut m, ALICE).slots[40] = ItemStack::new(STONE, 60, 0);
        m.add_items(ALICE, STONE, 4, 0, &mut out).unwrap();
        assert_eq!(m.player(ALICE).unwrap().inventory.slots[40].count(), 64);
        assert_eq!(window_items_for(&out, ALICE), 1);
        assert!(matches!(
            m.is_space(UserId(99), STONE, 1, 0),
            Err(InventoryError::UnknownUser(_))
        ));
    }

    #[test]
    fn outside_click_spawns_drop() {
        let mut m = manager();
        inv(&mut m, ALICE).cursor = ItemStack::new(DIRT, 3, 0);
        let mut out = Vec::new();
        let c = click(0, OUTSIDE, 0, 0, &ItemStack::empty());
        m.window_click(ALICE, &c, &mut out).unwrap();
        assert!(out.contains(&Outbound::SpawnItem {
            user: ALICE,
            item: ItemStack::new(DIRT, 3, 0)
        }));
    }

    #[test]
    fn leave_and_shutdown_flush_containers() {
        let mut m = manager();
        let mut storage = MemoryStorage::new();
        let mut out = Vec::new();
        m.window_open(ALICE, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        m.window_open(BOB, WindowKind::Chest, CHEST_POS, &mut storage, &mut out)
            .unwrap();
        m.leave(ALICE, &mut storage, &mut out).unwrap();
        assert!(m.player(ALICE).is_none());
        assert_eq!(m.container(CHEST_POS).unwrap().viewers(), &[BOB]);

        assert_eq!(m.shutdown(&mut storage, &mut out), 1);
        assert!(storage.get(&CHEST_POS).is_some());
        assert_eq!(m.player(BOB).unwrap().windows.len(), 1);
        assert!(!m.join(BOB, false));
    }
}
