//! The click protocol: decoding click packets into actions and applying
//! them to a window.

use ms_item::{armour_slot, ItemStack};
use tracing::debug;

use crate::container::ActionLog;
use crate::error::{ClickError, DragError};
use crate::player::{PlayerInventory, ARMOUR};
use crate::recipe::RecipeBook;
use crate::view::WindowView;
use crate::window::WindowKind;
use crate::UserId;

/// Slot number clients send for a click outside the window.
pub const OUTSIDE: i16 = -999;

/// What the client believes is in the clicked slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimedItem {
    pub item: i16,
    pub count: u8,
    pub health: i16,
}

impl ClaimedItem {
    pub const EMPTY: ClaimedItem = ClaimedItem {
        item: -1,
        count: 0,
        health: 0,
    };

    pub fn of(stack: &ItemStack) -> Self {
        if stack.is_empty() {
            return Self::EMPTY;
        }
        Self {
            item: stack.item(),
            count: stack.count(),
            health: stack.health(),
        }
    }

    fn is_empty(&self) -> bool {
        self.item < 0 || self.count == 0
    }

    /// Whether the claim agrees with the server's slot.
    pub fn matches(&self, stack: &ItemStack) -> bool {
        if self.is_empty() || stack.is_empty() {
            return self.is_empty() && stack.is_empty();
        }
        *self == Self::of(stack)
    }
}

/// A decoded click packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickWindow {
    pub window_id: i8,
    pub slot: i16,
    pub button: i8,
    pub action_number: i16,
    pub mode: i8,
    pub claimed: ClaimedItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// Button a drag is performed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    /// Split the cursor evenly.
    Left,
    /// One item per slot.
    Right,
    /// Full stacks per slot, creative only.
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragStep {
    Start(DragKind),
    Add { kind: DragKind, slot: usize },
    End(DragKind),
}

/// A click, classified by mode and button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Mode 0. `slot` is `None` for a click outside the window.
    Pickup { slot: Option<usize>, button: MouseButton },
    /// Mode 1, shift-click.
    QuickMove { slot: usize },
    /// Mode 2, number key `hotbar` (0-8).
    HotbarSwap { slot: usize, hotbar: u8 },
    /// Mode 3, middle click.
    Clone { slot: usize },
    /// Mode 4, drop key.
    Drop { slot: Option<usize>, whole_stack: bool },
    /// Mode 5.
    Drag(DragStep),
    /// Mode 6, double click.
    Collect { slot: usize },
}

impl ClickAction {
    /// Check the slot against the window and decode mode and button.
    pub fn parse(click: &ClickWindow, max_slot: i16) -> Result<Self, ClickError> {
        let malformed = || ClickError::Malformed {
            mode: click.mode,
            button: click.button,
            slot: click.slot,
        };

        let slot = match click.slot {
            OUTSIDE => None,
            s if (0..=max_slot).contains(&s) => Some(s as usize),
            s => return Err(ClickError::SlotOutOfRange { slot: s, max: max_slot }),
        };
        let inside = || slot.ok_or_else(malformed);

        let action = match (click.mode, click.button) {
            (0, 0) => ClickAction::Pickup {
                slot,
                button: MouseButton::Left,
            },
            (0, 1) => ClickAction::Pickup {
                slot,
                button: MouseButton::Right,
            },
            (1, 0 | 1) => ClickAction::QuickMove { slot: inside()? },
            (2, b @ 0..=8) => ClickAction::HotbarSwap {
                slot: inside()?,
                hotbar: b as u8,
            },
            (3, 2) => ClickAction::Clone { slot: inside()? },
            (4, b @ 0..=1) => ClickAction::Drop {
                slot,
                whole_stack: b == 1,
            },
            (5, b @ 0..=10) => {
                let kind = match b / 4 {
                    0 => DragKind::Left,
                    1 => DragKind::Right,
                    _ => DragKind::Middle,
                };
                match b % 4 {
                    0 => ClickAction::Drag(DragStep::Start(kind)),
                    1 => ClickAction::Drag(DragStep::Add {
                        kind,
                        slot: inside()?,
                    }),
                    2 => ClickAction::Drag(DragStep::End(kind)),
                    _ => return Err(malformed()),
                }
            }
            (6, 0) => ClickAction::Collect { slot: inside()? },
            _ => return Err(malformed()),
        };
        Ok(action)
    }

    /// Slot whose contents the client's claim describes. Drags and clicks
    /// outside the window carry no meaningful claim.
    pub fn claimed_slot(&self) -> Option<usize> {
        match *self {
            ClickAction::Pickup { slot, .. } | ClickAction::Drop { slot, .. } => slot,
            ClickAction::QuickMove { slot }
            | ClickAction::HotbarSwap { slot, .. }
            | ClickAction::Clone { slot }
            | ClickAction::Collect { slot } => Some(slot),
            ClickAction::Drag(_) => None,
        }
    }

    pub fn is_drag(&self) -> bool {
        matches!(self, ClickAction::Drag(_))
    }
}

/// Right-click pickup size: half rounded down, a lone item moves whole.
fn half_of(count: u8) -> u8 {
    if count == 1 {
        1
    } else {
        count / 2
    }
}

/// Everything a click may touch: the window, the recipes for its grid, the
/// drag log of whatever the window shows, and the clicking user.
pub(crate) struct ClickContext<'a> {
    pub view: WindowView<'a>,
    pub recipes: &'a RecipeBook,
    pub actions: &'a mut ActionLog,
    pub user: UserId,
    pub creative: bool,
    pub action_number: i16,
    /// Stacks thrown out of the window.
    pub drops: Vec<ItemStack>,
}

impl ClickContext<'_> {
    /// Apply an already validated action.
    pub fn apply(&mut self, action: ClickAction) -> Result<(), ClickError> {
        if !action.is_drag() {
            self.actions.clear_for(self.user);
        }
        match action {
            ClickAction::Pickup { slot: None, button } => self.throw_cursor(button),
            ClickAction::Pickup {
                slot: Some(slot),
                button,
            } => self.pickup(slot, button),
            ClickAction::QuickMove { slot } => self.quick_move(slot),
            ClickAction::HotbarSwap { slot, hotbar } => self.hotbar_swap(slot, hotbar),
            ClickAction::Clone { slot } => {
                if !self.creative {
                    return Err(ClickError::NotPermitted("middle click"));
                }
                self.clone_stack(slot);
            }
            ClickAction::Drop { slot: None, .. } => {}
            ClickAction::Drop {
                slot: Some(slot),
                whole_stack,
            } => self.drop_from(slot, whole_stack),
            ClickAction::Drag(step) => self.drag(step)?,
            ClickAction::Collect { slot } => self.collect(slot),
        }
        self.view.refresh_output(self.recipes);
        Ok(())
    }

    fn kind(&self) -> WindowKind {
        self.view.kind()
    }

    fn is_craft_output(&self, slot: usize) -> bool {
        self.kind().crafting_grid().is_some() && self.kind().output_slot() == Some(slot)
    }

    fn is_output(&self, slot: usize) -> bool {
        self.kind().output_slot() == Some(slot)
    }

    fn is_armour(&self, slot: usize) -> bool {
        self.kind() == WindowKind::Player && ARMOUR.contains(&slot)
    }

    fn throw_cursor(&mut self, button: MouseButton) {
        let cursor = self.view.cursor_mut();
        let n = match button {
            MouseButton::Left => cursor.count(),
            MouseButton::Right => 1,
        };
        let thrown = cursor.take(n);
        if !thrown.is_empty() {
            self.drops.push(thrown);
        }
    }

    fn pickup(&mut self, slot: usize, button: MouseButton) {
        if self.is_craft_output(slot) {
            self.take_crafted();
        } else if self.is_output(slot) {
            self.take_only(slot, button);
        } else if self.is_armour(slot) {
            self.armour_click(slot, button);
        } else {
            match button {
                MouseButton::Left => self.left_click(slot),
                MouseButton::Right => self.right_click(slot),
            }
        }
    }

    fn left_click(&mut self, slot: usize) {
        let (stack, cursor) = self.view.with_cursor(slot);
        if cursor.is_empty() {
            *cursor = std::mem::replace(stack, ItemStack::empty());
        } else if stack.is_empty() || stack.stacks_with(cursor) {
            let limit = cursor.max_stack();
            stack.merge_from(cursor, limit);
        } else {
            std::mem::swap(stack, cursor);
        }
    }

    fn right_click(&mut self, slot: usize) {
        let (stack, cursor) = self.view.with_cursor(slot);
        if cursor.is_empty() {
            *cursor = stack.take(half_of(stack.count()));
        } else if stack.is_empty() || stack.stacks_with(cursor) {
            let limit = stack.count().saturating_add(1).min(cursor.max_stack());
            stack.merge_from(cursor, limit);
        } else {
            std::mem::swap(stack, cursor);
        }
    }

    /// Output slots only give items; the cursor may collect more of the
    /// same kind.
    fn take_only(&mut self, slot: usize, button: MouseButton) {
        let (stack, cursor) = self.view.with_cursor(slot);
        if cursor.is_empty() {
            let n = match button {
                MouseButton::Left => stack.count(),
                MouseButton::Right => half_of(stack.count()),
            };
            *cursor = stack.take(n);
        } else if cursor.stacks_with(stack) {
            let limit = cursor.max_stack();
            cursor.merge_from(stack, limit);
        }
    }

    /// Take one crafting result onto the cursor.
    fn take_crafted(&mut self) {
        let made = self.view.preview(self.recipes);
        let cursor = self.view.cursor();
        if made.is_empty()
            || !(cursor.is_empty() || (cursor.stacks_with(&made) && made.count() <= cursor.room()))
        {
            return;
        }
        if let Some(mut made) = self.view.craft_once(self.recipes) {
            debug!("{} crafted {} x {}", self.user, made.count(), made.item());
            let cursor = self.view.cursor_mut();
            let limit = made.max_stack();
            cursor.merge_from(&mut made, limit);
        }
    }

    fn armour_click(&mut self, slot: usize, button: MouseButton) {
        let (stack, cursor) = self.view.with_cursor(slot);
        if cursor.is_empty() {
            *cursor = std::mem::replace(stack, ItemStack::empty());
            return;
        }
        if !PlayerInventory::can_be_armour(slot, cursor.item()) {
            return;
        }
        if stack.is_empty() {
            stack.merge_from(cursor, 1);
        } else if cursor.count() == 1 && button == MouseButton::Left {
            std::mem::swap(stack, cursor);
        }
    }

    fn quick_move(&mut self, slot: usize) {
        if self.is_craft_output(slot) {
            self.craft_into_storage();
            return;
        }
        let kind = self.kind();
        let n = self.view.container_slots();
        let hotbar: Vec<usize> = self.view.hotbar().collect();
        let main: Vec<usize> = self.view.main().collect();

        let targets = if kind == WindowKind::Player {
            if !hotbar.contains(&slot) && !main.contains(&slot) {
                self.view.storage()
            } else {
                if self.equip(slot) {
                    return;
                }
                if hotbar.contains(&slot) {
                    main
                } else {
                    hotbar
                }
            }
        } else if slot < n {
            self.view.storage()
        } else if kind.input_slots().is_empty() {
            if hotbar.contains(&slot) {
                main
            } else {
                hotbar
            }
        } else {
            kind.input_slots().collect()
        };

        let mut moving = std::mem::replace(self.view.slot_mut(slot), ItemStack::empty());
        self.view.transfer(&mut moving, &targets);
        *self.view.slot_mut(slot) = moving;
    }

    /// Shift-click of a wearable item in window 0 puts one into its empty
    /// armour slot.
    fn equip(&mut self, slot: usize) -> bool {
        let Some(piece) = armour_slot(self.view.slot(slot).item()) else {
            return false;
        };
        let target = ARMOUR.start + piece.index();
        if !self.view.slot(target).is_empty() {
            return false;
        }
        let one = self.view.slot_mut(slot).take(1);
        *self.view.slot_mut(target) = one;
        true
    }

    /// Shift-click on a crafting output: craft while the grid matches and
    /// the player has room for the result.
    fn craft_into_storage(&mut self) {
        let storage = self.view.storage();
        loop {
            let made = self.view.preview(self.recipes);
            if made.is_empty() || self.view.room_for(&made, &storage) < made.count() as u32 {
                break;
            }
            let Some(mut made) = self.view.craft_once(self.recipes) else {
                break;
            };
            self.view.transfer(&mut made, &storage);
        }
    }

    fn hotbar_swap(&mut self, slot: usize, hotbar: u8) {
        let target = self.view.hotbar().start + hotbar as usize;
        if slot == target {
            return;
        }
        if self.is_craft_output(slot) {
            if self.view.slot(target).is_empty() {
                if let Some(made) = self.view.craft_once(self.recipes) {
                    *self.view.slot_mut(target) = made;
                }
            }
            return;
        }
        if self.is_output(slot) {
            let mut moving = std::mem::replace(self.view.slot_mut(slot), ItemStack::empty());
            self.view.transfer(&mut moving, &[target]);
            *self.view.slot_mut(slot) = moving;
            return;
        }
        if self.is_armour(slot) {
            let incoming = self.view.slot(target);
            if !incoming.is_empty()
                && (incoming.count() != 1 || !PlayerInventory::can_be_armour(slot, incoming.item()))
            {
                return;
            }
        }
        self.view.swap(slot, target);
    }

    /// Middle click duplicates the slot's item onto an empty cursor as a
    /// full stack of its max size, leaving the slot untouched.
    fn clone_stack(&mut self, slot: usize) {
        if !self.view.cursor().is_empty() {
            return;
        }
        let source = self.view.slot(slot);
        if source.is_empty() {
            return;
        }
        let copy = source.with_count(source.max_stack());
        *self.view.cursor_mut() = copy;
    }

    fn drop_from(&mut self, slot: usize, whole_stack: bool) {
        if self.is_craft_output(slot) {
            if let Some(made) = self.view.craft_once(self.recipes) {
                self.drops.push(made);
            }
            return;
        }
        let stack = self.view.slot_mut(slot);
        let n = if whole_stack { stack.count() } else { 1 };
        let dropped = stack.take(n);
        if !dropped.is_empty() {
            self.drops.push(dropped);
        }
    }

    /// Whether a drag may put items into `slot`.
    fn drag_target(&self, slot: usize) -> bool {
        let cursor = self.view.cursor();
        let stack = self.view.slot(slot);
        !cursor.is_empty()
            && !self.is_output(slot)
            && (stack.is_empty() || stack.stacks_with(cursor))
            && (!self.is_armour(slot) || PlayerInventory::can_be_armour(slot, cursor.item()))
    }

    fn drag(&mut self, step: DragStep) -> Result<(), ClickError> {
        let (user, number) = (self.user, self.action_number);
        match step {
            DragStep::Start(kind) => {
                if kind == DragKind::Middle && !self.creative {
                    return Err(ClickError::NotPermitted("middle drag"));
                }
                if self.view.cursor().is_empty() {
                    return Err(DragError::EmptyCursor.into());
                }
                self.actions.start(user, kind, number)?;
            }
            DragStep::Add { kind, slot } => {
                let recorded = self.actions.check(user, kind, number)?.slots.len();
                let room = kind == DragKind::Middle || recorded < self.view.cursor().count() as usize;
                if room && self.drag_target(slot) {
                    self.actions.add(user, kind, number, slot)?;
                }
            }
            DragStep::End(kind) => {
                let session = self.actions.finish(user, kind, number)?;
                let slots: Vec<usize> = session
                    .slots
                    .into_iter()
                    .filter(|&s| self.drag_target(s))
                    .collect();
                self.distribute(kind, &slots);
            }
        }
        Ok(())
    }

    fn distribute(&mut self, kind: DragKind, slots: &[usize]) {
        if slots.is_empty() {
            return;
        }
        match kind {
            DragKind::Left => {
                let total = self.view.cursor().count() as usize;
                let per = total / slots.len();
                let rem = total % slots.len();
                for (i, &slot) in slots.iter().enumerate() {
                    let want = per + if i == 0 { rem } else { 0 };
                    self.place(slot, want);
                }
            }
            DragKind::Right => {
                for &slot in slots {
                    self.place(slot, 1);
                }
            }
            DragKind::Middle => {
                let cursor = self.view.cursor().clone();
                for &slot in slots {
                    if self.view.slot(slot).is_empty() {
                        *self.view.slot_mut(slot) = cursor.with_count(cursor.max_stack());
                    }
                }
            }
        }
    }

    /// Move up to `want` items from the cursor into `slot`, capped by the
    /// slot's room.
    fn place(&mut self, slot: usize, want: usize) {
        let cap = if self.is_armour(slot) { 1 } else { u8::MAX };
        let (stack, cursor) = self.view.with_cursor(slot);
        let want = want.min(u8::MAX as usize) as u8;
        let limit = stack
            .count()
            .saturating_add(want)
            .min(cursor.max_stack())
            .min(cap);
        stack.merge_from(cursor, limit);
    }

    /// Double click: gather matching stacks onto the cursor, partial stacks
    /// before full ones.
    fn collect(&mut self, _slot: usize) {
        if self.view.cursor().is_empty() {
            return;
        }
        for want_full in [false, true] {
            for i in 0..self.view.len() {
                if self.is_output(i) {
                    continue;
                }
                let (stack, cursor) = self.view.with_cursor(i);
                if cursor.room() == 0 {
                    return;
                }
                if !stack.stacks_with(cursor) || (stack.room() == 0) != want_full {
                    continue;
                }
                let limit = cursor.max_stack();
                cursor.merge_from(stack, limit);
            }
        }
    }
}
