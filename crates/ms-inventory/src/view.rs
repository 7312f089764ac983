//! Window-indexed access to container and player slots.

use std::ops::Range;

use ms_item::ItemStack;

use crate::player::{PlayerInventory, HOTBAR, MAIN};
use crate::recipe::RecipeBook;
use crate::window::WindowKind;

enum Loc {
    Container(usize),
    Player(usize),
}

/// One window as the client sees it: the container's own slots first, then
/// the viewer's main inventory and hotbar. For window 0 the indices are the
/// player's slot numbers.
pub(crate) struct WindowView<'a> {
    kind: WindowKind,
    container: &'a mut [ItemStack],
    inv: &'a mut PlayerInventory,
}

impl<'a> WindowView<'a> {
    pub fn new(kind: WindowKind, container: &'a mut [ItemStack], inv: &'a mut PlayerInventory) -> Self {
        Self {
            kind,
            container,
            inv,
        }
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.kind.window_slots()
    }

    /// Number of leading slots owned by the container.
    pub fn container_slots(&self) -> usize {
        self.kind.container_slots()
    }

    fn locate(&self, slot: usize) -> Loc {
        let n = self.container_slots();
        if self.kind == WindowKind::Player {
            Loc::Player(slot)
        } else if slot < n {
            Loc::Container(slot)
        } else {
            Loc::Player(MAIN.start + slot - n)
        }
    }

    /// Window index of a player slot number.
    fn window_index(&self, player_slot: usize) -> usize {
        match self.kind {
            WindowKind::Player => player_slot,
            _ => self.container_slots() + player_slot - MAIN.start,
        }
    }

    pub fn main(&self) -> Range<usize> {
        self.window_index(MAIN.start)..self.window_index(MAIN.end)
    }

    pub fn hotbar(&self) -> Range<usize> {
        self.window_index(HOTBAR.start)..self.window_index(HOTBAR.end)
    }

    /// Player storage in fill order: hotbar, then main.
    pub fn storage(&self) -> Vec<usize> {
        self.hotbar().chain(self.main()).collect()
    }

    pub fn slot(&self, slot: usize) -> &ItemStack {
        match self.locate(slot) {
            Loc::Container(i) => &self.container[i],
            Loc::Player(i) => &self.inv.slots[i],
        }
    }

    pub fn slot_mut(&mut self, slot: usize) -> &mut ItemStack {
        match self.locate(slot) {
            Loc::Container(i) => &mut self.container[i],
            Loc::Player(i) => &mut self.inv.slots[i],
        }
    }

    pub fn cursor(&self) -> &ItemStack {
        &self.inv.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut ItemStack {
        &mut self.inv.cursor
    }

    /// A slot and the cursor, borrowed together.
    pub fn with_cursor(&mut self, slot: usize) -> (&mut ItemStack, &mut ItemStack) {
        match self.locate(slot) {
            Loc::Container(i) => (&mut self.container[i], &mut self.inv.cursor),
            Loc::Player(i) => (&mut self.inv.slots[i], &mut self.inv.cursor),
        }
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let first = std::mem::take(self.slot_mut(a));
        let second = std::mem::replace(self.slot_mut(b), first);
        *self.slot_mut(a) = second;
    }

    /// Every slot of the window, in order.
    pub fn items(&self) -> Vec<ItemStack> {
        (0..self.len()).map(|i| self.slot(i).clone()).collect()
    }

    /// How many items like `stack` the given slots could still take.
    pub fn room_for(&self, stack: &ItemStack, targets: &[usize]) -> u32 {
        let max = stack.max_stack() as u32;
        targets
            .iter()
            .map(|&t| self.slot(t))
            .map(|s| {
                if s.is_empty() {
                    max
                } else if s.stacks_with(stack) {
                    max.saturating_sub(s.count() as u32)
                } else {
                    0
                }
            })
            .sum()
    }

    /// Move `moving` into `targets`: partial stacks first, then empty slots.
    pub fn transfer(&mut self, moving: &mut ItemStack, targets: &[usize]) {
        let limit = moving.max_stack();
        for &t in targets {
            if moving.is_empty() {
                return;
            }
            if self.slot(t).stacks_with(moving) {
                self.slot_mut(t).merge_from(moving, limit);
            }
        }
        for &t in targets {
            if moving.is_empty() {
                return;
            }
            if self.slot(t).is_empty() {
                self.slot_mut(t).merge_from(moving, limit);
            }
        }
    }

    fn grid_contents(&self) -> Option<(Vec<ItemStack>, usize, usize)> {
        let grid = self.kind.crafting_grid()?;
        let cells = grid.slots().map(|i| self.slot(i).clone()).collect();
        Some((cells, grid.width, grid.height))
    }

    /// What the crafting grid currently makes.
    pub fn preview(&self, recipes: &RecipeBook) -> ItemStack {
        match self.grid_contents() {
            Some((cells, w, h)) => recipes.do_craft(&cells, w, h),
            None => ItemStack::empty(),
        }
    }

    /// Recompute the crafting output slot from the grid.
    pub fn refresh_output(&mut self, recipes: &RecipeBook) {
        if self.kind.crafting_grid().is_none() {
            return;
        }
        let made = self.preview(recipes);
        if let Some(out) = self.kind.output_slot() {
            *self.slot_mut(out) = made;
        }
    }

    /// Craft once: consume one item from every grid cell and return the
    /// result, or `None` when the grid matches nothing.
    pub fn craft_once(&mut self, recipes: &RecipeBook) -> Option<ItemStack> {
        let grid = self.kind.crafting_grid()?;
        let made = self.preview(recipes);
        if made.is_empty() {
            return None;
        }
        for i in grid.slots() {
            self.slot_mut(i).dec_count(1);
        }
        self.refresh_output(recipes);
        Some(made)
    }
}
