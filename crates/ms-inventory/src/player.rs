//! Per-user inventory state.
//!
//! Window 0 slot layout: 0 craft output, 1-4 the 2x2 grid, 5-8 armour
//! (helmet first), 9-35 main, 36-44 hotbar.

use std::ops::Range;

use ms_item::{armour_slot, max_stack, ItemStack};

use crate::container::ActionLog;
use crate::window::{WindowSession, MAX_WINDOW_ID};
use crate::UserId;

pub const PLAYER_SLOTS: usize = 45;
pub const CRAFT_OUTPUT: usize = 0;
pub const CRAFT_GRID: Range<usize> = 1..5;
pub const ARMOUR: Range<usize> = 5..9;
pub const MAIN: Range<usize> = 9..36;
pub const HOTBAR: Range<usize> = 36..45;

/// Everything a player carries, indexed by window-0 slot number.
#[derive(Debug, Clone)]
pub struct PlayerInventory {
    pub slots: Vec<ItemStack>,
    /// Stack held on the mouse cursor.
    pub cursor: ItemStack,
}

impl Default for PlayerInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerInventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self {
            slots: (0..PLAYER_SLOTS).map(|_| ItemStack::empty()).collect(),
            cursor: ItemStack::empty(),
        }
    }

    /// Storage slots in fill order: hotbar first, then main.
    fn storage_order() -> impl Iterator<Item = usize> {
        HOTBAR.chain(MAIN)
    }

    /// How many items like `stack` could still be stored.
    fn capacity_for(&self, stack: &ItemStack) -> u32 {
        let max = stack.max_stack() as u32;
        Self::storage_order()
            .map(|i| &self.slots[i])
            .map(|slot| {
                if slot.is_empty() {
                    max
                } else if slot.stacks_with(stack) {
                    max.saturating_sub(slot.count() as u32)
                } else {
                    0
                }
            })
            .sum()
    }

    /// Whether `count` items of the given kind fit, merging into partial
    /// stacks first.
    pub fn is_space(&self, item: i16, count: u8, health: i16) -> bool {
        let probe = ItemStack::new(item, 1, health);
        if probe.is_empty() {
            return false;
        }
        self.capacity_for(&probe) >= count as u32
    }

    /// Store `count` items, all or nothing. Returns false and leaves the
    /// inventory untouched when they do not fit. Counts above the stack
    /// limit are spread over several slots.
    pub fn add_items(&mut self, item: i16, count: u8, health: i16) -> bool {
        if !self.is_space(item, count, health) {
            return false;
        }
        let mut remaining = ItemStack::new(item, count, health);
        let limit = max_stack(item);
        while !remaining.is_empty() {
            let chunk = remaining.take(limit);
            let leftover = self.store(chunk);
            debug_assert!(leftover.is_empty(), "capacity checked above");
        }
        true
    }

    /// Put a stack into main/hotbar storage, merging first. Returns what did
    /// not fit.
    pub fn store(&mut self, mut stack: ItemStack) -> ItemStack {
        let limit = stack.max_stack();
        for i in Self::storage_order() {
            if stack.is_empty() {
                return stack;
            }
            if self.slots[i].stacks_with(&stack) {
                self.slots[i].merge_from(&mut stack, limit);
            }
        }
        for i in Self::storage_order() {
            if stack.is_empty() {
                break;
            }
            if self.slots[i].is_empty() {
                self.slots[i].merge_from(&mut stack, limit);
            }
        }
        stack
    }

    /// Whether `item` may sit in window slot `slot`. Only the armour slots
    /// restrict what goes in.
    pub fn can_be_armour(slot: usize, item: i16) -> bool {
        if !ARMOUR.contains(&slot) {
            return true;
        }
        armour_slot(item).is_some_and(|a| ARMOUR.start + a.index() == slot)
    }

    /// Empty the 2x2 grid and craft output, returning the grid contents.
    pub fn take_grid(&mut self) -> Vec<ItemStack> {
        self.slots[CRAFT_OUTPUT].clear();
        CRAFT_GRID
            .map(|i| std::mem::replace(&mut self.slots[i], ItemStack::empty()))
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// A joined user: inventory, open windows and drag state for window 0.
#[derive(Debug)]
pub struct PlayerState {
    pub user: UserId,
    pub inventory: PlayerInventory,
    /// Gates middle-click clone and middle drag.
    pub creative: bool,
    /// Open windows; window 0 is always first.
    pub windows: Vec<WindowSession>,
    next_window_id: u8,
    pub actions: ActionLog,
}

impl PlayerState {
    pub fn new(user: UserId, creative: bool) -> Self {
        Self {
            user,
            inventory: PlayerInventory::new(),
            creative,
            windows: vec![WindowSession::player()],
            next_window_id: 1,
            actions: ActionLog::default(),
        }
    }

    pub fn session(&self, window_id: i8) -> Option<WindowSession> {
        if window_id < 0 {
            return None;
        }
        self.windows
            .iter()
            .find(|w| w.window_id == window_id as u8)
            .copied()
    }

    /// The open container window, if any.
    pub fn container_session(&self) -> Option<WindowSession> {
        self.windows.iter().find(|w| w.window_id != 0).copied()
    }

    /// Next container window id, cycling through 1..=100.
    pub fn allocate_window_id(&mut self) -> u8 {
        let id = self.next_window_id;
        self.next_window_id = if id >= MAX_WINDOW_ID { 1 } else { id + 1 };
        id
    }

    /// Forget a container window. Window 0 cannot be removed.
    pub fn remove_session(&mut self, window_id: u8) -> Option<WindowSession> {
        if window_id == 0 {
            return None;
        }
        let idx = self.windows.iter().position(|w| w.window_id == window_id)?;
        Some(self.windows.remove(idx))
    }
}
