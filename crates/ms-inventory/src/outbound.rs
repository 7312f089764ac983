//! View updates addressed to connected users.

use ms_item::ItemStack;

use crate::window::WindowKind;
use crate::UserId;

/// Window id of the cursor pseudo-slot.
pub const CURSOR_WINDOW: i8 = -1;
/// Slot index of the cursor pseudo-slot.
pub const CURSOR_SLOT: i16 = -1;

/// A message for the network layer. Handlers append these to a
/// caller-supplied `Vec` in the order they must be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    OpenWindow {
        user: UserId,
        window_id: u8,
        kind: WindowKind,
        slots: u8,
    },
    CloseWindow {
        user: UserId,
        window_id: u8,
    },
    /// Full contents of a window, player slots included.
    WindowItems {
        user: UserId,
        window_id: u8,
        items: Vec<ItemStack>,
    },
    SetSlot {
        user: UserId,
        window_id: i8,
        slot: i16,
        item: ItemStack,
    },
    /// Click acknowledgement.
    Transaction {
        user: UserId,
        window_id: u8,
        action_number: i16,
        accepted: bool,
    },
    /// Drop a stack into the world in front of the user.
    SpawnItem {
        user: UserId,
        item: ItemStack,
    },
}

impl Outbound {
    pub fn cursor(user: UserId, item: ItemStack) -> Self {
        Outbound::SetSlot {
            user,
            window_id: CURSOR_WINDOW,
            slot: CURSOR_SLOT,
            item,
        }
    }
}
