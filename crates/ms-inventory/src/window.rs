//! Window kinds, their slot layouts, and the per-user window sessions.

use std::ops::Range;

use crate::BlockPos;

/// Number of player slots (main + hotbar) appended to every container window.
pub const PLAYER_SECTION: usize = 36;

/// Highest window id handed out before wrapping back to 1.
pub const MAX_WINDOW_ID: u8 = 100;

/// Kind of window a session shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKind {
    /// The player's own inventory, always window 0.
    Player,
    /// Crafting table.
    Workbench,
    Chest,
    LargeChest,
    Furnace,
    BrewingStand,
}

/// Shape and placement of a crafting grid inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub first: usize,
    pub width: usize,
    pub height: usize,
}

impl GridLayout {
    pub fn slots(&self) -> Range<usize> {
        self.first..self.first + self.width * self.height
    }
}

impl WindowKind {
    /// Inventory type string sent when the window opens.
    pub fn type_name(self) -> &'static str {
        match self {
            WindowKind::Player => "minecraft:player",
            WindowKind::Workbench => "minecraft:crafting_table",
            WindowKind::Chest => "minecraft:chest",
            WindowKind::LargeChest => "minecraft:large_chest",
            WindowKind::Furnace => "minecraft:furnace",
            WindowKind::BrewingStand => "minecraft:brewing_stand",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Some(match name {
            "minecraft:crafting_table" => WindowKind::Workbench,
            "minecraft:chest" => WindowKind::Chest,
            "minecraft:large_chest" => WindowKind::LargeChest,
            "minecraft:furnace" => WindowKind::Furnace,
            "minecraft:brewing_stand" => WindowKind::BrewingStand,
            _ => return None,
        })
    }

    /// Slots owned by the container itself (0 for the player window, whose
    /// slots all belong to the player).
    pub fn container_slots(self) -> usize {
        match self {
            WindowKind::Player => 0,
            WindowKind::Workbench => 10,
            WindowKind::Chest => 27,
            WindowKind::LargeChest => 54,
            WindowKind::Furnace => 3,
            WindowKind::BrewingStand => 4,
        }
    }

    /// Total number of slots in the window.
    pub fn window_slots(self) -> usize {
        match self {
            WindowKind::Player => crate::player::PLAYER_SLOTS,
            kind => kind.container_slots() + PLAYER_SECTION,
        }
    }

    /// Highest valid slot index: 44, 45, 62, 89, 38 and 39.
    pub fn max_slot(self) -> i16 {
        self.window_slots() as i16 - 1
    }

    /// Slot that receives a crafting or smelting result.
    pub fn output_slot(self) -> Option<usize> {
        match self {
            WindowKind::Player | WindowKind::Workbench => Some(0),
            WindowKind::Furnace => Some(2),
            _ => None,
        }
    }

    pub fn crafting_grid(self) -> Option<GridLayout> {
        match self {
            WindowKind::Player => Some(GridLayout {
                first: 1,
                width: 2,
                height: 2,
            }),
            WindowKind::Workbench => Some(GridLayout {
                first: 1,
                width: 3,
                height: 3,
            }),
            _ => None,
        }
    }

    /// Container slots a shift-click from the player side may fill.
    pub fn input_slots(self) -> Range<usize> {
        match self {
            WindowKind::Chest | WindowKind::LargeChest | WindowKind::BrewingStand => {
                0..self.container_slots()
            }
            WindowKind::Furnace => 0..2,
            WindowKind::Player | WindowKind::Workbench => 0..0,
        }
    }

    /// Whether the contents outlive the last viewer (written to storage).
    pub fn is_persistent(self) -> bool {
        !matches!(self, WindowKind::Player | WindowKind::Workbench)
    }
}

/// What a window id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowTarget {
    /// The user's own inventory.
    Player,
    /// A crafting table at a position.
    Crafting(BlockPos),
    /// A chest, furnace or brewing stand at a position.
    Container(BlockPos),
}

impl WindowTarget {
    pub fn pos(self) -> Option<BlockPos> {
        match self {
            WindowTarget::Player => None,
            WindowTarget::Crafting(pos) | WindowTarget::Container(pos) => Some(pos),
        }
    }
}

/// Binding of a user-local window id to what it shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSession {
    pub window_id: u8,
    pub kind: WindowKind,
    pub target: WindowTarget,
}

impl WindowSession {
    pub fn player() -> Self {
        Self {
            window_id: 0,
            kind: WindowKind::Player,
            target: WindowTarget::Player,
        }
    }

    pub fn for_container(window_id: u8, kind: WindowKind, pos: BlockPos) -> Self {
        let target = if kind == WindowKind::Workbench {
            WindowTarget::Crafting(pos)
        } else {
            WindowTarget::Container(pos)
        };
        Self {
            window_id,
            kind,
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_slot_maxima() {
        assert_eq!(WindowKind::Player.max_slot(), 44);
        assert_eq!(WindowKind::Chest.max_slot(), 62);
        assert_eq!(WindowKind::LargeChest.max_slot(), 89);
        assert_eq!(WindowKind::Workbench.max_slot(), 45);
        assert_eq!(WindowKind::Furnace.max_slot(), 38);
        assert_eq!(WindowKind::BrewingStand.max_slot(), 39);
    }

    #[test]
    fn type_names_roundtrip() {
        for kind in [WindowKind::Chest, WindowKind::LargeChest, WindowKind::Furnace] {
            assert_eq!(WindowKind::from_type_name(kind.type_name()), Some(kind));
        }
    }

    #[test]
    fn crafting_grids() {
        assert_eq!(WindowKind::Player.crafting_grid().unwrap().slots(), 1..5);
        assert_eq!(WindowKind::Workbench.crafting_grid().unwrap().slots(), 1..10);
        assert!(WindowKind::Chest.crafting_grid().is_none());
    }

    #[test]
    fn workbench_sessions_target_the_grid() {
        let pos = BlockPos::new(1, 2, 3);
        let s = WindowSession::for_container(4, WindowKind::Workbench, pos);
        assert_eq!(s.target, WindowTarget::Crafting(pos));
        let s = WindowSession::for_container(5, WindowKind::Chest, pos);
        assert_eq!(s.target, WindowTarget::Container(pos));
        assert_eq!(s.target.pos(), Some(pos));
    }
}
