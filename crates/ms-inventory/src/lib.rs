//! Container and inventory logic: shared containers, window sessions, shaped
//! crafting and the click protocol.
//!
//! Everything here runs on the server's single event thread. A click, open
//! or close is handled to completion (mutation plus every viewer update)
//! before the next event is looked at, so nothing in this crate locks.

pub mod click;
pub mod container;
pub mod error;
pub mod manager;
pub mod outbound;
pub mod player;
pub mod recipe;
pub mod recipe_file;
pub mod storage;
pub mod window;

mod view;

use std::fmt;

pub use click::{ClaimedItem, ClickAction, ClickWindow, DragKind, DragStep, MouseButton};
pub use container::{ActionLog, Container, ContainerArena};
pub use error::{ClickError, DragError, InventoryError, RecipeError, StorageError};
pub use manager::InventoryManager;
pub use outbound::Outbound;
pub use player::{PlayerInventory, PlayerState};
pub use recipe::{HealthMatch, Ingredient, Recipe, RecipeBook};
pub use recipe_file::enabled_recipe_files;
pub use storage::{ContainerStorage, MemoryStorage};
pub use window::{WindowKind, WindowSession, WindowTarget};

/// Identity of a connected user, assigned by the session registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user#{}", self.0)
    }
}

/// World position of a container block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
