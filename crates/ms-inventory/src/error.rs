//! Error types for containers, clicks, recipes and storage.

use std::path::PathBuf;

use ms_nbt::NbtError;
use thiserror::Error;

use crate::click::ClaimedItem;
use crate::window::WindowKind;
use crate::{BlockPos, UserId};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("unknown {0}")]
    UnknownUser(UserId),

    #[error("{user} has no window {window_id}")]
    UnknownWindow { user: UserId, window_id: i8 },

    #[error("slot {slot} out of range for {kind:?} window (max {max})")]
    SlotOutOfRange { kind: WindowKind, slot: i16, max: i16 },

    #[error("container at {pos} is a {existing:?}, cannot open it as {requested:?}")]
    KindConflict {
        pos: BlockPos,
        existing: WindowKind,
        requested: WindowKind,
    },

    #[error("{0:?} is not a placeable container")]
    NotAContainer(WindowKind),

    #[error("no room for {count} x {item}:{health}")]
    NoSpace { item: i16, count: u8, health: i16 },

    #[error("container storage: {0}")]
    Storage(#[from] StorageError),
}

/// Why a click was refused. By the time one of these is returned the client
/// has already been sent a negative acknowledgement and a fresh view.
#[derive(Debug, Error)]
pub enum ClickError {
    #[error("unknown {0}")]
    UnknownUser(UserId),

    #[error("no open window {window_id}")]
    UnknownWindow { window_id: i8 },

    #[error("slot {slot} out of range (max {max})")]
    SlotOutOfRange { slot: i16, max: i16 },

    #[error("malformed click: mode {mode}, button {button}, slot {slot}")]
    Malformed { mode: i8, button: i8, slot: i16 },

    #[error("slot {slot} desync: client claims {claimed:?}, server has {actual:?}")]
    Desync {
        slot: i16,
        claimed: ClaimedItem,
        actual: ClaimedItem,
    },

    #[error("{0} requires creative mode")]
    NotPermitted(&'static str),

    #[error("drag session: {0}")]
    Drag(#[from] DragError),
}

/// Framing problems of a multi-packet drag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DragError {
    #[error("no drag in progress")]
    NotStarted,

    #[error("a drag is already in progress")]
    AlreadyActive,

    #[error("drag belongs to {0}")]
    Foreign(UserId),

    #[error("action number {got} does not match the drag's {expected}")]
    ActionMismatch { expected: i16, got: i16 },

    #[error("drag button changed mid-session")]
    KindMismatch,

    #[error("nothing on the cursor to drag")]
    EmptyCursor,
}

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("{width}x{height} recipe needs {expected} inputs, got {got}")]
    ShapeMismatch {
        width: u8,
        height: u8,
        expected: usize,
        got: usize,
    },

    #[error("recipe size {width}x{height} outside 1x1..3x3")]
    BadDimensions { width: u8, height: u8 },

    #[error("recipe pattern has no ingredients")]
    EmptyPattern,

    #[error("recipe output is empty")]
    EmptyOutput,

    #[error("same pattern already registered (output {existing})")]
    DuplicatePattern { existing: i16 },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("nbt: {0}")]
    Nbt(#[from] NbtError),

    #[error("malformed container record: {0}")]
    Malformed(String),
}
