//! Line protocol between the session layer and the inventory core.
//!
//! Each input line is one JSON object tagged by `type`; every reply is
//! written as one JSON object per line, in the order the core produced it.

use ms_inventory::{
    BlockPos, ClaimedItem, ClickWindow, ContainerStorage, InventoryManager, Outbound, UserId,
    WindowKind,
};
use ms_item::ItemStack;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Item fields as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default = "empty_id")]
    pub id: i16,
    #[serde(default)]
    pub count: u8,
    #[serde(default)]
    pub health: i16,
}

fn empty_id() -> i16 {
    -1
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            id: empty_id(),
            count: 0,
            health: 0,
        }
    }
}

impl From<&ItemStack> for Slot {
    fn from(stack: &ItemStack) -> Self {
        if stack.is_empty() {
            return Self::default();
        }
        Self {
            id: stack.item(),
            count: stack.count(),
            health: stack.health(),
        }
    }
}

impl Slot {
    fn to_stack(self) -> ItemStack {
        ItemStack::new(self.id, self.count, self.health)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Join {
        user: u32,
        #[serde(default)]
        creative: bool,
    },
    Leave {
        user: u32,
    },
    Open {
        user: u32,
        kind: String,
        x: i32,
        y: i32,
        z: i32,
    },
    Close {
        user: u32,
        window: i8,
    },
    Click {
        user: u32,
        window: i8,
        slot: i16,
        button: i8,
        action: i16,
        mode: i8,
        #[serde(default)]
        item: Slot,
    },
    SetSlot {
        user: u32,
        window: i8,
        slot: i16,
        #[serde(default)]
        item: Slot,
    },
    Update {
        user: u32,
        window: i8,
    },
    Pickup {
        user: u32,
        item: i16,
        count: u8,
        #[serde(default)]
        health: i16,
    },
    Space {
        user: u32,
        item: i16,
        count: u8,
        #[serde(default)]
        health: i16,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    OpenWindow {
        user: u32,
        window: u8,
        kind: &'static str,
        slots: u8,
    },
    CloseWindow {
        user: u32,
        window: u8,
    },
    WindowItems {
        user: u32,
        window: u8,
        items: Vec<Slot>,
    },
    SetSlot {
        user: u32,
        window: i8,
        slot: i16,
        item: Slot,
    },
    Transaction {
        user: u32,
        window: u8,
        action: i16,
        accepted: bool,
    },
    SpawnItem {
        user: u32,
        item: Slot,
    },
    Space {
        user: u32,
        fits: bool,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        user: Option<u32>,
        message: String,
    },
}

impl From<&Outbound> for Reply {
    fn from(msg: &Outbound) -> Self {
        match msg {
            Outbound::OpenWindow {
                user,
                window_id,
                kind,
                slots,
            } => Reply::OpenWindow {
                user: user.0,
                window: *window_id,
                kind: kind.type_name(),
                slots: *slots,
            },
            Outbound::CloseWindow { user, window_id } => Reply::CloseWindow {
                user: user.0,
                window: *window_id,
            },
            Outbound::WindowItems {
                user,
                window_id,
                items,
            } => Reply::WindowItems {
                user: user.0,
                window: *window_id,
                items: items.iter().map(Slot::from).collect(),
            },
            Outbound::SetSlot {
                user,
                window_id,
                slot,
                item,
            } => Reply::SetSlot {
                user: user.0,
                window: *window_id,
                slot: *slot,
                item: Slot::from(item),
            },
            Outbound::Transaction {
                user,
                window_id,
                action_number,
                accepted,
            } => Reply::Transaction {
                user: user.0,
                window: *window_id,
                action: *action_number,
                accepted: *accepted,
            },
            Outbound::SpawnItem { user, item } => Reply::SpawnItem {
                user: user.0,
                item: Slot::from(item),
            },
        }
    }
}

/// Accepts `chest`, `minecraft:chest`, `workbench` and the other kind names.
fn parse_kind(name: &str) -> Option<WindowKind> {
    match name {
        "workbench" => Some(WindowKind::Workbench),
        _ if name.contains(':') => WindowKind::from_type_name(name),
        _ => WindowKind::from_type_name(&format!("minecraft:{name}")),
    }
}

/// Feeds decoded events into the inventory core, one at a time.
pub struct EventHandler<S: ContainerStorage> {
    manager: InventoryManager,
    storage: S,
}

impl<S: ContainerStorage> EventHandler<S> {
    pub fn new(manager: InventoryManager, storage: S) -> Self {
        Self { manager, storage }
    }

    #[cfg(test)]
    pub fn manager(&self) -> &InventoryManager {
        &self.manager
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Parse and handle one input line.
    pub fn handle_line(&mut self, line: &str) -> Vec<Reply> {
        match serde_json::from_str::<Event>(line) {
            Ok(event) => self.handle(event),
            Err(e) => {
                warn!("Ignoring malformed event: {e}");
                vec![Reply::Error {
                    user: None,
                    message: format!("malformed event: {e}"),
                }]
            }
        }
    }

    pub fn handle(&mut self, event: Event) -> Vec<Reply> {
        debug!("Event: {event:?}");
        let mut out = Vec::new();
        let mut replies = Vec::new();
        let storage = &mut self.storage;

        let result: Result<(), (u32, String)> = match event {
            Event::Join { user, creative } => {
                if !self.manager.join(UserId(user), creative) {
                    warn!("{} joined twice", UserId(user));
                }
                Ok(())
            }
            Event::Leave { user } => self
                .manager
                .leave(UserId(user), storage, &mut out)
                .map_err(|e| (user, e.to_string())),
            Event::Open { user, kind, x, y, z } => match parse_kind(&kind) {
                Some(kind) => self
                    .manager
                    .window_open(UserId(user), kind, BlockPos::new(x, y, z), storage, &mut out)
                    .map(|_| ())
                    .map_err(|e| (user, e.to_string())),
                None => Err((user, format!("unknown window kind `{kind}`"))),
            },
            Event::Close { user, window } => self
                .manager
                .window_close(UserId(user), window, storage, &mut out)
                .map_err(|e| (user, e.to_string())),
            Event::Click {
                user,
                window,
                slot,
                button,
                action,
                mode,
                item,
            } => {
                let click = ClickWindow {
                    window_id: window,
                    slot,
                    button,
                    action_number: action,
                    mode,
                    claimed: ClaimedItem {
                        item: item.id,
                        count: item.count,
                        health: item.health,
                    },
                };
                // A refused click has already been answered with a
                // negative transaction and a resync.
                if let Err(e) = self.manager.window_click(UserId(user), &click, &mut out) {
                    debug!("Click refused: {e}");
                }
                Ok(())
            }
            Event::SetSlot {
                user,
                window,
                slot,
                item,
            } => self
                .manager
                .set_slot(UserId(user), window, slot, item.to_stack(), &mut out)
                .map_err(|e| (user, e.to_string())),
            Event::Update { user, window } => self
                .manager
                .update_inventory(UserId(user), window, &mut out)
                .map_err(|e| (user, e.to_string())),
            Event::Pickup {
                user,
                item,
                count,
                health,
            } => self
                .manager
                .add_items(UserId(user), item, count, health, &mut out)
                .map_err(|e| (user, e.to_string())),
            Event::Space {
                user,
                item,
                count,
                health,
            } => match self.manager.is_space(UserId(user), item, count, health) {
                Ok(fits) => {
                    replies.push(Reply::Space { user, fits });
                    Ok(())
                }
                Err(e) => Err((user, e.to_string())),
            },
        };

        let mut lines: Vec<Reply> = out.iter().map(Reply::from).collect();
        lines.append(&mut replies);
        if let Err((user, message)) = result {
            warn!("{}: {message}", UserId(user));
            lines.push(Reply::Error {
                user: Some(user),
                message,
            });
        }
        lines
    }

    /// Flush every open container to storage and close the windows.
    /// Returns the number of saved containers and the resulting replies.
    pub fn shutdown(&mut self) -> (usize, Vec<Reply>) {
        let mut out = Vec::new();
        let saved = self.manager.shutdown(&mut self.storage, &mut out);
        (saved, out.iter().map(Reply::from).collect())
    }
}
