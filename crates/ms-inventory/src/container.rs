//! Shared, world-anchored containers and the drag action log.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use ms_item::ItemStack;

use crate::click::DragKind;
use crate::error::DragError;
use crate::window::WindowKind;
use crate::{BlockPos, UserId};

/// Drag session in progress: who started it, with which button and
/// transaction id, and the slots touched so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub owner: UserId,
    pub kind: DragKind,
    pub action_number: i16,
    pub slots: Vec<usize>,
}

/// Log of a multi-packet drag. Recording is on while a session exists.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    session: Option<DragSession>,
}

impl ActionLog {
    #[cfg(test)]
    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Begin recording. Starting over an active session is a framing error
    /// and drops the old one when it was the caller's own.
    pub fn start(&mut self, owner: UserId, kind: DragKind, action_number: i16) -> Result<(), DragError> {
        if let Some(active) = &self.session {
            if active.owner != owner {
                return Err(DragError::Foreign(active.owner));
            }
            self.session = None;
            return Err(DragError::AlreadyActive);
        }
        self.session = Some(DragSession {
            owner,
            kind,
            action_number,
            slots: Vec::new(),
        });
        Ok(())
    }

    /// Validate that a packet continues the caller's session.
    pub fn check(&self, owner: UserId, kind: DragKind, action_number: i16) -> Result<&DragSession, DragError> {
        let session = self.session.as_ref().ok_or(DragError::NotStarted)?;
        if session.owner != owner {
            return Err(DragError::Foreign(session.owner));
        }
        if session.kind != kind {
            return Err(DragError::KindMismatch);
        }
        if session.action_number != action_number {
            return Err(DragError::ActionMismatch {
                expected: session.action_number,
                got: action_number,
            });
        }
        Ok(session)
    }

    /// Record a touched slot. Duplicates are ignored.
    pub fn add(&mut self, owner: UserId, kind: DragKind, action_number: i16, slot: usize) -> Result<(), DragError> {
        self.check(owner, kind, action_number)?;
        if let Some(session) = self.session.as_mut() {
            if !session.slots.contains(&slot) {
                session.slots.push(slot);
            }
        }
        Ok(())
    }

    /// End the session and hand back what was recorded.
    pub fn finish(&mut self, owner: UserId, kind: DragKind, action_number: i16) -> Result<DragSession, DragError> {
        self.check(owner, kind, action_number)?;
        self.session.take().ok_or(DragError::NotStarted)
    }

    /// Drop the session if `owner` started it.
    pub fn clear_for(&mut self, owner: UserId) {
        if self.session.as_ref().is_some_and(|s| s.owner == owner) {
            self.session = None;
        }
    }
}

/// An open chest, furnace, crafting table or brewing stand.
#[derive(Debug, Clone)]
pub struct Container {
    kind: WindowKind,
    pos: BlockPos,
    pub slots: Vec<ItemStack>,
    viewers: Vec<UserId>,
    pub actions: ActionLog,
}

impl Container {
    pub fn new(kind: WindowKind, pos: BlockPos) -> Self {
        Self::with_contents(kind, pos, Vec::new())
    }

    /// Build a container from stored contents, padding or truncating to the
    /// kind's slot count.
    pub fn with_contents(kind: WindowKind, pos: BlockPos, mut slots: Vec<ItemStack>) -> Self {
        slots.resize_with(kind.container_slots(), ItemStack::empty);
        Self {
            kind,
            pos,
            slots,
            viewers: Vec::new(),
            actions: ActionLog::default(),
        }
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    pub fn viewers(&self) -> &[UserId] {
        &self.viewers
    }

    /// Returns false if the user was already viewing.
    pub fn add_viewer(&mut self, user: UserId) -> bool {
        if self.viewers.contains(&user) {
            return false;
        }
        self.viewers.push(user);
        true
    }

    /// Remove a viewer and any drag they left half done.
    pub fn remove_viewer(&mut self, user: UserId) -> bool {
        self.actions.clear_for(user);
        let before = self.viewers.len();
        self.viewers.retain(|v| *v != user);
        self.viewers.len() != before
    }

    pub fn has_viewers(&self) -> bool {
        !self.viewers.is_empty()
    }
}

/// All open containers, keyed by world position. Sessions refer to a
/// container by its position, never by reference.
#[derive(Debug, Default)]
pub struct ContainerArena {
    open: HashMap<BlockPos, Container>,
}

impl ContainerArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pos: &BlockPos) -> Option<&Container> {
        self.open.get(pos)
    }

    pub fn get_mut(&mut self, pos: &BlockPos) -> Option<&mut Container> {
        self.open.get_mut(pos)
    }

    /// The container at `pos`, created by `make` if none is open there.
    pub fn open_with<E>(
        &mut self,
        pos: BlockPos,
        make: impl FnOnce() -> Result<Container, E>,
    ) -> Result<&mut Container, E> {
        match self.open.entry(pos) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => Ok(e.insert(make()?)),
        }
    }

    pub fn remove(&mut self, pos: &BlockPos) -> Option<Container> {
        self.open.remove(pos)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Container> + '_ {
        self.open.drain().map(|(_, c)| c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: UserId = UserId(1);
    const B: UserId = UserId(2);

    #[test]
    fn container_is_sized_by_kind() {
        let c = Container::new(WindowKind::LargeChest, BlockPos::new(0, 64, 0));
        assert_eq!(c.slots.len(), 54);
        let c = Container::with_contents(
            WindowKind::Furnace,
            BlockPos::new(0, 64, 0),
            vec![ItemStack::new(4, 3, 0); 5],
        );
        assert_eq!(c.slots.len(), 3);
    }

    #[test]
    fn viewers_are_tracked_once() {
        let mut c = Container::new(WindowKind::Chest, BlockPos::new(1, 2, 3));
        assert!(c.add_viewer(A));
        assert!(!c.add_viewer(A));
        assert!(c.add_viewer(B));
        assert_eq!(c.viewers(), &[A, B]);
        assert!(c.remove_viewer(A));
        assert!(!c.remove_viewer(A));
        assert!(c.has_viewers());
        c.remove_viewer(B);
        assert!(!c.has_viewers());
    }

    #[test]
    fn drag_log_framing() {
        let mut log = ActionLog::default();
        assert_eq!(log.add(A, DragKind::Left, 3, 0), Err(DragError::NotStarted));
        log.start(A, DragKind::Left, 3).unwrap();
        assert!(log.is_recording());
        log.add(A, DragKind::Left, 3, 4).unwrap();
        log.add(A, DragKind::Left, 3, 4).unwrap();
        log.add(A, DragKind::Left, 3, 7).unwrap();
        assert_eq!(
            log.add(A, DragKind::Left, 4, 8),
            Err(DragError::ActionMismatch { expected: 3, got: 4 })
        );
        assert_eq!(log.add(B, DragKind::Left, 3, 8), Err(DragError::Foreign(A)));
        assert_eq!(log.finish(A, DragKind::Right, 3), Err(DragError::KindMismatch));
        let session = log.finish(A, DragKind::Left, 3).unwrap();
        assert_eq!(session.slots, vec![4, 7]);
        assert!(!log.is_recording());
    }

    #[test]
    fn restarting_own_drag_clears_it() {
        let mut log = ActionLog::default();
        log.start(A, DragKind::Right, 1).unwrap();
        assert_eq!(log.start(A, DragKind::Right, 2), Err(DragError::AlreadyActive));
        assert!(!log.is_recording());
    }

    #[test]
    fn leaving_viewer_drops_their_drag() {
        let mut c = Container::new(WindowKind::Chest, BlockPos::new(0, 0, 0));
        c.add_viewer(A);
        c.actions.start(A, DragKind::Left, 9).unwrap();
        c.remove_viewer(A);
        assert!(!c.actions.is_recording());
    }

    #[test]
    fn arena_keeps_first_container_at_a_position() {
        let mut arena = ContainerArena::new();
        let pos = BlockPos::new(5, 5, 5);
        arena
            .open_with(pos, || Ok::<_, ()>(Container::new(WindowKind::Chest, pos)))
            .unwrap();
        let existing = arena
            .open_with(pos, || Ok::<_, ()>(Container::new(WindowKind::Furnace, pos)))
            .unwrap();
        assert_eq!(existing.kind(), WindowKind::Chest);
        let refused = arena.open_with(BlockPos::new(0, 0, 0), || Err("load failed"));
        assert_eq!(refused.err(), Some("load failed"));
        assert_eq!(arena.len(), 1);
        assert!(arena.remove(&pos).is_some());
        assert!(arena.is_empty());
    }
}
