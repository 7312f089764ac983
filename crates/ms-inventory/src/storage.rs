//! Persistence seam for container contents.

use std::collections::HashMap;

use ms_item::ItemStack;
use ms_nbt::{NbtCompound, NbtTag};

use crate::error::StorageError;
use crate::window::WindowKind;
use crate::BlockPos;

/// Where chest, furnace and brewing stand contents live between viewers.
pub trait ContainerStorage {
    /// Stored slots for the container at `pos`, or `None` if nothing was
    /// saved there.
    fn load(&mut self, pos: BlockPos, kind: WindowKind) -> Result<Option<Vec<ItemStack>>, StorageError>;

    fn save(&mut self, pos: BlockPos, kind: WindowKind, slots: &[ItemStack]) -> Result<(), StorageError>;
}

/// In-process storage, used by tests and as a fallback without a world
/// directory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    saved: HashMap<BlockPos, (WindowKind, Vec<ItemStack>)>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pos: &BlockPos) -> Option<&[ItemStack]> {
        self.saved.get(pos).map(|(_, slots)| slots.as_slice())
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}

impl ContainerStorage for MemoryStorage {
    fn load(&mut self, pos: BlockPos, kind: WindowKind) -> Result<Option<Vec<ItemStack>>, StorageError> {
        match self.saved.get(&pos) {
            Some((saved_kind, slots)) if *saved_kind == kind => Ok(Some(slots.clone())),
            Some((saved_kind, _)) => Err(StorageError::Malformed(format!(
                "{pos} holds a {saved_kind:?}, not a {kind:?}"
            ))),
            None => Ok(None),
        }
    }

    fn save(&mut self, pos: BlockPos, kind: WindowKind, slots: &[ItemStack]) -> Result<(), StorageError> {
        self.saved.insert(pos, (kind, slots.to_vec()));
        Ok(())
    }
}

/// Root compound of a container record: `Kind` plus an `Items` list of the
/// non-empty slots.
pub fn slots_to_nbt(kind: WindowKind, slots: &[ItemStack]) -> NbtCompound {
    let items = slots
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_empty())
        .map(|(i, s)| {
            let mut entry = NbtCompound::new();
            entry.insert("Slot".into(), NbtTag::Byte(i as i8));
            entry.insert("id".into(), NbtTag::Short(s.item()));
            entry.insert("Count".into(), NbtTag::Byte(s.count() as i8));
            entry.insert("Damage".into(), NbtTag::Short(s.health()));
            if let Some(tag) = s.data() {
                entry.insert("tag".into(), NbtTag::Compound(tag.clone()));
            }
            NbtTag::Compound(entry)
        })
        .collect();

    let mut root = NbtCompound::new();
    root.insert("Kind".into(), NbtTag::String(kind.type_name().into()));
    root.insert("Items".into(), NbtTag::List(items));
    root
}

/// Rebuild the slot vector of a `kind` container from a record.
pub fn slots_from_nbt(kind: WindowKind, root: &NbtCompound) -> Result<Vec<ItemStack>, StorageError> {
    let size = kind.container_slots();
    let mut slots: Vec<ItemStack> = (0..size).map(|_| ItemStack::empty()).collect();

    let Some(items) = root.get("Items").and_then(NbtTag::as_list) else {
        return Ok(slots);
    };
    for entry in items {
        let entry = entry
            .as_compound()
            .ok_or_else(|| StorageError::Malformed("Items entry is not a compound".into()))?;
        let field = |name: &str| {
            entry
                .get(name)
                .and_then(NbtTag::as_short)
                .ok_or_else(|| StorageError::Malformed(format!("item entry missing {name}")))
        };
        let slot = field("Slot")? as u8 as usize;
        let id = field("id")?;
        let count = field("Count")? as u8;
        let damage = field("Damage")?;
        if slot >= size {
            return Err(StorageError::Malformed(format!(
                "slot {slot} beyond {kind:?} size {size}"
            )));
        }
        let mut stack = ItemStack::new(id, count, damage);
        if let Some(tag) = entry.get("tag").and_then(NbtTag::as_compound) {
            stack.set_data(Some(tag.clone()));
        }
        slots[slot] = stack;
    }
    Ok(slots)
}
