//! Container contents on disk: one gzip-compressed NBT file per position.

use std::path::{Path, PathBuf};

use ms_inventory::storage::{slots_from_nbt, slots_to_nbt};
use ms_inventory::{BlockPos, ContainerStorage, StorageError, WindowKind};
use ms_item::ItemStack;
use ms_nbt::{NbtRoot, NbtTag};
use tracing::debug;

/// File-backed container storage rooted at a directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `c.{x}.{y}.{z}.dat` under the storage directory.
    pub fn path_for(&self, pos: BlockPos) -> PathBuf {
        self.dir
            .join(format!("c.{}.{}.{}.dat", pos.x, pos.y, pos.z))
    }
}

impl ContainerStorage for FileStorage {
    fn load(&mut self, pos: BlockPos, kind: WindowKind) -> Result<Option<Vec<ItemStack>>, StorageError> {
        let path = self.path_for(pos);
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let root = ms_nbt::read_gzip(&data)?;
        let stored = root
            .compound
            .get("Kind")
            .and_then(NbtTag::as_string)
            .and_then(WindowKind::from_type_name);
        if stored != Some(kind) {
            return Err(StorageError::Malformed(format!(
                "{} does not hold a {kind:?}",
                path.display()
            )));
        }
        debug!("Loaded {kind:?} at {pos} from {}", path.display());
        slots_from_nbt(kind, &root.compound).map(Some)
    }

    fn save(&mut self, pos: BlockPos, kind: WindowKind, slots: &[ItemStack]) -> Result<(), StorageError> {
        let path = self.path_for(pos);
        if slots.iter().all(ItemStack::is_empty) {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir)?;
        let root = NbtRoot::new("", slots_to_nbt(kind, slots));
        let bytes = ms_nbt::write_gzip(&root)?;
        std::fs::write(&path, bytes)?;
        debug!("Saved {kind:?} at {pos} to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_item::ids::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ms_containers_{}", rand::random::<u64>()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn chest_roundtrip() {
        let dir = temp_dir();
        let mut storage = FileStorage::new(&dir);
        let pos = BlockPos::new(-4, 70, 12);

        let mut slots = vec![ItemStack::empty(); 27];
        slots[0] = ItemStack::new(COBBLESTONE, 64, 0);
        slots[13] = ItemStack::new(IRON_PICKAXE, 1, 17);
        storage.save(pos, WindowKind::Chest, &slots).unwrap();
        assert!(dir.join("c.-4.70.12.dat").exists());

        let loaded = storage.load(pos, WindowKind::Chest).unwrap().unwrap();
        assert_eq!(loaded, slots);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_loads_nothing() {
        let dir = temp_dir();
        let mut storage = FileStorage::new(&dir);
        assert!(storage
            .load(BlockPos::new(0, 0, 0), WindowKind::Furnace)
            .unwrap()
            .is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn kind_mismatch_is_malformed() {
        let dir = temp_dir();
        let mut storage = FileStorage::new(&dir);
        let pos = BlockPos::new(1, 2, 3);
        let mut slots = vec![ItemStack::empty(); 3];
        slots[0] = ItemStack::new(COAL, 8, 0);
        storage.save(pos, WindowKind::Furnace, &slots).unwrap();
        assert!(matches!(
            storage.load(pos, WindowKind::BrewingStand),
            Err(StorageError::Malformed(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn emptied_container_removes_file() {
        let dir = temp_dir();
        let mut storage = FileStorage::new(&dir);
        let pos = BlockPos::new(5, 5, 5);
        let mut slots = vec![ItemStack::empty(); 27];
        slots[2] = ItemStack::new(DIRT, 1, 0);
        storage.save(pos, WindowKind::Chest, &slots).unwrap();
        assert!(storage.path_for(pos).exists());

        slots[2].clear();
        storage.save(pos, WindowKind::Chest, &slots).unwrap();
        assert!(!storage.path_for(pos).exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = temp_dir();
        let mut storage = FileStorage::new(&dir);
        let pos = BlockPos::new(9, 9, 9);
        std::fs::write(storage.path_for(pos), b"not gzip").unwrap();
        assert!(storage.load(pos, WindowKind::Chest).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
