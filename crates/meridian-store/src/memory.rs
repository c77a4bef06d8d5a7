//! In-memory store, for tests and single-process replicas.

use std::sync::{Mutex, PoisonError};

use meridian_engine::WorldSnapshot;

use crate::{SnapshotStore, StoreError, deserialize_snapshot, serialize_snapshot};

/// A store that keeps the encoded snapshot in process memory.
///
/// Stores the JSON form rather than the value so that memory-backed and
/// file-backed replicas exercise the same codec.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> WorldSnapshot {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        match data.as_deref() {
            Some(encoded) => deserialize_snapshot(encoded),
            None => WorldSnapshot::new(),
        }
    }

    fn save(&self, snapshot: &WorldSnapshot) -> Result<(), StoreError> {
        let encoded = serialize_snapshot(snapshot)?;
        *self.data.lock().unwrap_or_else(PoisonError::into_inner) = Some(encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_loads_a_fresh_world() {
        assert_eq!(MemoryStore::new().load(), WorldSnapshot::new());
    }

    #[test]
    fn save_then_load_returns_the_snapshot() {
        let store = MemoryStore::new();
        let mut world = WorldSnapshot::new();
        world.version = 7;

        assert!(store.save(&world).is_ok());
        assert_eq!(store.load(), world);
    }

    #[test]
    fn save_replaces_the_previous_snapshot() {
        let store = MemoryStore::new();
        let mut world = WorldSnapshot::new();
        world.version = 1;
        assert!(store.save(&world).is_ok());
        world.version = 2;
        assert!(store.save(&world).is_ok());

        assert_eq!(store.load().version, 2);
    }
}
