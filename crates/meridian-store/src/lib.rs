//! Snapshot persistence adapters.
//!
//! The engine is pure; durability is an adapter concern. A store holds
//! exactly one snapshot under one fixed key -- the latest state of the
//! world -- encoded as JSON. Loading is infallible by contract: corrupt
//! or missing data comes back as a fresh [`WorldSnapshot`] with a
//! warning, so a damaged store costs history, never availability.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use meridian_engine::WorldSnapshot;

/// Failures surfaced when writing to a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying file could not be written.
    #[error("store io failure: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot could not be encoded.
    #[error("snapshot encoding failure: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A home for the single latest world snapshot.
pub trait SnapshotStore {
    /// Load the stored snapshot.
    ///
    /// Missing or corrupt data loads as a fresh empty world; the log
    /// carries a warning but callers never see an error.
    fn load(&self) -> WorldSnapshot;

    /// Persist the snapshot, replacing whatever was stored before.
    fn save(&self, snapshot: &WorldSnapshot) -> Result<(), StoreError>;
}

/// Encode a snapshot to its stored JSON form.
pub fn serialize_snapshot(snapshot: &WorldSnapshot) -> Result<String, StoreError> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Decode a snapshot from its stored JSON form, falling back to a fresh
/// world when the data does not parse.
pub fn deserialize_snapshot(data: &str) -> WorldSnapshot {
    match serde_json::from_str(data) {
        Ok(snapshot) => snapshot,
        Err(error) => {
            tracing::warn!(%error, "stored snapshot unreadable, starting fresh");
            WorldSnapshot::new()
        }
    }
}
