//! File-backed store: one JSON document on disk.

use std::fs;
use std::path::{Path, PathBuf};

use meridian_engine::WorldSnapshot;

use crate::{SnapshotStore, StoreError, deserialize_snapshot, serialize_snapshot};

/// A store that keeps the snapshot in a single JSON file.
///
/// Saves write to a sibling temporary file and rename into place, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file the snapshot is stored in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.as_os_str().to_owned();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> WorldSnapshot {
        match fs::read_to_string(&self.path) {
            Ok(data) => deserialize_snapshot(&data),
            Err(error) => {
                if error.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), %error, "snapshot file unreadable, starting fresh");
                }
                WorldSnapshot::new()
            }
        }
    }

    fn save(&self, snapshot: &WorldSnapshot) -> Result<(), StoreError> {
        let encoded = serialize_snapshot(snapshot)?;
        let staging = self.staging_path();
        fs::write(&staging, encoded)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}
