//! Persisted watcher state
//!
//! The watcher keeps exactly one durable value: the identifier of the most
//! recently notified (or baseline) event. This module owns that value behind
//! the [`StateStore`] trait so the reconciler contract never changes if the
//! file is swapped for an embedded database later.
//!
//! The file format is a small human-inspectable JSON document:
//!
//! ```json
//! {
//!   "id": "https://www.ff14.co.kr/news/event/detail/1234",
//!   "saved_at": "2026-08-25T09:00:00Z"
//! }
//! ```
//!
//! Absence means "uninitialized". A corrupt or unreadable file degrades to
//! absence rather than failing the process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StateError;

/// Persisted marker document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MarkerFile {
    /// Latest known event identifier
    id: String,

    /// When the marker was written
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
}

/// Storage for the single latest-event marker
pub trait StateStore {
    /// Load the persisted marker, `None` if no state exists yet or the
    /// persisted data is unreadable
    fn load(&self) -> Option<String>;

    /// Durably overwrite the marker
    fn save(&self, id: &str) -> Result<(), StateError>;
}

impl<T: StateStore + ?Sized> StateStore for std::sync::Arc<T> {
    fn load(&self) -> Option<String> {
        (**self).load()
    }

    fn save(&self, id: &str) -> Result<(), StateError> {
        (**self).save(id)
    }
}

/// File-backed state store with atomic writes
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write can lose the update but can never leave a garbled value.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by the given file path. Parent directories are
    /// created on the first save, not here.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the marker file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Option<String> {
        if !self.path.exists() {
            return None;
        }

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to open state file");
                return None;
            }
        };

        match serde_json::from_reader::<_, MarkerFile>(BufReader::new(file)) {
            Ok(marker) => Some(marker.id),
            Err(e) => {
                // Corrupt state is treated as uninitialized, never fatal
                tracing::error!(path = %self.path.display(), error = %e, "Failed to parse state file");
                None
            }
        }
    }

    fn save(&self, id: &str) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let marker = MarkerFile {
            id: id.to_string(),
            saved_at: Some(Utc::now()),
        };

        // Write to temp file first, then rename (atomic)
        let temp_path = self.path.with_extension("json.tmp");

        let file = File::create(&temp_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &marker)?;

        fs::rename(&temp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), id, "Marker saved");
        Ok(())
    }
}

/// In-memory state store for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryStateStore {
    value: Mutex<Option<String>>,
}

impl MemoryStateStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a marker
    #[must_use]
    pub fn with_marker(id: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(id.into())),
        }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Option<String> {
        self.value.lock().expect("state lock poisoned").clone()
    }

    fn save(&self, id: &str) -> Result<(), StateError> {
        *self.value.lock().expect("state lock poisoned") = Some(id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("latest_event.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("latest_event.json"));

        store.save("https://example.com/event/42").unwrap();
        assert_eq!(store.load(), Some("https://example.com/event/42".to_string()));
    }

    #[test]
    fn test_save_overwrites_wholesale() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("latest_event.json"));

        store.save("first").unwrap();
        store.save("second").unwrap();
        assert_eq!(store.load(), Some("second".to_string()));
    }

    #[test]
    fn test_corrupt_file_loads_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest_event.json");
        fs::write(&path, "{not json at all").unwrap();

        let store = FileStateStore::new(&path);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_legacy_file_without_timestamp() {
        // Files written by the original bot only carry the id field
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest_event.json");
        fs::write(&path, r#"{"id": "https://example.com/event/7"}"#).unwrap();

        let store = FileStateStore::new(&path);
        assert_eq!(store.load(), Some("https://example.com/event/7".to_string()));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("latest_event.json"));
        store.save("id").unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_parent_directory_created() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("nested/state/latest_event.json"));
        store.save("id").unwrap();
        assert_eq!(store.load(), Some("id".to_string()));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStateStore::new();
        assert_eq!(store.load(), None);

        store.save("a").unwrap();
        assert_eq!(store.load(), Some("a".to_string()));

        let seeded = MemoryStateStore::with_marker("b");
        assert_eq!(seeded.load(), Some("b".to_string()));
    }
}
