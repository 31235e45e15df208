//! Flat-file JSON persistence.
//!
//! Each concern (calendar events, to-do items, journal entries) lives in its
//! own file holding one JSON array. Every mutation rewrites the whole file.
//! There is no locking: two writers at the same time can overwrite each
//! other's change.
//!
//! Submodules:
//! - `events`    - calendar entry form validation, add, delete by index.
//! - `checklist` - to-do items, delete by id.
//! - `journal`   - logbook entries owned by a user, legacy date migration.

pub mod checklist;
pub mod events;
pub mod journal;

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::logging::{self, DataSource};

pub use checklist::ChecklistStore;
pub use events::{EventStore, NewEvent, load_vehicle_names};
pub use journal::{Added, JournalStore, MigrationReport, available_years, entries_for_month, migrate_legacy_dates};

/// One JSON array of `T` on disk.
#[derive(Debug, Clone)]
pub struct JsonStore<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> JsonStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole collection.
    ///
    /// A missing file is created empty. A file that is not a JSON array at
    /// all is treated as empty and reset to `[]`; its previous content is
    /// lost. Inside a valid array, records that do not match `T` are skipped
    /// with a warning and the file is left as it is. Only real I/O failures
    /// are errors.
    pub fn load(&self) -> Result<Vec<T>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.save(&[])?;
                return Ok(Vec::new());
            }
            Err(source) => return Err(self.io_error(source)),
        };

        let raw = match serde_json::from_str::<Vec<serde_json::Value>>(&text) {
            Ok(raw) => raw,
            Err(e) => {
                logging::warn(
                    DataSource::Store,
                    Some(&self.path.display().to_string()),
                    &format!("unreadable document reset to empty: {}", e),
                );
                self.save(&[])?;
                return Ok(Vec::new());
            }
        };

        let mut items = Vec::with_capacity(raw.len());
        for (i, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<T>(value) {
                Ok(item) => items.push(item),
                Err(e) => logging::warn(
                    DataSource::Store,
                    Some(&self.path.display().to_string()),
                    &format!("skipping record #{}: {}", i, e),
                ),
            }
        }
        Ok(items)
    }

    /// Replaces the whole collection on disk.
    pub fn save(&self, items: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(items).map_err(|e| StoreError::Serialize {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        // write-then-rename so a crash mid-write leaves the old file intact
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChecklistItem;

    fn item(id: &str) -> ChecklistItem {
        ChecklistItem {
            id: id.to_string(),
            text: format!("task {}", id),
        }
    }

    #[test]
    fn test_missing_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checklist.json");
        let store: JsonStore<ChecklistItem> = JsonStore::new(&path);

        assert!(store.load().unwrap().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("checklist.json"));
        store.save(&[item("a"), item("b")]).unwrap();
        let loaded: Vec<ChecklistItem> = store.load().unwrap();
        assert_eq!(loaded, vec![item("a"), item("b")]);
    }

    #[test]
    fn test_malformed_file_resets_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checklist.json");
        fs::write(&path, "{ not json").unwrap();

        let store: JsonStore<ChecklistItem> = JsonStore::new(&path);
        assert!(store.load().unwrap().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_non_array_document_resets_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checklist.json");
        fs::write(&path, r#"{"id": "a", "text": "task a"}"#).unwrap();

        let store: JsonStore<ChecklistItem> = JsonStore::new(&path);
        assert!(store.load().unwrap().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_bad_record_is_skipped_and_file_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checklist.json");
        let original = r#"[{"id": "a", "text": "task a"}, {"id": 1}, {"id": "b", "text": "task b"}]"#;
        fs::write(&path, original).unwrap();

        let store: JsonStore<ChecklistItem> = JsonStore::new(&path);
        assert_eq!(store.load().unwrap(), vec![item("a"), item("b")]);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("nested").join("checklist.json");
        let store = JsonStore::new(&path);
        store.save(&[item("a")]).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_output_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checklist.json");
        JsonStore::new(&path).save(&[item("a")]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  {"), "expected indented JSON, got {}", text);
    }
}
