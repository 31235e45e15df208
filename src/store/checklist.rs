//! To-do items in `checklist.json`.

use std::path::PathBuf;

use uuid::Uuid;

use crate::error::{Error, StoreError, ValidationError};
use crate::logging::{self, DataSource};
use crate::model::ChecklistItem;
use crate::store::JsonStore;

pub struct ChecklistStore {
    file: JsonStore<ChecklistItem>,
}

impl ChecklistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonStore::new(path),
        }
    }

    pub fn list(&self) -> Result<Vec<ChecklistItem>, StoreError> {
        self.file.load()
    }

    /// Appends an item with a fresh id. The text is stored as typed.
    pub fn add_item(&self, text: &str) -> Result<ChecklistItem, Error> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyContent.into());
        }
        let item = ChecklistItem {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
        };
        let mut items = self.file.load()?;
        items.push(item.clone());
        self.file.save(&items)?;
        logging::debug(DataSource::Store, Some(&item.id), "to-do added");
        Ok(item)
    }

    pub fn delete_item(&self, id: &str) -> Result<ChecklistItem, StoreError> {
        let mut items = self.file.load()?;
        let Some(pos) = items.iter().position(|i| i.id == id) else {
            return Err(StoreError::ItemNotFound(id.to_string()));
        };
        let removed = items.remove(pos);
        self.file.save(&items)?;
        logging::debug(DataSource::Store, Some(id), "to-do deleted");
        Ok(removed)
    }
}
