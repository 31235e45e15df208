//! Logbook ("Tagebuch") entries in `tagebuch.json`.
//!
//! Entries are owned by the user who wrote them; only that user may delete
//! them. Each entry carries a generated id so that two entries with the same
//! text and minute stay distinguishable.
//!
//! Older files stored `datetime` as "DD.MM.YYYY HH:MM" and had no ids.
//! Reading such a file assigns ids on the fly; `migrate` also rewrites the
//! dates to ISO.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::clock::{ISO_LOCAL_FORMAT, LEGACY_JOURNAL_FORMAT, parse_naive};
use crate::error::{Error, StoreError, ValidationError};
use crate::logging::{self, DataSource};
use crate::model::{ChecklistItem, JournalEntry};
use crate::session::Session;
use crate::store::{ChecklistStore, JsonStore};

/// What `add_entry` produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Added {
    Entry(JournalEntry),
    /// "Als To-Do" was ticked: the text went to the to-do list instead.
    Todo(ChecklistItem),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub dates_rewritten: usize,
    pub ids_assigned: usize,
    /// Dates in neither the legacy nor an ISO format, left untouched.
    pub unparseable: usize,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.dates_rewritten > 0 || self.ids_assigned > 0
    }
}

pub struct JournalStore {
    file: JsonStore<JournalEntry>,
    checklist: ChecklistStore,
    tz: Tz,
}

impl JournalStore {
    pub fn new(journal_path: impl Into<PathBuf>, checklist_path: impl Into<PathBuf>, tz: Tz) -> Self {
        Self {
            file: JsonStore::new(journal_path),
            checklist: ChecklistStore::new(checklist_path),
            tz,
        }
    }

    /// All entries in file order. Entries without an id get one, and the
    /// file is rewritten if that happened.
    pub fn list_entries(&self) -> Result<Vec<JournalEntry>, StoreError> {
        let mut entries = self.file.load()?;
        if assign_missing_ids(&mut entries) > 0 {
            self.file.save(&entries)?;
        }
        Ok(entries)
    }

    /// Adds a logbook entry stamped with `now`, or a to-do item when
    /// `as_todo` is set.
    pub fn add_entry(
        &self,
        session: &Session,
        content: &str,
        as_todo: bool,
        now: DateTime<Utc>,
    ) -> Result<Added, Error> {
        if content.trim().is_empty() {
            return Err(ValidationError::EmptyContent.into());
        }

        if as_todo {
            let item = self.checklist.add_item(content)?;
            return Ok(Added::Todo(item));
        }

        let entry = JournalEntry {
            id: Uuid::new_v4().to_string(),
            user: session.user().to_string(),
            content: content.to_string(),
            datetime: now
                .with_timezone(&self.tz)
                .naive_local()
                .format(ISO_LOCAL_FORMAT)
                .to_string(),
        };
        let mut entries = self.list_entries()?;
        entries.push(entry.clone());
        self.file.save(&entries)?;
        logging::info(DataSource::Store, Some(session.user()), "journal entry added");
        Ok(Added::Entry(entry))
    }

    /// Deletes the entry with `id`. Only its author may do so; the file is
    /// left unchanged otherwise.
    pub fn delete_entry(&self, session: &Session, id: &str) -> Result<JournalEntry, StoreError> {
        let mut entries = self.list_entries()?;
        let Some(pos) = entries.iter().position(|e| e.id == id) else {
            return Err(StoreError::EntryNotFound(id.to_string()));
        };
        if !same_user(&entries[pos].user, session.user()) {
            logging::warn(
                DataSource::Auth,
                Some(session.user()),
                &format!("refused to delete journal entry {} of {}", id, entries[pos].user),
            );
            return Err(StoreError::NotOwner {
                owner: entries[pos].user.clone(),
            });
        }
        let removed = entries.remove(pos);
        self.file.save(&entries)?;
        logging::info(DataSource::Store, Some(session.user()), "journal entry deleted");
        Ok(removed)
    }

    /// Rewrites legacy dates and assigns missing ids, saving only when
    /// something changed.
    pub fn migrate(&self) -> Result<MigrationReport, StoreError> {
        let mut entries = self.file.load()?;
        let report = migrate_legacy_dates(&mut entries);
        if report.changed() {
            self.file.save(&entries)?;
        }
        logging::info(
            DataSource::Store,
            Some(&self.file.path().display().to_string()),
            &format!(
                "migration: {} dates rewritten, {} ids assigned, {} unparseable",
                report.dates_rewritten, report.ids_assigned, report.unparseable
            ),
        );
        Ok(report)
    }
}

fn same_user(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn assign_missing_ids(entries: &mut [JournalEntry]) -> usize {
    let mut assigned = 0;
    for entry in entries.iter_mut().filter(|e| e.id.trim().is_empty()) {
        entry.id = Uuid::new_v4().to_string();
        assigned += 1;
    }
    assigned
}

// ---------------------------------------------------------------------------
// Pure helpers for the journal page
// ---------------------------------------------------------------------------

/// Entries written in the given month, in file order. Entries whose date
/// cannot be read are never listed.
pub fn entries_for_month(entries: &[JournalEntry], year: i32, month: u32) -> Vec<&JournalEntry> {
    entries
        .iter()
        .filter(|e| {
            parse_naive(&e.datetime)
                .map(|dt| dt.year() == year && dt.month() == month)
                .unwrap_or(false)
        })
        .collect()
}

/// Years that have entries, newest first. Falls back to the current local
/// year when there is nothing to pick from.
pub fn available_years(entries: &[JournalEntry], now: DateTime<Utc>, tz: Tz) -> Vec<i32> {
    let years: BTreeSet<i32> = entries
        .iter()
        .filter_map(|e| parse_naive(&e.datetime))
        .map(|dt| dt.year())
        .collect();
    if years.is_empty() {
        return vec![now.with_timezone(&tz).year()];
    }
    years.into_iter().rev().collect()
}

/// Converts "DD.MM.YYYY HH:MM" dates to ISO seconds and assigns ids to
/// entries that lack one. Running it twice changes nothing the second time.
pub fn migrate_legacy_dates(entries: &mut [JournalEntry]) -> MigrationReport {
    let mut report = MigrationReport::default();
    for entry in entries.iter_mut() {
        if let Ok(legacy) = NaiveDateTime::parse_from_str(entry.datetime.trim(), LEGACY_JOURNAL_FORMAT) {
            entry.datetime = legacy.format(ISO_LOCAL_FORMAT).to_string();
            report.dates_rewritten += 1;
        } else if parse_naive(&entry.datetime).is_none() {
            report.unparseable += 1;
        }
    }
    report.ids_assigned = assign_missing_ids(entries);
    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::STATION_TZ;
    use chrono::TimeZone;
    use std::fs;

    fn entry(user: &str, content: &str, datetime: &str) -> JournalEntry {
        JournalEntry {
            id: String::new(),
            user: user.to_string(),
            content: content.to_string(),
            datetime: datetime.to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        // 14:05 in Luxembourg (CET)
        Utc.with_ymd_and_hms(2025, 3, 3, 13, 5, 0).unwrap()
    }

    fn stores(dir: &tempfile::TempDir) -> JournalStore {
        JournalStore::new(
            dir.path().join("tagebuch.json"),
            dir.path().join("checklist.json"),
            STATION_TZ,
        )
    }

    #[test]
    fn test_add_entry_stamps_local_iso_time() {
        let dir = tempfile::tempdir().unwrap();
        let journal = stores(&dir);
        let sean = Session::for_user("Sean", now());

        let Added::Entry(e) = journal.add_entry(&sean, "Pompel gepréift", false, now()).unwrap() else {
            panic!("expected a journal entry");
        };
        assert_eq!(e.datetime, "2025-03-03T14:05:00");
        assert_eq!(e.user, "Sean");
        assert!(!e.id.is_empty());
    }

    #[test]
    fn test_as_todo_goes_to_checklist() {
        let dir = tempfile::tempdir().unwrap();
        let journal = stores(&dir);
        let sean = Session::for_user("Sean", now());

        let added = journal.add_entry(&sean, "Leeder ëlen", true, now()).unwrap();
        assert!(matches!(added, Added::Todo(ref item) if item.text == "Leeder ëlen"));
        assert!(journal.list_entries().unwrap().is_empty());
        let todo = ChecklistStore::new(dir.path().join("checklist.json")).list().unwrap();
        assert_eq!(todo.len(), 1);
    }

    #[test]
    fn test_blank_content_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let journal = stores(&dir);
        let sean = Session::for_user("Sean", now());
        let err = journal.add_entry(&sean, "   ", true, now()).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::EmptyContent)));
    }

    #[test]
    fn test_only_author_may_delete() {
        let dir = tempfile::tempdir().unwrap();
        let journal = stores(&dir);
        let sean = Session::for_user("Sean", now());
        let marie = Session::for_user("Marie", now());

        let Added::Entry(e) = journal.add_entry(&sean, "Notiz", false, now()).unwrap() else {
            panic!("expected a journal entry");
        };
        let before = fs::read_to_string(dir.path().join("tagebuch.json")).unwrap();

        let err = journal.delete_entry(&marie, &e.id).unwrap_err();
        assert!(matches!(err, StoreError::NotOwner { ref owner } if owner == "Sean"));
        assert_eq!(fs::read_to_string(dir.path().join("tagebuch.json")).unwrap(), before);

        journal.delete_entry(&sean, &e.id).unwrap();
        assert!(journal.list_entries().unwrap().is_empty());
    }

    #[test]
    fn test_identical_entries_delete_independently() {
        let dir = tempfile::tempdir().unwrap();
        let journal = stores(&dir);
        let sean = Session::for_user("Sean", now());

        let Added::Entry(a) = journal.add_entry(&sean, "Dubbel", false, now()).unwrap() else {
            panic!("expected a journal entry");
        };
        let Added::Entry(b) = journal.add_entry(&sean, "Dubbel", false, now()).unwrap() else {
            panic!("expected a journal entry");
        };
        assert_ne!(a.id, b.id);

        journal.delete_entry(&sean, &a.id).unwrap();
        let left = journal.list_entries().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, b.id);
    }

    #[test]
    fn test_delete_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let journal = stores(&dir);
        let sean = Session::for_user("Sean", now());
        assert!(matches!(
            journal.delete_entry(&sean, "missing"),
            Err(StoreError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_legacy_file_gets_ids_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagebuch.json");
        fs::write(&path, r#"[{"user": "Sean", "content": "al", "datetime": "01.02.2024 08:15"}]"#).unwrap();

        let entries = stores(&dir).list_entries().unwrap();
        assert!(!entries[0].id.is_empty());
        let again = stores(&dir).list_entries().unwrap();
        assert_eq!(entries[0].id, again[0].id, "assigned ids are persisted");
    }

    #[test]
    fn test_migration_is_idempotent() {
        let mut entries = vec![
            entry("Sean", "al", "01.02.2024 08:15"),
            entry("Sean", "nei", "2024-02-02T09:00:00"),
            entry("Sean", "kapott", "gëschter"),
        ];
        let first = migrate_legacy_dates(&mut entries);
        assert_eq!(first.dates_rewritten, 1);
        assert_eq!(first.ids_assigned, 3);
        assert_eq!(first.unparseable, 1);
        assert_eq!(entries[0].datetime, "2024-02-01T08:15:00");

        let second = migrate_legacy_dates(&mut entries);
        assert!(!second.changed());
    }

    #[test]
    fn test_migrate_saves_only_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagebuch.json");
        fs::write(&path, r#"[{"id": "x", "user": "Sean", "content": "al", "datetime": "01.02.2024 08:15"}]"#).unwrap();

        let journal = stores(&dir);
        assert_eq!(journal.migrate().unwrap().dates_rewritten, 1);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("2024-02-01T08:15:00"));

        assert!(!journal.migrate().unwrap().changed());
    }

    #[test]
    fn test_month_filter_reads_both_formats() {
        let entries = vec![
            entry("Sean", "a", "2025-03-01T10:00:00"),
            entry("Sean", "b", "15.03.2025 12:00"),
            entry("Sean", "c", "2025-04-01T10:00:00"),
            entry("Sean", "d", "???"),
        ];
        let march: Vec<&str> = entries_for_month(&entries, 2025, 3)
            .into_iter()
            .map(|e| e.content.as_str())
            .collect();
        assert_eq!(march, vec!["a", "b"]);
    }

    #[test]
    fn test_available_years_descending_with_fallback() {
        let entries = vec![
            entry("Sean", "a", "2023-03-01T10:00:00"),
            entry("Sean", "b", "2025-01-01T10:00:00"),
            entry("Sean", "c", "2023-12-01T10:00:00"),
        ];
        assert_eq!(available_years(&entries, now(), STATION_TZ), vec![2025, 2023]);
        assert_eq!(available_years(&[], now(), STATION_TZ), vec![2025]);
    }
}
