//! Calendar entries in `events.json`.
//!
//! Entries are addressed by their position in the file, the same way the
//! event list numbers them.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::clock::ISO_LOCAL_FORMAT;
use crate::error::{Error, StoreError, ValidationError};
use crate::logging::{self, DataSource};
use crate::model::{CalendarEvent, CalendarType};
use crate::session::Session;
use crate::store::JsonStore;

/// Unvalidated input of the "new event" form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub calendar_type: CalendarType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Ignored for all-day events. Defaults to 00:00.
    pub start_time: Option<NaiveTime>,
    /// Ignored for all-day events. Defaults to 23:59.
    pub end_time: Option<NaiveTime>,
    pub all_day: bool,
    pub vehicle: Option<String>,
}

fn day_start() -> NaiveTime {
    NaiveTime::MIN
}

fn day_end() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

impl NewEvent {
    /// Checks the form and builds the entry to persist.
    ///
    /// Checks run in the order the form reports them: end before start,
    /// then an empty title, then a vehicle on a non-vehicle calendar.
    pub fn validate(self) -> Result<CalendarEvent, ValidationError> {
        let (start_time, end_time) = if self.all_day {
            (day_start(), day_end())
        } else {
            (
                self.start_time.unwrap_or_else(day_start),
                self.end_time.unwrap_or_else(day_end),
            )
        };

        let start = NaiveDateTime::new(self.start_date, start_time);
        let end = NaiveDateTime::new(self.end_date, end_time);

        if end < start {
            return Err(ValidationError::EndBeforeStart);
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let vehicle = self
            .vehicle
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if vehicle.is_some() && self.calendar_type != CalendarType::Vehicles {
            return Err(ValidationError::VehicleNotAllowed);
        }

        Ok(CalendarEvent {
            title: self.title,
            description: self.description,
            start: start.format(ISO_LOCAL_FORMAT).to_string(),
            end: end.format(ISO_LOCAL_FORMAT).to_string(),
            color: self.calendar_type.color().to_string(),
            calendar_type: self.calendar_type,
            all_day: self.all_day,
            vehicle,
        })
    }
}

pub struct EventStore {
    file: JsonStore<CalendarEvent>,
}

impl EventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonStore::new(path),
        }
    }

    pub fn list_events(&self) -> Result<Vec<CalendarEvent>, StoreError> {
        self.file.load()
    }

    /// Validates and appends an event. Nothing is written when validation
    /// fails.
    pub fn add_event(&self, session: &Session, form: NewEvent) -> Result<CalendarEvent, Error> {
        let event = form.validate()?;
        let mut events = self.file.load()?;
        events.push(event.clone());
        self.file.save(&events)?;
        logging::info(
            DataSource::Store,
            Some(session.user()),
            &format!("added event '{}' to {}", event.title, event.calendar_type),
        );
        Ok(event)
    }

    /// Removes the event at `index` (0-based file position) and returns it.
    pub fn delete_event(&self, session: &Session, index: usize) -> Result<CalendarEvent, StoreError> {
        let mut events = self.file.load()?;
        if index >= events.len() {
            return Err(StoreError::EventIndexOutOfRange(index));
        }
        let removed = events.remove(index);
        self.file.save(&events)?;
        logging::info(
            DataSource::Store,
            Some(session.user()),
            &format!("deleted event #{} '{}'", index, removed.title),
        );
        Ok(removed)
    }
}

/// Names offered when attaching a vehicle to a "Gefierer" event.
///
/// The file is maintained by hand and never rewritten here: a missing or
/// unreadable file just means no choices.
pub fn load_vehicle_names(path: &Path) -> Vec<String> {
    let Ok(text) = fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<String>>(&text) {
        Ok(names) => names,
        Err(e) => {
            logging::warn(
                DataSource::Store,
                Some(&path.display().to_string()),
                &format!("ignoring vehicle list: {}", e),
            );
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
