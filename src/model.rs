//! Core data types for the station dashboard.
//!
//! This module defines the shared domain model imported by all other modules:
//! roster payloads as they arrive from the scheduling API, the derived crew
//! listing, water-level readings and tiers, and the flat-file documents
//! (calendar events, to-do items, journal entries).
//!
//! Apart from parsing status codes at the ingestion boundary it contains no
//! logic and no I/O.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Roster payload (scheduling API)
// ---------------------------------------------------------------------------

/// One service plan as returned by the scheduling endpoint. A roster payload
/// is a JSON array of these; every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServicePlan {
    pub service_plan_name: Option<String>,
    pub service_plan_vehicule_status: Option<VehicleStatus>,
    pub rows: Vec<RosterRow>,
}

pub type RosterPayload = Vec<ServicePlan>;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct VehicleStatus {
    pub status: Option<StatusValue>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatusValue {
    pub value: Option<StatusCode>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RosterRow {
    pub prestations: Vec<Prestation>,
}

/// A single duty assignment: who sits in which seat.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Prestation {
    pub position: Option<Position>,
    pub person: Option<Person>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Position {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

/// Vehicle availability status.
///
/// The scheduling API sends a free-form string or number; only its first
/// character carries meaning. It is parsed once here, when the payload is
/// deserialized, so nothing downstream inspects raw strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Leading digit 1-9.
    Digit(u8),
    #[default]
    Unknown,
}

impl StatusCode {
    pub fn parse(raw: &str) -> Self {
        match raw.chars().next() {
            Some(c @ '1'..='9') => StatusCode::Digit(c as u8 - b'0'),
            _ => StatusCode::Unknown,
        }
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::parse(s),
            serde_json::Value::Number(n) => Self::parse(&n.to_string()),
            _ => StatusCode::Unknown,
        }
    }

    pub fn digit(&self) -> Option<u8> {
        match self {
            StatusCode::Digit(d) => Some(*d),
            StatusCode::Unknown => None,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Digit(d) => write!(f, "{}", d),
            StatusCode::Unknown => write!(f, "?"),
        }
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(StatusCode::from_json(&value))
    }
}

/// Severity class a status digit maps to. See `alert::status::StatusTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusClass {
    Ok,
    Warn,
    Critical,
    Unknown,
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusClass::Ok => write!(f, "ok"),
            StatusClass::Warn => write!(f, "warn"),
            StatusClass::Critical => write!(f, "critical"),
            StatusClass::Unknown => write!(f, "unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// Crew
// ---------------------------------------------------------------------------

/// Seat label → sort rank for one vehicle type.
pub type PositionPriority = HashMap<String, u32>;

/// Rank given to any position missing from the priority table.
pub const UNRANKED_POSITION: u32 = 999;

/// Vehicle types with their own seat ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleKind {
    /// Heavy rescue (Hilfeleistungslöschfahrzeug).
    #[serde(rename = "HLF")]
    Hlf,
    /// Turntable ladder (Drehleiter).
    #[serde(rename = "DLK")]
    Dlk,
    /// Ambulance (Rettungswagen).
    #[serde(rename = "RTW")]
    Rtw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewMember {
    pub rank: u32,
    pub position_label: String,
    /// May be empty when the payload carries no names; still shown as a row.
    pub full_name: String,
}

// ---------------------------------------------------------------------------
// Water levels
// ---------------------------------------------------------------------------

/// One gauge reading, in centimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub level_cm: f64,
}

/// Pre-alert and alert levels for a gauge, in centimetres.
/// When both are present, `alert >= pre_alert`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdSet {
    pub pre_alert: Option<f64>,
    pub alert: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTier {
    Normal,
    PreAlert,
    Alert,
    NoData,
}

/// Result of classifying a reading series at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelClassification {
    pub tier: LevelTier,
    pub value: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// The seven fixed calendar categories. Serialized with their display names,
/// which is also how they appear in `events.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalendarType {
    #[serde(rename = "Perséinleche Kalenner")]
    Personal,
    #[serde(rename = "Gemeinsam CIS Kalenner")]
    Shared,
    #[serde(rename = "PP Kalenner")]
    Pp,
    #[serde(rename = "PV Kalenner")]
    Pv,
    #[serde(rename = "Batiment")]
    Building,
    #[serde(rename = "Gefierer")]
    Vehicles,
    #[serde(rename = "Instruktiounssaal")]
    TrainingRoom,
}

impl CalendarType {
    pub const ALL: [CalendarType; 7] = [
        CalendarType::Personal,
        CalendarType::Shared,
        CalendarType::Pp,
        CalendarType::Pv,
        CalendarType::Building,
        CalendarType::Vehicles,
        CalendarType::TrainingRoom,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CalendarType::Personal => "Perséinleche Kalenner",
            CalendarType::Shared => "Gemeinsam CIS Kalenner",
            CalendarType::Pp => "PP Kalenner",
            CalendarType::Pv => "PV Kalenner",
            CalendarType::Building => "Batiment",
            CalendarType::Vehicles => "Gefierer",
            CalendarType::TrainingRoom => "Instruktiounssaal",
        }
    }

    /// Hex color used for this category in every calendar view.
    pub fn color(&self) -> &'static str {
        match self {
            CalendarType::Personal => "#1f77b4",
            CalendarType::Shared => "#ff7f0e",
            CalendarType::Pp => "#2ca02c",
            CalendarType::Pv => "#ff00ff",
            CalendarType::Building => "#9467bd",
            CalendarType::Vehicles => "#d62728",
            CalendarType::TrainingRoom => "#17becf",
        }
    }
}

impl fmt::Display for CalendarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CalendarType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CalendarType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownCalendarType(s.to_string()))
    }
}

/// A calendar entry as persisted in `events.json`.
///
/// `start` and `end` are ISO 8601 local date-times, e.g. "2024-05-01T08:00:00".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start: String,
    pub end: String,
    pub calendar_type: CalendarType,
    #[serde(default = "default_event_color")]
    pub color: String,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
}

fn default_event_color() -> String {
    "#000000".to_string()
}

// ---------------------------------------------------------------------------
// To-do list and journal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
}

/// A logbook entry. `datetime` is ISO "YYYY-MM-DDTHH:MM:SS" local time;
/// files written before ids existed may still carry "DD.MM.YYYY HH:MM" and
/// an empty id until migrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default)]
    pub id: String,
    pub user: String,
    pub content: String,
    pub datetime: String,
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub pressure_hpa: f64,
    pub wind_speed_ms: f64,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}
