//! River gauge client.
//!
//! The gauge API returns the full graph series for a station: measured
//! levels up to now, forecast levels after now, and the station's alert
//! thresholds.
//!
//! ```json
//! {
//!   "levels": [{ "time": 1714557600000, "level": 61.0 }, ...],
//!   "thresholds": { "cote-prealerte": 50, "cote-alerte": 60 }
//! }
//! ```

use crate::clock::from_epoch_millis;
use crate::error::SourceError;
use crate::ingest::{JsonSource, lenient_f64};
use crate::model::{Reading, ThresholdSet};

/// Parsed gauge response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GaugeSeries {
    pub readings: Vec<Reading>,
    pub thresholds: ThresholdSet,
    /// Entries dropped because time or level was unusable.
    pub skipped: usize,
}

pub fn fetch_gauge(source: &dyn JsonSource, url: &str) -> Result<GaugeSeries, SourceError> {
    let body = source.get_json(url, None)?;
    parse_gauge(&body)
}

/// Parses a gauge response. A missing `levels` key yields an empty series;
/// only a non-object body is an error.
pub fn parse_gauge(body: &serde_json::Value) -> Result<GaugeSeries, SourceError> {
    let object = body
        .as_object()
        .ok_or_else(|| SourceError::Parse("expected a JSON object".to_string()))?;

    let mut series = GaugeSeries::default();

    if let Some(levels) = object.get("levels").and_then(|l| l.as_array()) {
        for entry in levels {
            match parse_reading(entry) {
                Some(reading) => series.readings.push(reading),
                None => series.skipped += 1,
            }
        }
    }

    if let Some(thresholds) = object.get("thresholds") {
        series.thresholds = ThresholdSet {
            pre_alert: thresholds.get("cote-prealerte").and_then(lenient_f64),
            alert: thresholds.get("cote-alerte").and_then(lenient_f64),
        };
    }

    Ok(series)
}

fn parse_reading(entry: &serde_json::Value) -> Option<Reading> {
    let millis = entry.get("time").and_then(lenient_f64)?;
    let timestamp = from_epoch_millis(millis as i64)?;
    let level_cm = entry.get("level").and_then(lenient_f64)?;
    Some(Reading {
        timestamp,
        level_cm,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
