//! Water level threshold checking.
//!
//! Classifies the most recent past gauge reading against the station's
//! pre-alert and alert levels.
//!
//! # Clock injection
//! `classify_level` takes `now` as a parameter rather than calling
//! `Utc::now()`, so forecasts (readings after `now`) can be tested
//! deterministically.

use chrono::{DateTime, Utc};

use crate::model::{LevelClassification, LevelTier, Reading, ThresholdSet};

/// Classifies the latest reading at or before `now`.
///
/// Readings after `now` are forecast values and are ignored. Input order does
/// not matter. If several readings share the latest timestamp the highest
/// level wins, so the result never depends on how the API ordered them.
///
/// Both thresholds are inclusive: a level equal to `alert` is an alert.
pub fn classify_level(
    readings: &[Reading],
    thresholds: &ThresholdSet,
    now: DateTime<Utc>,
) -> LevelClassification {
    let latest = readings
        .iter()
        .filter(|r| r.timestamp <= now && r.level_cm.is_finite())
        .max_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then(a.level_cm.total_cmp(&b.level_cm))
        });

    let Some(latest) = latest else {
        return LevelClassification {
            tier: LevelTier::NoData,
            value: None,
            timestamp: None,
        };
    };

    LevelClassification {
        tier: tier_for(latest.level_cm, thresholds),
        value: Some(latest.level_cm),
        timestamp: Some(latest.timestamp),
    }
}

/// Tier for a single value. Without thresholds everything is `Normal`.
pub fn tier_for(level_cm: f64, thresholds: &ThresholdSet) -> LevelTier {
    if thresholds.alert.is_some_and(|alert| level_cm >= alert) {
        LevelTier::Alert
    } else if thresholds.pre_alert.is_some_and(|pre| level_cm >= pre) {
        LevelTier::PreAlert
    } else {
        LevelTier::Normal
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
