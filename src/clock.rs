//! Station-local time handling.
//!
//! Calendar and journal documents store naive local date-times; the APIs send
//! UTC or epoch milliseconds. Everything is compared as `DateTime<Utc>` after
//! being anchored in the station timezone here.
//!
//! # Clock injection
//! Nothing in this module calls `Utc::now()`. Callers pass `now` so that
//! week boundaries and "upcoming" filters are deterministic in tests.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Default station timezone.
pub const STATION_TZ: Tz = chrono_tz::Europe::Luxembourg;

/// Journal format used before entries were stored as ISO strings.
pub const LEGACY_JOURNAL_FORMAT: &str = "%d.%m.%Y %H:%M";

/// ISO format written for new journal entries and events.
pub const ISO_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    LEGACY_JOURNAL_FORMAT,
];

/// Parses a naive local date-time in any of the formats the flat files have
/// used over time. A bare date means midnight.
pub fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Anchors a naive local time in `tz`.
///
/// Ambiguous times (autumn DST fold) resolve to the earlier instant; times
/// that do not exist (spring gap) are moved forward by an hour.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses an event or journal timestamp. Strings with an offset are taken as
/// is; naive strings are local to `tz`. Returns `None` for anything else.
pub fn parse_local(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(raw.trim()) {
        return Some(aware.with_timezone(&Utc));
    }
    parse_naive(raw).and_then(|naive| localize(naive, tz))
}

/// Monday 00:00 of the week containing `now`, in `tz`.
pub fn start_of_week(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let local_date = now.with_timezone(&tz).date_naive();
    let monday = local_date - Duration::days(i64::from(local_date.weekday().num_days_from_monday()));
    localize(monday.and_time(NaiveTime::MIN), tz).unwrap_or(now)
}

/// Converts epoch milliseconds from the gauge API.
pub fn from_epoch_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
