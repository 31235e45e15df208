//! Data Source Verification Module
//!
//! Checks the configured vehicles, gauges and weather city against the live
//! APIs and reports which ones answer with usable data.
//!
//! Run this after editing `legasi.toml` or when the portal cookie was renewed.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::normalize_roster;
use crate::config::{Config, GaugeConfig, Secrets, VehicleConfig};
use crate::error::{SourceError, StoreError};
use crate::ingest::JsonSource;
use crate::ingest::gauge::fetch_gauge;
use crate::ingest::schedule::fetch_roster;
use crate::ingest::weather::fetch_current;
use crate::registry::position_priority;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub schedule_results: Vec<ScheduleVerification>,
    pub gauge_results: Vec<GaugeVerification>,
    pub weather_result: WeatherVerification,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationSummary {
    pub vehicles_total: usize,
    pub vehicles_working: usize,
    pub vehicles_failed: usize,
    pub gauges_total: usize,
    pub gauges_working: usize,
    pub gauges_failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleVerification {
    pub vehicle_key: String,
    pub plan_name: String,
    pub status: VerificationStatus,
    pub plan_found: bool,
    pub vehicle_status: String,
    pub crew_count: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GaugeVerification {
    pub station_id: u32,
    pub name: String,
    pub status: VerificationStatus,
    pub reading_count: usize,
    pub past_reading_count: usize,
    pub thresholds_present: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherVerification {
    pub city: String,
    pub status: VerificationStatus,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
    /// Not attempted because a credential is missing.
    Skipped,
}

impl VerificationStatus {
    fn is_working(self) -> bool {
        matches!(self, VerificationStatus::Success | VerificationStatus::PartialSuccess)
    }
}

// ============================================================================
// Per-source checks
// ============================================================================

/// A vehicle works when its plan is in the payload. A plan that carries no
/// crew is a partial success; a plan missing from the payload is a failure,
/// since the dashboard has nothing to show for it.
pub fn verify_vehicle(
    source: &dyn JsonSource,
    vehicle: &VehicleConfig,
    cookie: Option<&str>,
) -> ScheduleVerification {
    let mut result = ScheduleVerification {
        vehicle_key: vehicle.key.clone(),
        plan_name: vehicle.plan_name.clone(),
        status: VerificationStatus::Failed,
        plan_found: false,
        vehicle_status: "?".to_string(),
        crew_count: 0,
        error_message: None,
    };

    match fetch_roster(source, &vehicle.schedule_url, cookie) {
        Ok(payload) => {
            result.plan_found = payload
                .iter()
                .any(|p| p.service_plan_name.as_deref() == Some(vehicle.plan_name.as_str()));
            if !result.plan_found {
                result.error_message = Some(format!("plan {} not in payload", vehicle.plan_name));
                return result;
            }
            let roster = normalize_roster(&payload, &vehicle.plan_name, &position_priority(vehicle.kind));
            result.vehicle_status = roster.status.to_string();
            result.crew_count = roster.crew.len();
            result.status = if roster.crew.is_empty() {
                VerificationStatus::PartialSuccess
            } else {
                VerificationStatus::Success
            };
        }
        Err(e) => result.error_message = Some(e.to_string()),
    }

    result
}

/// Checks one configured vehicle by its key; `None` when no vehicle has it.
pub fn verify_vehicle_by_key(
    config: &Config,
    secrets: &Secrets,
    source: &dyn JsonSource,
    key: &str,
) -> Option<ScheduleVerification> {
    config
        .find_vehicle(key)
        .map(|v| verify_vehicle(source, v, secrets.schedule_cookie.as_deref()))
}

pub fn verify_gauge(source: &dyn JsonSource, gauge: &GaugeConfig, now: DateTime<Utc>) -> GaugeVerification {
    let mut result = GaugeVerification {
        station_id: gauge.station_id,
        name: gauge.name.clone(),
        status: VerificationStatus::Failed,
        reading_count: 0,
        past_reading_count: 0,
        thresholds_present: false,
        error_message: None,
    };

    match fetch_gauge(source, &gauge.url()) {
        Ok(series) => {
            result.reading_count = series.readings.len();
            result.past_reading_count = series.readings.iter().filter(|r| r.timestamp <= now).count();
            result.thresholds_present = series.thresholds.pre_alert.is_some() || series.thresholds.alert.is_some();
            result.status = if result.past_reading_count > 0 && result.thresholds_present {
                VerificationStatus::Success
            } else {
                VerificationStatus::PartialSuccess
            };
        }
        Err(e) => result.error_message = Some(e.to_string()),
    }

    result
}

pub fn verify_weather(source: &dyn JsonSource, config: &Config, secrets: &Secrets) -> WeatherVerification {
    let (status, error_message) = match fetch_current(
        source,
        &config.weather.base_url,
        &config.weather.city,
        secrets.weather_api_key.as_deref(),
    ) {
        Ok(_) => (VerificationStatus::Success, None),
        Err(e @ SourceError::NotConfigured(_)) => (VerificationStatus::Skipped, Some(e.to_string())),
        Err(e) => (VerificationStatus::Failed, Some(e.to_string())),
    };
    WeatherVerification {
        city: config.weather.city.clone(),
        status,
        error_message,
    }
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn run_full_verification(
    config: &Config,
    secrets: &Secrets,
    source: &dyn JsonSource,
    now: DateTime<Utc>,
) -> VerificationReport {
    let schedule_results: Vec<ScheduleVerification> = config
        .vehicles
        .iter()
        .map(|v| verify_vehicle(source, v, secrets.schedule_cookie.as_deref()))
        .collect();

    let gauge_results: Vec<GaugeVerification> = config
        .gauges
        .iter()
        .map(|g| verify_gauge(source, g, now))
        .collect();

    let vehicles_working = schedule_results.iter().filter(|r| r.status.is_working()).count();
    let gauges_working = gauge_results.iter().filter(|r| r.status.is_working()).count();

    VerificationReport {
        timestamp: now.to_rfc3339(),
        summary: VerificationSummary {
            vehicles_total: schedule_results.len(),
            vehicles_working,
            vehicles_failed: schedule_results.len() - vehicles_working,
            gauges_total: gauge_results.len(),
            gauges_working,
            gauges_failed: gauge_results.len() - gauges_working,
        },
        schedule_results,
        gauge_results,
        weather_result: verify_weather(source, config, secrets),
    }
}

fn status_line(status: VerificationStatus, ok: String, error: Option<&str>) -> String {
    match status {
        VerificationStatus::Success => format!("✓ OK ({})", ok),
        VerificationStatus::PartialSuccess => format!("⚠ Partial ({})", error.unwrap_or(&ok)),
        VerificationStatus::Failed => format!("✗ FAILED: {}", error.unwrap_or("Unknown")),
        VerificationStatus::Skipped => format!("- skipped: {}", error.unwrap_or("not configured")),
    }
}

pub fn print_vehicle_result(r: &ScheduleVerification) {
    println!(
        "  {} ... {}",
        r.vehicle_key,
        status_line(
            r.status,
            format!("status {}, {} crew", r.vehicle_status, r.crew_count),
            r.error_message.as_deref()
        )
    );
}

pub fn print_report(report: &VerificationReport) {
    println!("🔍 Verifying vehicle rosters...");
    for r in &report.schedule_results {
        print_vehicle_result(r);
    }

    println!("\n🔍 Verifying river gauges...");
    for r in &report.gauge_results {
        println!(
            "  {} ({}) ... {}",
            r.name,
            r.station_id,
            status_line(
                r.status,
                format!("{} readings, {} past", r.reading_count, r.past_reading_count),
                r.error_message.as_deref()
            )
        );
    }

    println!("\n🔍 Verifying weather...");
    let w = &report.weather_result;
    println!(
        "  {} ... {}",
        w.city,
        status_line(w.status, "current conditions".to_string(), w.error_message.as_deref())
    );

    print_summary(report);
}

pub fn print_summary(report: &VerificationReport) {
    let rule = "═".repeat(60);
    println!("\n{}", rule);
    println!("📊 VERIFICATION SUMMARY");
    println!("{}", rule);
    println!();
    println!(
        "Vehicles:   {}/{} working  ({} failed)",
        report.summary.vehicles_working, report.summary.vehicles_total, report.summary.vehicles_failed
    );
    println!(
        "Gauges:     {}/{} working  ({} failed)",
        report.summary.gauges_working, report.summary.gauges_total, report.summary.gauges_failed
    );
    println!("Weather:    {:?}", report.weather_result.status);
    println!("{}", rule);
}

/// Writes the report as pretty JSON.
pub fn save_report(report: &VerificationReport, path: &Path) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(report).map_err(|e| StoreError::Serialize {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    std::fs::write(path, json).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })
}

// ============================================================================
// Tests
// ============================================================================
