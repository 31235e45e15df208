//! Page assembly for the dashboard and the water level page.
//!
//! A page is built in one pass: every external source is fetched once, each
//! failure is kept next to the panel it belongs to, and the page itself only
//! fails when a local document cannot be read or the config is invalid.
//!
//! Clock injection: both builders take `now`, nothing here reads the system
//! clock.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::alert::{StatusTable, classify_level};
use crate::analysis::{NormalizedRoster, normalize_roster, upcoming_events};
use crate::clock::start_of_week;
use crate::config::{Config, Secrets, VehicleConfig};
use crate::error::{Error, SourceError};
use crate::ingest::JsonSource;
use crate::ingest::gauge::fetch_gauge;
use crate::ingest::schedule::fetch_roster;
use crate::ingest::weather::fetch_current;
use crate::logging::{self, DataSource};
use crate::model::{
    CalendarEvent, ChecklistItem, LevelClassification, RosterPayload, StatusClass, ThresholdSet,
    VehicleKind, WeatherReport,
};
use crate::registry::{DASHBOARD_CALENDARS, position_priority};
use crate::store::{ChecklistStore, EventStore};

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CrewReport {
    pub roster: NormalizedRoster,
    pub class: StatusClass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehiclePanel {
    pub key: String,
    pub plate: String,
    pub kind: VehicleKind,
    pub crew: Result<CrewReport, SourceError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub station_name: String,
    pub generated_at: DateTime<Utc>,
    pub tz: Tz,
    pub vehicles: Vec<VehiclePanel>,
    /// Dashboard calendars from Monday 00:00 of this week on, earliest first.
    pub upcoming: Vec<CalendarEvent>,
    pub checklist: Vec<ChecklistItem>,
    pub weather_city: String,
    pub weather: Result<WeatherReport, SourceError>,
}

pub fn build_dashboard(
    config: &Config,
    secrets: &Secrets,
    source: &dyn JsonSource,
    now: DateTime<Utc>,
) -> Result<DashboardSnapshot, Error> {
    let tz = config.timezone()?;
    let table = config.status_table()?;

    let vehicles = vehicle_panels(&config.vehicles, secrets, source, &table);

    let events = EventStore::new(&config.data.events_file).list_events()?;
    let allowed: HashSet<_> = DASHBOARD_CALENDARS.into_iter().collect();
    let upcoming = upcoming_events(&events, &allowed, start_of_week(now, tz), tz)
        .into_iter()
        .cloned()
        .collect();

    let checklist = ChecklistStore::new(&config.data.checklist_file).list()?;

    let weather = fetch_current(
        source,
        &config.weather.base_url,
        &config.weather.city,
        secrets.weather_api_key.as_deref(),
    );
    if let Err(e) = &weather {
        logging::log_source_failure(DataSource::Weather, &config.weather.city, "current weather", e);
    }

    let failed = vehicles.iter().filter(|v| v.crew.is_err()).count() + usize::from(weather.is_err());
    let total = vehicles.len() + 1;
    logging::log_refresh_summary(DataSource::System, total, total - failed, failed);

    Ok(DashboardSnapshot {
        station_name: config.station.name.clone(),
        generated_at: now,
        tz,
        vehicles,
        upcoming,
        checklist,
        weather_city: config.weather.city.clone(),
        weather,
    })
}

/// One panel per configured vehicle, in config order. Vehicles sharing a
/// schedule URL share a single request.
fn vehicle_panels(
    vehicles: &[VehicleConfig],
    secrets: &Secrets,
    source: &dyn JsonSource,
    table: &StatusTable,
) -> Vec<VehiclePanel> {
    let mut payloads: HashMap<&str, Result<RosterPayload, SourceError>> = HashMap::new();

    vehicles
        .iter()
        .map(|vehicle| {
            let payload = payloads
                .entry(vehicle.schedule_url.as_str())
                .or_insert_with(|| {
                    fetch_roster(source, &vehicle.schedule_url, secrets.schedule_cookie.as_deref())
                });

            let crew = match &*payload {
                Ok(plans) => {
                    let roster = normalize_roster(plans, &vehicle.plan_name, &position_priority(vehicle.kind));
                    Ok(CrewReport {
                        class: roster.class(table),
                        roster,
                    })
                }
                Err(e) => {
                    logging::log_source_failure(DataSource::Schedule, &vehicle.key, "roster fetch", e);
                    Err(e.clone())
                }
            };

            VehiclePanel {
                key: vehicle.key.clone(),
                plate: vehicle.plate.clone(),
                kind: vehicle.kind,
                crew,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Water levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeReport {
    /// Usable readings in the response, past and forecast.
    pub reading_count: usize,
    pub classification: LevelClassification,
    pub thresholds: ThresholdSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugePanel {
    pub station_id: u32,
    pub name: String,
    pub report: Result<GaugeReport, SourceError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaterPage {
    pub generated_at: DateTime<Utc>,
    pub tz: Tz,
    pub gauges: Vec<GaugePanel>,
}

pub fn build_water_page(
    config: &Config,
    source: &dyn JsonSource,
    now: DateTime<Utc>,
) -> Result<WaterPage, Error> {
    let tz = config.timezone()?;

    let gauges: Vec<GaugePanel> = config
        .gauges
        .iter()
        .map(|gauge| {
            let subject = gauge.station_id.to_string();
            let report = fetch_gauge(source, &gauge.url()).map(|series| {
                if series.skipped > 0 {
                    logging::debug(
                        DataSource::Gauge,
                        Some(&subject),
                        &format!("{} unusable level entries skipped", series.skipped),
                    );
                }
                GaugeReport {
                    reading_count: series.readings.len(),
                    classification: classify_level(&series.readings, &series.thresholds, now),
                    thresholds: series.thresholds,
                }
            });
            if let Err(e) = &report {
                logging::log_source_failure(DataSource::Gauge, &subject, "level fetch", e);
            }
            GaugePanel {
                station_id: gauge.station_id,
                name: gauge.name.clone(),
                report,
            }
        })
        .collect();

    let failed = gauges.iter().filter(|g| g.report.is_err()).count();
    logging::log_refresh_summary(DataSource::Gauge, gauges.len(), gauges.len() - failed, failed);

    Ok(WaterPage {
        generated_at: now,
        tz,
        gauges,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::test_support::CannedSource;
    use crate::ingest::weather::build_weather_url;
    use crate::model::{LevelTier, StatusCode};
    use chrono::TimeZone;
    use serde_json::json;
    use std::fs;

    fn now() -> DateTime<Utc> {
        // Wednesday 5 March 2025, 11:00 in Luxembourg
        Utc.with_ymd_and_hms(2025, 3, 5, 10, 0, 0).unwrap()
    }

    fn config_in(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.data.events_file = dir.path().join("events.json");
        config.data.checklist_file = dir.path().join("checklist.json");
        config.data.journal_file = dir.path().join("tagebuch.json");
        config
    }

    fn schedule_body() -> serde_json::Value {
        json!([
            {
                "servicePlanName": "MERSCH-HLF21",
                "servicePlanVehiculeStatus": { "status": { "value": "2" } },
                "rows": [{ "prestations": [
                    { "position": { "label": "Machiniste" }, "person": { "firstName": "Jo", "lastName": "Weber" } },
                    { "position": { "label": "Chef de Section" }, "person": { "firstName": "Anne", "lastName": "Muller" } }
                ]}]
            },
            {
                "servicePlanName": "MERSCH-DLK21",
                "servicePlanVehiculeStatus": { "status": { "value": 6 } },
                "rows": []
            }
        ])
    }

    #[test]
    fn test_dashboard_collects_panels_and_inline_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        fs::write(
            &config.data.events_file,
            r#"[
                {"title": "Last week", "start": "2025-02-28T10:00:00", "end": "2025-02-28T11:00:00", "calendar_type": "Batiment"},
                {"title": "Iwwung", "start": "2025-03-06T19:00:00", "end": "2025-03-06T21:00:00", "calendar_type": "Gemeinsam CIS Kalenner"},
                {"title": "Private", "start": "2025-03-06T08:00:00", "end": "2025-03-06T09:00:00", "calendar_type": "PP Kalenner"},
                {"title": "Monday", "start": "2025-03-03T00:00:00", "end": "2025-03-03T23:59:00", "calendar_type": "Gefierer", "all_day": true, "vehicle": "HLF"}
            ]"#,
        )
        .unwrap();

        let source = CannedSource::default()
            .with(&crate::registry::schedule_url(273), Ok(schedule_body()))
            .with(&crate::registry::schedule_url(588), Err(SourceError::HttpStatus(401)));
        let secrets = Secrets::default();

        let snapshot = build_dashboard(&config, &secrets, &source, now()).unwrap();

        assert_eq!(snapshot.vehicles.len(), 4);
        let hlf = snapshot.vehicles[0].crew.as_ref().unwrap();
        assert_eq!(hlf.roster.status, StatusCode::Digit(2));
        assert_eq!(hlf.class, StatusClass::Ok);
        assert_eq!(hlf.roster.crew[0].full_name, "Anne Muller");

        let dlk = snapshot.vehicles[1].crew.as_ref().unwrap();
        assert_eq!(dlk.class, StatusClass::Critical);
        assert!(dlk.roster.crew.is_empty());

        assert_eq!(snapshot.vehicles[2].crew, Err(SourceError::HttpStatus(401)));
        assert_eq!(snapshot.vehicles[3].crew, Err(SourceError::HttpStatus(401)));

        let titles: Vec<&str> = snapshot.upcoming.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Monday", "Iwwung"]);

        assert!(snapshot.checklist.is_empty());
        assert!(matches!(snapshot.weather, Err(SourceError::NotConfigured(_))));
    }

    #[test]
    fn test_shared_schedule_url_is_fetched_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let source = CannedSource::default()
            .with(&crate::registry::schedule_url(273), Ok(schedule_body()))
            .with(&crate::registry::schedule_url(588), Ok(json!([])));

        build_dashboard(&config, &Secrets::default(), &source, now()).unwrap();

        let schedule_requests = source
            .requests
            .borrow()
            .iter()
            .filter(|(url, _)| url.contains("/schedules/"))
            .count();
        assert_eq!(schedule_requests, 2);
    }

    #[test]
    fn test_weather_is_fetched_with_key() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let secrets = Secrets {
            weather_api_key: Some("k".to_string()),
            ..Secrets::default()
        };
        let url = build_weather_url(&config.weather.base_url, "Mersch", "k").unwrap();
        let source = CannedSource::default().with(
            &url,
            Ok(json!({
                "main": { "temp": 4.5, "humidity": 80, "pressure": 1020 },
                "wind": { "speed": 2.0 },
                "sys": { "sunrise": 1741155600, "sunset": 1741196400 }
            })),
        );

        let snapshot = build_dashboard(&config, &secrets, &source, now()).unwrap();
        assert_eq!(snapshot.weather.unwrap().temperature_c, 4.5);
    }

    #[test]
    fn test_water_page_classifies_each_gauge() {
        let config = Config::default();
        let ten = Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap().timestamp_millis();
        let nine = Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap().timestamp_millis();
        let later = Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap().timestamp_millis();

        let source = CannedSource::default()
            .with(
                &crate::registry::gauge_url(2),
                Ok(json!({
                    "levels": [{ "time": nine, "level": 40 }, { "time": ten, "level": 61 }],
                    "thresholds": { "cote-prealerte": 50, "cote-alerte": 60 }
                })),
            )
            .with(&crate::registry::gauge_url(6), Ok(json!({ "levels": [] })))
            .with(
                &crate::registry::gauge_url(5),
                Ok(json!({ "levels": [{ "time": later, "level": 99 }] })),
            );

        let page = build_water_page(&config, &source, now()).unwrap();
        assert_eq!(page.gauges.len(), 3);

        let alzette = page.gauges[0].report.as_ref().unwrap();
        assert_eq!(alzette.classification.tier, LevelTier::Alert);
        assert_eq!(alzette.classification.value, Some(61.0));

        let eisch = page.gauges[1].report.as_ref().unwrap();
        assert_eq!(eisch.reading_count, 0);
        assert_eq!(eisch.classification.tier, LevelTier::NoData);

        let mamer = page.gauges[2].report.as_ref().unwrap();
        assert_eq!(mamer.reading_count, 1);
        assert_eq!(mamer.classification.tier, LevelTier::NoData);
    }

    #[test]
    fn test_water_page_keeps_gauge_errors_inline() {
        let config = Config::default();
        let source = CannedSource::default();
        let page = build_water_page(&config, &source, now()).unwrap();
        assert!(page.gauges.iter().all(|g| g.report.is_err()));
    }
}
