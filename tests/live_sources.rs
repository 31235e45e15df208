/// Live checks against the real upstream APIs
///
/// These tests verify:
/// 1. The gauge API returns levels and thresholds for the configured stations
/// 2. The scheduling portal answers with the configured plans (needs cookie)
/// 3. OpenWeatherMap answers for the station town (needs API key)
///
/// Prerequisites:
/// - Internet connectivity; the portal is only reachable from the state intranet
/// - LEGASI_SCHEDULE_COOKIE and LEGASI_WEATHER_API_KEY in the environment or .env
///
/// Run with: cargo test --test live_sources -- --ignored --test-threads=1

use std::time::Duration;

use chrono::Utc;

use legasi_service::alert::classify_level;
use legasi_service::config::{self, Config, Secrets};
use legasi_service::ingest::HttpSource;
use legasi_service::ingest::gauge::fetch_gauge;
use legasi_service::ingest::schedule::fetch_roster;
use legasi_service::ingest::weather::fetch_current;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn live_source() -> HttpSource {
    HttpSource::new(Duration::from_secs(10)).expect("Failed to create HTTP client")
}

fn secrets() -> Secrets {
    config::load_env();
    Secrets::from_env()
}

// ---------------------------------------------------------------------------
// Gauges
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn test_gauge_api_returns_levels_for_every_station() {
    let source = live_source();
    let now = Utc::now();

    for gauge in Config::default().gauges {
        let url = gauge.url();
        println!("Testing gauge API: {}", url);

        let series = fetch_gauge(&source, &url)
            .unwrap_or_else(|e| panic!("gauge {} ({}) failed: {}", gauge.station_id, gauge.name, e));
        assert!(!series.readings.is_empty(), "{} returned no levels", gauge.name);

        let c = classify_level(&series.readings, &series.thresholds, now);
        println!(
            "✓ {}: {} readings, latest {:?} cm ({:?}), thresholds {:?}",
            gauge.name,
            series.readings.len(),
            c.value,
            c.tier,
            series.thresholds
        );
    }
}

// ---------------------------------------------------------------------------
// Scheduling portal
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn test_schedule_portal_returns_configured_plans() {
    let secrets = secrets();
    let Some(cookie) = secrets.schedule_cookie.as_deref() else {
        println!("⚠ LEGASI_SCHEDULE_COOKIE not set, skipping");
        return;
    };
    let source = live_source();

    for vehicle in Config::default().vehicles {
        let payload = fetch_roster(&source, &vehicle.schedule_url, Some(cookie))
            .unwrap_or_else(|e| panic!("{} failed: {}", vehicle.key, e));
        let found = payload
            .iter()
            .any(|p| p.service_plan_name.as_deref() == Some(vehicle.plan_name.as_str()));
        assert!(found, "plan {} missing from {}", vehicle.plan_name, vehicle.schedule_url);
        println!("✓ {} found ({} plans in payload)", vehicle.plan_name, payload.len());
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn test_weather_api_returns_current_conditions() {
    let secrets = secrets();
    let Some(key) = secrets.weather_api_key.as_deref() else {
        println!("⚠ LEGASI_WEATHER_API_KEY not set, skipping");
        return;
    };
    let config = Config::default();

    let report = fetch_current(&live_source(), &config.weather.base_url, &config.weather.city, Some(key))
        .expect("weather request failed");
    assert!(report.sunrise < report.sunset);
    assert!((0.0..=100.0).contains(&report.humidity_pct));
    println!("✓ {}: {}°C", config.weather.city, report.temperature_c);
}
