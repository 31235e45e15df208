/// OpenWeatherMap current-conditions client
///
/// Retrieves the current weather for the station's town for the dashboard's
/// weather column: temperature, humidity, pressure, wind and sun times.
///
/// API Documentation: https://openweathermap.org/current

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::SourceError;
use crate::ingest::JsonSource;
use crate::model::WeatherReport;

// ============================================================================
// OpenWeatherMap Response Structures
// ============================================================================

/// Current weather response (only the fields we show)
#[derive(Debug, Deserialize)]
pub struct OwmCurrentResponse {
    pub main: OwmMain,
    pub wind: OwmWind,
    pub sys: OwmSys,
}

#[derive(Debug, Deserialize)]
pub struct OwmMain {
    pub temp: f64,      // °C with units=metric
    pub humidity: f64,  // %
    pub pressure: f64,  // hPa
}

#[derive(Debug, Deserialize)]
pub struct OwmWind {
    pub speed: f64,  // m/s with units=metric
}

#[derive(Debug, Deserialize)]
pub struct OwmSys {
    pub sunrise: i64,  // Unix seconds
    pub sunset: i64,
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Builds the current-weather URL for a city, metric units.
pub fn build_weather_url(base_url: &str, city: &str, api_key: &str) -> Result<String, SourceError> {
    reqwest::Url::parse_with_params(
        base_url,
        &[("q", city), ("appid", api_key), ("units", "metric")],
    )
    .map(|url| url.to_string())
    .map_err(|e| SourceError::NotConfigured(format!("weather base url: {}", e)))
}

/// Fetch current conditions for a city
///
/// # Returns
/// `SourceError::NotConfigured` when no API key is set, otherwise the
/// parsed report or the fetch/parse failure.
pub fn fetch_current(
    source: &dyn JsonSource,
    base_url: &str,
    city: &str,
    api_key: Option<&str>,
) -> Result<WeatherReport, SourceError> {
    let api_key = api_key.ok_or_else(|| SourceError::NotConfigured("weather api key".to_string()))?;
    let url = build_weather_url(base_url, city, api_key)?;
    let body = source.get_json(&url, None)?;
    parse_weather(&body)
}

/// Parse a current-weather body into our format
pub fn parse_weather(body: &serde_json::Value) -> Result<WeatherReport, SourceError> {
    let response: OwmCurrentResponse = serde_json::from_value(body.clone())
        .map_err(|e| SourceError::Parse(e.to_string()))?;

    Ok(WeatherReport {
        temperature_c: response.main.temp,
        humidity_pct: response.main.humidity,
        pressure_hpa: response.main.pressure,
        wind_speed_ms: response.wind.speed,
        sunrise: unix_seconds(response.sys.sunrise)?,
        sunset: unix_seconds(response.sys.sunset)?,
    })
}

fn unix_seconds(secs: i64) -> Result<DateTime<Utc>, SourceError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| SourceError::Parse(format!("timestamp out of range: {}", secs)))
}

// ============================================================================
// Tests
// ============================================================================
