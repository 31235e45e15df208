//! Configuration loading.
//!
//! Non-secret settings come from an optional TOML file (`legasi.toml`, or the
//! path in `LEGASI_CONFIG` / `--config`). Every section is optional and falls
//! back to the built-in registry. Secrets are read from the environment,
//! which `load_env` populates from a `.env` file when present.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::alert::StatusTable;
use crate::error::ConfigError;
use crate::model::{StatusClass, VehicleKind};
use crate::registry;

pub const DEFAULT_CONFIG_FILE: &str = "legasi.toml";
pub const CONFIG_ENV: &str = "LEGASI_CONFIG";

pub const PASSWORD_ENV: &str = "LEGASI_PASSWORD";
pub const SCHEDULE_COOKIE_ENV: &str = "LEGASI_SCHEDULE_COOKIE";
pub const WEATHER_API_KEY_ENV: &str = "LEGASI_WEATHER_API_KEY";

// ---------------------------------------------------------------------------
// File sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub station: StationSection,
    pub data: DataSection,
    pub auth: AuthSection,
    pub weather: WeatherSection,
    pub fetch: FetchSection,
    pub status: StatusSection,
    pub vehicles: Vec<VehicleConfig>,
    pub gauges: Vec<GaugeConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StationSection {
    pub name: String,
    /// IANA timezone name.
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSection {
    pub events_file: PathBuf,
    pub checklist_file: PathBuf,
    pub journal_file: PathBuf,
    /// Read-only list of vehicle names offered for "Gefierer" events.
    pub vehicles_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// Users allowed to log in with the shared password.
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherSection {
    pub city: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSection {
    pub timeout_secs: u64,
    /// How long a successful API response is reused.
    pub cache_ttl_secs: u64,
    pub dashboard_refresh_secs: u64,
    pub water_refresh_secs: u64,
}

/// Overrides for the status digit table, e.g. `classes = { "9" = "warn" }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusSection {
    pub classes: BTreeMap<String, StatusClass>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VehicleConfig {
    pub key: String,
    pub plan_name: String,
    #[serde(default)]
    pub plate: String,
    pub kind: VehicleKind,
    pub schedule_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GaugeConfig {
    pub station_id: u32,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl GaugeConfig {
    pub fn url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| registry::gauge_url(self.station_id))
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for Config {
    fn default() -> Self {
        Self {
            station: StationSection::default(),
            data: DataSection::default(),
            auth: AuthSection::default(),
            weather: WeatherSection::default(),
            fetch: FetchSection::default(),
            status: StatusSection::default(),
            vehicles: default_vehicles(),
            gauges: default_gauges(),
        }
    }
}

impl Default for StationSection {
    fn default() -> Self {
        Self {
            name: registry::DEFAULT_STATION_NAME.to_string(),
            timezone: crate::clock::STATION_TZ.name().to_string(),
        }
    }
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            events_file: PathBuf::from("events.json"),
            checklist_file: PathBuf::from("checklist.json"),
            journal_file: PathBuf::from("tagebuch.json"),
            vehicles_file: PathBuf::from("vehicles.json"),
        }
    }
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            users: vec!["Sean".to_string()],
        }
    }
}

impl Default for WeatherSection {
    fn default() -> Self {
        Self {
            city: registry::DEFAULT_WEATHER_CITY.to_string(),
            base_url: registry::WEATHER_BASE_URL.to_string(),
        }
    }
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            cache_ttl_secs: 300,
            dashboard_refresh_secs: 60,
            water_refresh_secs: 300,
        }
    }
}

pub fn default_vehicles() -> Vec<VehicleConfig> {
    registry::VEHICLE_REGISTRY
        .iter()
        .map(|v| VehicleConfig {
            key: v.key.to_string(),
            plan_name: v.plan_name.to_string(),
            plate: v.plate.to_string(),
            kind: v.kind,
            schedule_url: registry::schedule_url(v.schedule_id),
        })
        .collect()
}

pub fn default_gauges() -> Vec<GaugeConfig> {
    registry::GAUGE_REGISTRY
        .iter()
        .map(|g| GaugeConfig {
            station_id: g.station_id,
            name: g.name.to_string(),
            url: None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Loads the config file.
    ///
    /// An explicit path (argument or `LEGASI_CONFIG`) must exist. Without one,
    /// `legasi.toml` in the working directory is used if present, otherwise
    /// the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        let from_env = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load_file(&path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_file(default_path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    pub fn from_toml_str(text: &str, origin: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        // fail early rather than on first page render
        config.timezone()?;
        config.status_table()?;
        Ok(config)
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.station
            .timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Timezone(self.station.timezone.clone()))
    }

    /// Default status table with the `[status]` overrides applied.
    pub fn status_table(&self) -> Result<StatusTable, ConfigError> {
        let mut table = StatusTable::default();
        for (key, class) in &self.status.classes {
            let digit = match key.parse::<u8>() {
                Ok(d) if (1..=9).contains(&d) => d,
                _ => {
                    return Err(ConfigError::StatusTable {
                        digit: key.clone(),
                        message: "expected a digit from 1 to 9".to_string(),
                    });
                }
            };
            table.set_class(digit, *class);
        }
        Ok(table)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.fetch.cache_ttl_secs)
    }

    pub fn find_vehicle(&self, key: &str) -> Option<&VehicleConfig> {
        self.vehicles.iter().find(|v| v.key == key)
    }
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

/// Credentials that never go into the config file.
#[derive(Clone, Default)]
pub struct Secrets {
    pub password: Option<String>,
    pub schedule_cookie: Option<String>,
    pub weather_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Secrets")
            .field("password", &mask(&self.password))
            .field("schedule_cookie", &mask(&self.schedule_cookie))
            .field("weather_api_key", &mask(&self.weather_api_key))
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            password: var(PASSWORD_ENV),
            schedule_cookie: var(SCHEDULE_COOKIE_ENV),
            weather_api_key: var(WEATHER_API_KEY_ENV),
        }
    }
}

/// Loads `.env` into the process environment if the file exists.
pub fn load_env() {
    dotenv::dotenv().ok();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
