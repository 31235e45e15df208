//! Built-in station data for CIS Mersch.
//!
//! Defines the vehicles whose rosters appear on the dashboard, the river
//! gauges on the water page, and the seat ordering for each vehicle type.
//! These are the defaults; `config` can replace the vehicle and gauge lists
//! from `legasi.toml`, but position tables and calendar selections live only
//! here.

use crate::model::{CalendarType, PositionPriority, VehicleKind};

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Scheduling portal; one schedule per fire station, covering all its vehicles.
pub const SCHEDULE_BASE_URL: &str = "https://portailcgdis.intranet.etat.lu/api/current-situation/schedules";

/// River gauge graph data, `/{station_id}` appended.
pub const GAUGE_BASE_URL: &str = "https://www.inondations.lu/api/station/graph-data";

pub const WEATHER_BASE_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

pub const DEFAULT_STATION_NAME: &str = "CIS Mersch";
pub const DEFAULT_WEATHER_CITY: &str = "Mersch";

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

pub struct Vehicle {
    /// Short key used on the command line and in logs.
    pub key: &'static str,
    /// `servicePlanName` of this vehicle inside the schedule payload.
    pub plan_name: &'static str,
    pub plate: &'static str,
    pub kind: VehicleKind,
    /// Schedule id of the station the vehicle belongs to.
    pub schedule_id: u32,
}

/// Vehicles shown on the dashboard, in display order: Mersch heavy rescue
/// and ladder first, then the two Lintgen ambulances.
pub static VEHICLE_REGISTRY: &[Vehicle] = &[
    Vehicle {
        key: "MerschHLF21",
        plan_name: "MERSCH-HLF21",
        plate: "CG 2040",
        kind: VehicleKind::Hlf,
        schedule_id: 273,
    },
    Vehicle {
        key: "MerschDLK21",
        plan_name: "MERSCH-DLK21",
        plate: "CG 1468",
        kind: VehicleKind::Dlk,
        schedule_id: 273,
    },
    Vehicle {
        key: "LintgenRTW1",
        plan_name: "LINTGEN-RTW1",
        plate: "CG 2443",
        kind: VehicleKind::Rtw,
        schedule_id: 588,
    },
    Vehicle {
        key: "LintgenRTW2",
        plan_name: "LINTGEN-RTW2",
        plate: "CG 1153",
        kind: VehicleKind::Rtw,
        schedule_id: 588,
    },
];

pub fn schedule_url(schedule_id: u32) -> String {
    format!("{}/{}", SCHEDULE_BASE_URL, schedule_id)
}

pub fn vehicle_icon(kind: VehicleKind) -> &'static str {
    match kind {
        VehicleKind::Hlf | VehicleKind::Dlk => "🚒",
        VehicleKind::Rtw => "🚑",
    }
}

// ---------------------------------------------------------------------------
// Seat ordering
// ---------------------------------------------------------------------------

const HLF_POSITIONS: &[(&str, u32)] = &[
    ("Chef de Section", 1),
    ("Machiniste", 2),
    ("Chef Binôme 1", 3),
    ("Equipier Binôme 1", 4),
    ("Chef Binôme 2", 5),
    ("Equipier Binôme 2", 6),
];

const DLK_POSITIONS: &[(&str, u32)] = &[("Chef d'Agrès", 1), ("Machiniste", 2), ("Equipier", 3)];

const RTW_POSITIONS: &[(&str, u32)] = &[("Chef d'Agrès", 1), ("Chauffeur", 2), ("Equipier", 3)];

/// Seat label → rank for a vehicle type. Labels are matched exactly.
pub fn position_priority(kind: VehicleKind) -> PositionPriority {
    let table = match kind {
        VehicleKind::Hlf => HLF_POSITIONS,
        VehicleKind::Dlk => DLK_POSITIONS,
        VehicleKind::Rtw => RTW_POSITIONS,
    };
    table
        .iter()
        .map(|(label, rank)| (label.to_string(), *rank))
        .collect()
}

/// Abbreviation used in the crew column; unknown labels are shown as is.
pub fn short_position_label(label: &str) -> &str {
    match label {
        "Chef de Section" => "Ch. S.",
        "Machiniste" => "Mach.",
        "Chef Binôme 1" => "Ch. B.1",
        "Equipier Binôme 1" => "Eq. B.1",
        "Chef Binôme 2" => "Ch. B.2",
        "Equipier Binôme 2" => "Eq. B.2",
        "Chef d'Agrès" => "Ch. d'A.",
        "Chauffeur" => "Chauf.",
        "Equipier" => "Equip.",
        other => other,
    }
}

// ---------------------------------------------------------------------------
// River gauges
// ---------------------------------------------------------------------------

pub struct Gauge {
    pub station_id: u32,
    pub name: &'static str,
}

pub static GAUGE_REGISTRY: &[Gauge] = &[
    Gauge {
        station_id: 2,
        name: "Alzette zu Hesper",
    },
    Gauge {
        station_id: 6,
        name: "Eisch um Hunnebour",
    },
    Gauge {
        station_id: 5,
        name: "Mamer zu Schoenfels",
    },
];

pub fn gauge_url(station_id: u32) -> String {
    format!("{}/{}", GAUGE_BASE_URL, station_id)
}

// ---------------------------------------------------------------------------
// Calendars
// ---------------------------------------------------------------------------

/// Calendars shown in the dashboard's "upcoming" panel. Personal, PP and PV
/// calendars only appear on the calendar page.
pub const DASHBOARD_CALENDARS: [CalendarType; 4] = [
    CalendarType::Shared,
    CalendarType::Building,
    CalendarType::Vehicles,
    CalendarType::TrainingRoom,
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_no_duplicate_vehicle_keys_or_plans() {
        let mut keys = HashSet::new();
        let mut plans = HashSet::new();
        for vehicle in VEHICLE_REGISTRY {
            assert!(keys.insert(vehicle.key), "duplicate key '{}'", vehicle.key);
            assert!(
                plans.insert(vehicle.plan_name),
                "duplicate plan name '{}'",
                vehicle.plan_name
            );
        }
    }

    fn registered(key: &str) -> &'static Vehicle {
        VEHICLE_REGISTRY
            .iter()
            .find(|v| v.key == key)
            .unwrap_or_else(|| panic!("{} should be registered", key))
    }

    #[test]
    fn test_ambulances_use_rtw_seating() {
        let rtw = registered("LintgenRTW1");
        assert_eq!(rtw.plan_name, "LINTGEN-RTW1");
        assert_eq!(rtw.kind, VehicleKind::Rtw);
    }

    #[test]
    fn test_schedule_url_shared_per_station() {
        let hlf = registered("MerschHLF21");
        let dlk = registered("MerschDLK21");
        assert_eq!(schedule_url(hlf.schedule_id), schedule_url(dlk.schedule_id));
        assert!(schedule_url(588).ends_with("/schedules/588"));
    }

    #[test]
    fn test_position_ranks_are_unique_and_start_at_one() {
        for kind in [VehicleKind::Hlf, VehicleKind::Dlk, VehicleKind::Rtw] {
            let table = position_priority(kind);
            let mut ranks: Vec<u32> = table.values().copied().collect();
            ranks.sort_unstable();
            let expected: Vec<u32> = (1..=ranks.len() as u32).collect();
            assert_eq!(ranks, expected, "ranks for {:?} should be 1..=n", kind);
        }
    }

    #[test]
    fn test_every_ranked_position_has_a_short_label() {
        for kind in [VehicleKind::Hlf, VehicleKind::Dlk, VehicleKind::Rtw] {
            for label in position_priority(kind).keys() {
                assert_ne!(
                    short_position_label(label),
                    label.as_str(),
                    "'{}' should have an abbreviation",
                    label
                );
            }
        }
    }

    #[test]
    fn test_unknown_position_label_passes_through() {
        assert_eq!(short_position_label("Stagiaire"), "Stagiaire");
    }

    #[test]
    fn test_gauge_ids_unique() {
        let ids: HashSet<_> = GAUGE_REGISTRY.iter().map(|g| g.station_id).collect();
        assert_eq!(ids.len(), GAUGE_REGISTRY.len());
        assert_eq!(gauge_url(2), "https://www.inondations.lu/api/station/graph-data/2");
    }

    #[test]
    fn test_dashboard_calendars_exclude_personal_ones() {
        assert!(!DASHBOARD_CALENDARS.contains(&CalendarType::Personal));
        assert!(!DASHBOARD_CALENDARS.contains(&CalendarType::Pp));
        assert!(!DASHBOARD_CALENDARS.contains(&CalendarType::Pv));
    }
}
