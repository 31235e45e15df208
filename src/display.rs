//! Plain-text rendering of the pages.
//!
//! Everything the crew reads is in Luxembourgish, as on the station screens.
//! Times are shown in the station timezone.

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

use crate::analysis::NormalizedRoster;
use crate::clock::parse_local;
use crate::dashboard::{DashboardSnapshot, GaugePanel, VehiclePanel, WaterPage};
use crate::model::{
    CalendarEvent, CalendarType, ChecklistItem, JournalEntry, LevelTier, StatusClass, WeatherReport,
};
use crate::registry::{short_position_label, vehicle_icon};

pub const NO_CREW: &str = "Keng Personal Daten";
pub const NO_UPCOMING_EVENTS: &str = "Keng Evenementer an der aktueller Woch oder spéider";
pub const NO_TODO: &str = "Keng Aufgab ze maachen.";
pub const NO_GAUGE_DATA: &str = "Keng Donnéeën verfügbar.";
pub const NO_RECENT_READING: &str = "Keng rezent Miessung fonnt.";
pub const ALL_DAY: &str = "Ganzen Daag";

const WEEKDAYS: [&str; 7] = [
    "Méindeg",
    "Dënschdeg",
    "Mëttwoch",
    "Donneschdeg",
    "Freideg",
    "Samschdeg",
    "Sonndeg",
];

const MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "Mäerz",
    "Abrëll",
    "Mee",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// Luxembourgish month name, `month` being 1-12.
pub fn month_name(month: u32) -> &'static str {
    MONTHS
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("?")
}

/// "Méindeg, 3. Mäerz 2025 - 14:05"
pub fn date_header(now: DateTime<Utc>, tz: Tz) -> String {
    let local = now.with_timezone(&tz);
    format!(
        "{}, {}. {} {} - {:02}:{:02}",
        WEEKDAYS[local.weekday().num_days_from_monday() as usize],
        local.day(),
        month_name(local.month()),
        local.year(),
        local.hour(),
        local.minute()
    )
}

fn local_stamp(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%d.%m.%Y %H:%M").to_string()
}

fn local_clock(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%H:%M").to_string()
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

fn class_tag(class: StatusClass) -> &'static str {
    match class {
        StatusClass::Ok => "🟩",
        StatusClass::Warn => "🟨",
        StatusClass::Critical => "🟥",
        StatusClass::Unknown => "⬜",
    }
}

/// Crew rows as "<short seat>  <name>", or the no-crew notice.
pub fn crew_lines(roster: &NormalizedRoster) -> Vec<String> {
    if roster.crew.is_empty() {
        return vec![NO_CREW.to_string()];
    }
    roster
        .crew
        .iter()
        .map(|m| format!("{:<9} {}", short_position_label(&m.position_label), m.full_name))
        .collect()
}

pub fn vehicle_block(panel: &VehiclePanel) -> Vec<String> {
    let title = format!("{} {} ({})", vehicle_icon(panel.kind), panel.key, panel.plate);
    match &panel.crew {
        Ok(report) => {
            let mut lines = vec![format!(
                "{}  {} Status: {}",
                title,
                class_tag(report.class),
                report.roster.status
            )];
            lines.extend(crew_lines(&report.roster).into_iter().map(|l| format!("  {}", l)));
            lines
        }
        Err(e) => vec![
            title,
            format!("  ❌ Feeler beim lueden vun den Donnéeë fir {}: {}", panel.key, e),
        ],
    }
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Title with the vehicle appended, as used in every calendar view.
pub fn event_title(event: &CalendarEvent) -> String {
    match &event.vehicle {
        Some(vehicle) => format!("{} ({})", event.title, vehicle),
        None => event.title.clone(),
    }
}

/// Start/end part of an event line. All-day events show only their first day.
pub fn event_span(event: &CalendarEvent, tz: Tz) -> String {
    let start = parse_local(&event.start, tz);
    let end = parse_local(&event.end, tz);
    match (start, end) {
        (Some(start), _) if event.all_day => {
            format!("{} - {}", start.with_timezone(&tz).format("%d.%m.%Y"), ALL_DAY)
        }
        (Some(start), Some(end)) => format!("{} - {}", local_stamp(start, tz), local_stamp(end, tz)),
        _ => format!("{} - {}", event.start, event.end),
    }
}

/// "• Gefierer (HLF 21): Pneuwiessel 03.03.2025 - Ganzen Daag"
pub fn upcoming_line(event: &CalendarEvent, tz: Tz) -> String {
    let vehicle = match (&event.vehicle, event.calendar_type) {
        (Some(v), CalendarType::Vehicles) => format!(" ({})", v),
        _ => String::new(),
    };
    format!(
        "• {}{}: {} {}",
        event.calendar_type,
        vehicle,
        event.title,
        event_span(event, tz)
    )
}

/// Detail lines for the numbered event list.
pub fn event_details(index: usize, event: &CalendarEvent, tz: Tz) -> Vec<String> {
    let mut lines = vec![format!("[{}] {} ({})", index, event.title, event.calendar_type)];
    if !event.description.trim().is_empty() {
        lines.push(format!("    Beschreiwung: {}", event.description.trim()));
    }
    lines.push(format!("    {}", event_span(event, tz)));
    if let Some(vehicle) = &event.vehicle {
        lines.push(format!("    Gefier: {}", vehicle));
    }
    lines
}

/// One line per event for the calendar view: color, span and title.
pub fn calendar_line(event: &CalendarEvent, tz: Tz) -> String {
    format!("{} {}  {}", event.color, event_span(event, tz), event_title(event))
}

// ---------------------------------------------------------------------------
// Journal and to-do
// ---------------------------------------------------------------------------

pub fn todo_lines(items: &[ChecklistItem]) -> Vec<String> {
    if items.is_empty() {
        return vec![NO_TODO.to_string()];
    }
    items.iter().map(|i| format!("• {}", i.text)).collect()
}

/// "Sean - 03.03.2025 14:05" followed by the content. Unreadable dates are
/// shown as stored.
pub fn journal_lines(entry: &JournalEntry, tz: Tz) -> Vec<String> {
    let when = parse_local(&entry.datetime, tz)
        .map(|at| local_stamp(at, tz))
        .unwrap_or_else(|| entry.datetime.clone());
    vec![
        format!("{} - {}  [{}]", entry.user, when, entry.id),
        format!("  {}", entry.content),
    ]
}

// ---------------------------------------------------------------------------
// Weather and water
// ---------------------------------------------------------------------------

pub fn weather_lines(city: &str, report: &WeatherReport, tz: Tz) -> Vec<String> {
    vec![
        format!("🌤️ D'Wieder zu {}", city),
        format!("Temperatur: {}C°", report.temperature_c),
        format!("Fiichtegkeet: {}%", report.humidity_pct),
        format!("Loftdrock: {} hPa", report.pressure_hpa),
        format!("Wand: {} m/s", report.wind_speed_ms),
        format!("Sonnenopgang: {}", local_clock(report.sunrise, tz)),
        format!("Sonnenënnergang: {}", local_clock(report.sunset, tz)),
    ]
}

fn cm(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{}", v))
}

pub fn gauge_lines(panel: &GaugePanel, tz: Tz) -> Vec<String> {
    let mut lines = vec![format!("📍 {}", panel.name)];
    let report = match &panel.report {
        Ok(report) => report,
        Err(e) => {
            lines.push(format!(
                "❌ Feeler beim lueden vun den Donnéeën (ID {}): {}",
                panel.station_id, e
            ));
            return lines;
        }
    };

    if report.reading_count == 0 {
        lines.push(format!("⚠️ {}", NO_GAUGE_DATA));
        return lines;
    }

    let c = &report.classification;
    let level = match (c.value, c.timestamp) {
        (Some(v), Some(at)) => format!("{:.1} cm  🕒 {}", v, local_stamp(at, tz)),
        _ => String::new(),
    };
    lines.push(match c.tier {
        LevelTier::Alert => format!("🚨 ALARM! Aktuellen Waasserstand: {}", level),
        LevelTier::PreAlert => format!("⚠️ Virwarnung: Aktuellen Waasserstand: {}", level),
        LevelTier::Normal => format!("Aktuellen Waasserstand (cm): {}", level),
        LevelTier::NoData => format!("ℹ️ {}", NO_RECENT_READING),
    });

    let t = &report.thresholds;
    if t.pre_alert.is_some() || t.alert.is_some() {
        lines.push(format!(
            "⚠️ Virwarnniveau: {} cm    🚨 Alarmniveau: {} cm",
            cm(t.pre_alert),
            cm(t.alert)
        ));
    }
    lines
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

pub fn render_dashboard(snapshot: &DashboardSnapshot) -> String {
    let tz = snapshot.tz;
    let mut lines = vec![
        snapshot.station_name.clone(),
        format!("🕒 {}", date_header(snapshot.generated_at, tz)),
        String::new(),
    ];

    for panel in &snapshot.vehicles {
        lines.extend(vehicle_block(panel));
        lines.push(String::new());
    }

    lines.push("Kalenner Entrée".to_string());
    if snapshot.upcoming.is_empty() {
        lines.push(NO_UPCOMING_EVENTS.to_string());
    } else {
        lines.extend(snapshot.upcoming.iter().map(|e| upcoming_line(e, tz)));
    }
    lines.push(String::new());

    lines.push("To do:".to_string());
    lines.extend(todo_lines(&snapshot.checklist));
    lines.push(String::new());

    match &snapshot.weather {
        Ok(report) => lines.extend(weather_lines(&snapshot.weather_city, report, tz)),
        Err(e) => lines.push(format!("❌ Konnt d'Wiederinformatioun net lueden: {}", e)),
    }

    lines.join("\n")
}

pub fn render_water_page(page: &WaterPage) -> String {
    let mut lines = vec![
        "🌊 Waasserstänn (Live)".to_string(),
        format!("🕒 {}", date_header(page.generated_at, page.tz)),
    ];
    for gauge in &page.gauges {
        lines.push(String::new());
        lines.extend(gauge_lines(gauge, page.tz));
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
