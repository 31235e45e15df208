//! Calendar event aggregation and text search.
//!
//! `upcoming_events` feeds the dashboard's calendar panel; `search` is shared
//! by the journal page and the event list.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::clock::parse_local;
use crate::model::{CalendarEvent, CalendarType, JournalEntry};

// ---------------------------------------------------------------------------
// Upcoming events
// ---------------------------------------------------------------------------

/// Events of an allowed type starting at or after `since`, earliest first.
///
/// The sort is stable, so events with the same start keep their file order.
/// Events whose start cannot be parsed are left out.
pub fn upcoming_events<'a>(
    events: &'a [CalendarEvent],
    allowed_types: &HashSet<CalendarType>,
    since: DateTime<Utc>,
    tz: Tz,
) -> Vec<&'a CalendarEvent> {
    let mut upcoming: Vec<(DateTime<Utc>, &CalendarEvent)> = events
        .iter()
        .filter(|e| allowed_types.contains(&e.calendar_type))
        .filter_map(|e| parse_local(&e.start, tz).map(|start| (start, e)))
        .filter(|(start, _)| *start >= since)
        .collect();

    upcoming.sort_by_key(|(start, _)| *start);
    upcoming.into_iter().map(|(_, e)| e).collect()
}

/// Events whose type is among `selected`, in file order. Used by the visual
/// calendar's type picker.
pub fn filter_by_types<'a>(
    events: &'a [CalendarEvent],
    selected: &HashSet<CalendarType>,
) -> Vec<&'a CalendarEvent> {
    events
        .iter()
        .filter(|e| selected.contains(&e.calendar_type))
        .collect()
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Something with an author-ish and a body-ish text field.
pub trait Searchable {
    fn author(&self) -> &str;
    fn body(&self) -> &str;
}

impl Searchable for JournalEntry {
    fn author(&self) -> &str {
        &self.user
    }

    fn body(&self) -> &str {
        &self.content
    }
}

impl Searchable for CalendarEvent {
    fn author(&self) -> &str {
        &self.title
    }

    fn body(&self) -> &str {
        &self.description
    }
}

/// Case-insensitive substring search over author and body.
/// A blank search string keeps everything; otherwise the text is matched as
/// given, surrounding spaces included.
pub fn search<'a, T, I>(items: I, text: &str) -> Vec<&'a T>
where
    T: Searchable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let keep_all = text.trim().is_empty();
    let needle = text.to_lowercase();
    items
        .into_iter()
        .filter(|item| {
            keep_all
                || item.author().to_lowercase().contains(&needle)
                || item.body().to_lowercase().contains(&needle)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::STATION_TZ;
    use chrono::TimeZone;

    fn event(title: &str, calendar_type: CalendarType, start: &str) -> CalendarEvent {
        CalendarEvent {
            title: title.to_string(),
            description: String::new(),
            start: start.to_string(),
            end: start.to_string(),
            calendar_type,
            color: calendar_type.color().to_string(),
            all_day: false,
            vehicle: None,
        }
    }

    fn types(list: &[CalendarType]) -> HashSet<CalendarType> {
        list.iter().copied().collect()
    }

    fn titles(events: &[&CalendarEvent]) -> Vec<String> {
        events.iter().map(|e| e.title.clone()).collect()
    }

    #[test]
    fn test_type_and_start_filters_combine() {
        let events = vec![
            event("old truck check", CalendarType::Vehicles, "2024-04-01T10:00:00"),
            event("new truck check", CalendarType::Vehicles, "2024-05-10T10:00:00"),
            event("personal", CalendarType::Personal, "2024-05-10T10:00:00"),
        ];
        let since = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let result = upcoming_events(&events, &types(&[CalendarType::Vehicles]), since, STATION_TZ);
        assert_eq!(titles(&result), vec!["new truck check"]);
    }

    #[test]
    fn test_since_is_inclusive() {
        let events = vec![event("exact", CalendarType::Building, "2024-05-01T02:00:00")];
        // 02:00 CEST == 00:00 UTC
        let since = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let result = upcoming_events(&events, &types(&[CalendarType::Building]), since, STATION_TZ);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_output_sorted_by_start_and_stable() {
        let events = vec![
            event("c", CalendarType::Shared, "2024-06-03T09:00:00"),
            event("a1", CalendarType::Shared, "2024-06-01T09:00:00"),
            event("b", CalendarType::Building, "2024-06-02T09:00:00"),
            event("a2", CalendarType::Building, "2024-06-01T09:00:00"),
        ];
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let allowed = types(&[CalendarType::Shared, CalendarType::Building]);
        let result = upcoming_events(&events, &allowed, since, STATION_TZ);
        assert_eq!(titles(&result), vec!["a1", "a2", "b", "c"]);
    }

    #[test]
    fn test_unparseable_start_is_dropped() {
        let events = vec![
            event("broken", CalendarType::Shared, "sometime"),
            event("fine", CalendarType::Shared, "2024-06-01"),
        ];
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let result = upcoming_events(&events, &types(&[CalendarType::Shared]), since, STATION_TZ);
        assert_eq!(titles(&result), vec!["fine"]);
    }

    #[test]
    fn test_empty_allowed_set_yields_nothing() {
        let events = vec![event("x", CalendarType::Shared, "2030-01-01")];
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(upcoming_events(&events, &HashSet::new(), since, STATION_TZ).is_empty());
    }

    #[test]
    fn test_filter_by_types_keeps_file_order() {
        let events = vec![
            event("2", CalendarType::Pp, "2024-06-02"),
            event("skip", CalendarType::Pv, "2024-06-01"),
            event("1", CalendarType::Pp, "2024-06-01"),
        ];
        let result = filter_by_types(&events, &types(&[CalendarType::Pp]));
        assert_eq!(titles(&result), vec!["2", "1"]);
    }

    fn entry(user: &str, content: &str) -> JournalEntry {
        JournalEntry {
            id: String::new(),
            user: user.to_string(),
            content: content.to_string(),
            datetime: "2024-05-01T08:00:00".to_string(),
        }
    }

    #[test]
    fn test_search_matches_user_or_content_case_insensitively() {
        let entries = vec![
            entry("Sean", "Schlauch gewiesselt"),
            entry("Anna", "Pompel gepréift"),
            entry("Marc", "Sean huet gehollef"),
        ];
        let hits = search(&entries, "SEAN");
        assert_eq!(hits.len(), 2);
        let hits = search(&entries, "pompel");
        assert_eq!(hits[0].user, "Anna");
    }

    #[test]
    fn test_empty_search_is_noop() {
        let entries = vec![entry("Sean", "a"), entry("Anna", "b")];
        assert_eq!(search(&entries, "").len(), 2);
        assert_eq!(search(&entries, "   ").len(), 2);
    }

    #[test]
    fn test_search_text_is_not_trimmed() {
        let entries = vec![entry("Sean", "Schlauch gewiesselt"), entry("Anna", "Pompel")];
        assert_eq!(search(&entries, "Schlauch ").len(), 1);
        assert!(search(&entries, " Pompel").is_empty());
        assert!(search(&entries, "sean ").is_empty());
    }

    #[test]
    fn test_search_over_events_uses_title_and_description() {
        let mut with_desc = event("Iwwung", CalendarType::Shared, "2024-06-01");
        with_desc.description = "Atemschutz am Keller".to_string();
        let events = vec![with_desc, event("Reunioun", CalendarType::Shared, "2024-06-02")];
        assert_eq!(search(&events, "atemschutz").len(), 1);
        assert_eq!(search(&events, "reunioun").len(), 1);
    }
}
