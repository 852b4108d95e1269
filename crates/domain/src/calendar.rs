//! Calendar events and the daily agenda shown on the device.
//!
//! Times are local wall-clock times without an offset. On the wire they are
//! `YYYY-MM-DDTHH:MM`; a bare `YYYY-MM-DD` is accepted and means midnight.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::CalendarEventId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: CalendarEventId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "event_time")]
    pub start: NaiveDateTime,
    #[serde(with = "event_time")]
    pub end: NaiveDateTime,
    #[serde(default, alias = "allDay")]
    pub all_day: bool,
}

impl CalendarEvent {
    /// An event that starts and ends at `at`.
    #[must_use]
    pub fn point(name: impl Into<String>, description: Option<String>, at: NaiveDateTime) -> Self {
        Self {
            id: CalendarEventId::new(),
            name: name.into(),
            description,
            start: at,
            end: at,
            all_day: false,
        }
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCalendarEvent`] for a blank name or
    /// an event ending before it starts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::InvalidCalendarEvent("name must not be empty"));
        }
        if self.start > self.end {
            return Err(ValidationError::InvalidCalendarEvent(
                "start must not be after end",
            ));
        }
        Ok(())
    }

    /// Whether the event touches any day in `from..=to`.
    #[must_use]
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start.date() <= to && self.end.date() >= from
    }

    #[must_use]
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.overlaps(day, day)
    }
}

/// One line of the daily agenda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgendaEntry {
    /// `HH:MM` start time; `00:00` for all-day events.
    pub time: String,
    pub event: String,
}

/// Agenda of `day`, as rendered on the device's e-ink screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Agenda {
    pub events: Vec<AgendaEntry>,
}

/// Build the agenda of `day` from `events`, ordered by start time.
#[must_use]
pub fn agenda_for<'a>(events: impl IntoIterator<Item = &'a CalendarEvent>, day: NaiveDate) -> Agenda {
    let mut entries: Vec<AgendaEntry> = events
        .into_iter()
        .filter(|event| event.covers(day))
        .map(|event| AgendaEntry {
            time: if event.all_day {
                "00:00".to_string()
            } else {
                event.start.format("%H:%M").to_string()
            },
            event: event.name.clone(),
        })
        .collect();
    entries.sort_by(|a, b| a.time.cmp(&b.time));
    Agenda { events: entries }
}

/// Parse a client-supplied date or date-time.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]` and ISO strings with a
/// fractional part or trailing `Z`, which are dropped.
#[must_use]
pub fn parse_event_time(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    let trimmed = trimmed.split('.').next().unwrap_or(trimmed);
    let trimmed = trimmed.trim_end_matches('Z');
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .ok()
}

pub(crate) mod event_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_event_time(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid event time {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, day).unwrap()
    }

    #[test]
    fn should_accept_date_and_datetime_strings() {
        let event: CalendarEvent = serde_json::from_value(json!({
            "name": "Trip",
            "start": "2025-05-01",
            "end": "2025-05-03T18:30",
            "allDay": true
        }))
        .unwrap();
        assert_eq!(event.start, at(1, 0, 0));
        assert_eq!(event.end, at(3, 18, 30));
        assert!(event.all_day);

        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["start"], "2025-05-01T00:00");
        assert_eq!(back["all_day"], true);
    }

    #[test]
    fn should_parse_iso_query_values() {
        assert_eq!(parse_event_time("2025-05-02T10:15:00.000Z"), Some(at(2, 10, 15)));
        assert_eq!(parse_event_time("2025-05-02"), Some(at(2, 0, 0)));
        assert_eq!(parse_event_time("yesterday"), None);
    }

    #[test]
    fn should_reject_blank_name_and_inverted_range() {
        let mut event = CalendarEvent::point("  ", None, at(1, 9, 0));
        assert!(event.validate().is_err());
        event.name = "Call".to_string();
        assert!(event.validate().is_ok());
        event.end = at(1, 8, 0);
        assert!(event.validate().is_err());
    }

    #[test]
    fn should_detect_overlap_by_day() {
        let mut event = CalendarEvent::point("Trip", None, at(2, 9, 0));
        event.end = at(4, 9, 0);
        assert!(event.overlaps(date(1), date(2)));
        assert!(event.overlaps(date(4), date(10)));
        assert!(!event.overlaps(date(5), date(6)));
    }

    #[test]
    fn should_build_sorted_agenda_for_day() {
        let mut all_day = CalendarEvent::point("Holiday", None, at(2, 0, 0));
        all_day.all_day = true;
        let events = vec![
            CalendarEvent::point("Lunch", None, at(2, 12, 30)),
            CalendarEvent::point("Tomorrow", None, at(3, 8, 0)),
            CalendarEvent::point("Stand-up", None, at(2, 9, 15)),
            all_day,
        ];
        let agenda = agenda_for(&events, date(2));
        let lines: Vec<(&str, &str)> = agenda
            .events
            .iter()
            .map(|e| (e.time.as_str(), e.event.as_str()))
            .collect();
        assert_eq!(
            lines,
            vec![("00:00", "Holiday"), ("09:15", "Stand-up"), ("12:30", "Lunch")]
        );
    }
}
