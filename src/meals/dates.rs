//! Calendar-date handling for meal plans.
//!
//! The backend stores `planned_date` either as a plain date or as a date-time.
//! Only the literal `YYYY-MM-DD` prefix is meaningful; offsets are never applied,
//! so a dinner at 23:30 -05:00 stays on the day it was planned for.

use serde::{Deserialize, Deserializer, Serializer};
use time::{macros::format_description, Date};

pub fn parse_calendar_date(raw: &str) -> Result<Date, String> {
    let trimmed = raw.trim();
    let day = trimmed
        .get(..10)
        .ok_or_else(|| format!("not a calendar date: {raw:?}"))?;
    if let Some(sep) = trimmed.as_bytes().get(10) {
        if *sep != b'T' && *sep != b't' && *sep != b' ' {
            return Err(format!("not a calendar date: {raw:?}"));
        }
    }
    Date::parse(day, format_description!("[year]-[month]-[day]"))
        .map_err(|e| format!("not a calendar date: {raw:?} ({e})"))
}

/// `YYYY-MM-DD`, the key used by the planner grouping.
pub fn date_key(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Serde adapter: reads a date or date-time, writes `YYYY-MM-DD`.
pub mod calendar_date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date_key(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(d)?;
        parse_calendar_date(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for generation requests: writes local midnight of the day
/// (`YYYY-MM-DDT00:00:00`), reads anything `calendar_date` accepts.
pub mod start_of_day {
    use super::*;

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("{}T00:00:00", date_key(*date)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        calendar_date::deserialize(d)
    }
}
