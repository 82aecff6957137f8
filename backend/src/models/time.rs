//! Calendar-day handling for reservations and availability windows.
//!
//! Every booking is stored as a pair of calendar days. Requests may carry a
//! plain `YYYY-MM-DD` date or a full RFC 3339 timestamp; timestamps are
//! normalized to the UTC day they fall on.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Format used for day strings in responses and booked-date sets.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Inclusive range of calendar days `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(rename = "startDate")]
    pub start: NaiveDate,
    #[serde(rename = "endDate")]
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of nights between start and end (end day not counted).
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// A booking must start strictly before it ends.
    pub fn is_ordered(&self) -> bool {
        self.start < self.end
    }

    /// Iterate over every day in the range, both ends included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

/// Render a day as `YYYY-MM-DD`.
pub fn day_string(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parse a request date: `YYYY-MM-DD` or RFC 3339, truncated to the UTC day.
pub fn parse_calendar_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, DAY_FORMAT) {
        return Some(day);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

/// First day of the month containing `day`.
pub fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Last day of the month containing `day`.
pub fn last_of_month(day: NaiveDate) -> NaiveDate {
    let (year, month) = if day.month() == 12 {
        (day.year() + 1, 1)
    } else {
        (day.year(), day.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(day)
}

/// Parse a `YYYY-MM` month selector into its first day.
pub fn parse_month(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), DAY_FORMAT).ok()
}

/// Serde helper accepting either date form for a required field.
pub fn deserialize_calendar_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_day(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("\"{raw}\" must be a valid date")))
}
