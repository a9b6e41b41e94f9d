//! Event dates and times as organisers type them.
//!
//! Dates are `YYYY-MM-DD` and must exist on the calendar. Times are
//! 12-hour clock strings such as `7:00 PM` or `07:30pm`.

use core::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid regex"));

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(0?[1-9]|1[0-2]):([0-5]\d)\s?(AM|PM)$").expect("Invalid regex")
});

/// Errors produced when parsing event schedules.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The date is not in `YYYY-MM-DD` form.
    #[error("date must be formatted as YYYY-MM-DD (got {0:?})")]
    DateFormat(String),
    /// The date is well-formed but does not exist (e.g. `2024-13-40`).
    #[error("date does not exist: {0}")]
    DateOutOfRange(String),
    /// The time is not in `h:mm AM|PM` form.
    #[error("time must be formatted like 7:00 PM (got {0:?})")]
    TimeFormat(String),
}

/// A calendar date for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
pub struct EventDate(NaiveDate);

impl EventDate {
    /// Parse a `YYYY-MM-DD` date.
    ///
    /// # Errors
    ///
    /// Returns `DateFormat` for anything that does not match the pattern and
    /// `DateOutOfRange` for impossible dates.
    pub fn parse(s: &str) -> Result<Self, ScheduleError> {
        let s = s.trim();
        if !DATE_RE.is_match(s) {
            return Err(ScheduleError::DateFormat(s.to_owned()));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ScheduleError::DateOutOfRange(s.to_owned()))
    }

    /// The underlying date.
    #[must_use]
    pub const fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for EventDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl TryFrom<String> for EventDate {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EventDate> for String {
    fn from(date: EventDate) -> Self {
        date.to_string()
    }
}

/// A wall-clock start time for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
pub struct EventTime(NaiveTime);

impl EventTime {
    /// Parse a 12-hour clock time such as `7:00 PM`.
    ///
    /// # Errors
    ///
    /// Returns `TimeFormat` if the input does not match `h:mm AM|PM`.
    pub fn parse(s: &str) -> Result<Self, ScheduleError> {
        let s = s.trim();
        let format_err = || ScheduleError::TimeFormat(s.to_owned());

        let caps = TIME_RE.captures(s).ok_or_else(format_err)?;
        let hour: u32 = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(format_err)?;
        let minute: u32 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(format_err)?;
        let pm = caps
            .get(3)
            .is_some_and(|m| m.as_str().eq_ignore_ascii_case("PM"));

        let hour24 = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, false) => h,
            (h, true) => h + 12,
        };

        NaiveTime::from_hms_opt(hour24, minute, 0)
            .map(Self)
            .ok_or_else(format_err)
    }

    /// The underlying time.
    #[must_use]
    pub const fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for EventTime {
    fn from(time: NaiveTime) -> Self {
        Self(time)
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%-I:%M %p"))
    }
}

impl TryFrom<String> for EventTime {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EventTime> for String {
    fn from(time: EventTime) -> Self {
        time.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_date() {
        let date = EventDate::parse("2024-06-15").unwrap();
        assert_eq!(date.to_string(), "2024-06-15");
    }

    #[test]
    fn test_impossible_date_is_rejected() {
        assert_eq!(
            EventDate::parse("2024-13-40"),
            Err(ScheduleError::DateOutOfRange("2024-13-40".to_owned()))
        );
        assert!(EventDate::parse("2023-02-29").is_err());
        assert!(EventDate::parse("2024-02-29").is_ok());
    }

    #[test]
    fn test_badly_shaped_date_is_rejected() {
        for input in ["15/06/2024", "2024-6-15", "2024-06-15T10:00", ""] {
            assert!(
                matches!(EventDate::parse(input), Err(ScheduleError::DateFormat(_))),
                "{input} should be a format error"
            );
        }
    }

    #[test]
    fn test_twelve_hour_times() {
        assert_eq!(EventTime::parse("7:00 PM").unwrap().to_string(), "7:00 PM");
        assert_eq!(EventTime::parse("07:30pm").unwrap().to_string(), "7:30 PM");
        assert_eq!(
            EventTime::parse("12:15 AM").unwrap().as_naive(),
            NaiveTime::from_hms_opt(0, 15, 0).unwrap()
        );
        assert_eq!(
            EventTime::parse("12:00 PM").unwrap().as_naive(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_bad_times() {
        for input in ["19:00", "13:00 PM", "7 PM", "7:60 AM", "0:30 AM"] {
            assert!(EventTime::parse(input).is_err(), "{input} should fail");
        }
    }

    #[test]
    fn test_serde_uses_display_form() {
        let time = EventTime::parse("9:05 am").unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"9:05 AM\"");
        let back: EventTime = serde_json::from_str("\"9:05 AM\"").unwrap();
        assert_eq!(back, time);
    }
}
