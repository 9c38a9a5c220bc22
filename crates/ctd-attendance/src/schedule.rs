use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Schedule has no recognized days")]
    MissingDays,

    #[error("Schedule has no start date")]
    MissingStartDate,

    #[error("Invalid start date: {0}")]
    InvalidStartDate(String),

    #[error("Unknown weekday code: {0}")]
    UnknownWeekday(String),
}

/// Three-letter weekday code, as the backend spells it ("Mon" .. "Sun")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeekdayCode {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl WeekdayCode {
    pub const ALL: [WeekdayCode; 7] = [
        WeekdayCode::Mon,
        WeekdayCode::Tue,
        WeekdayCode::Wed,
        WeekdayCode::Thu,
        WeekdayCode::Fri,
        WeekdayCode::Sat,
        WeekdayCode::Sun,
    ];

    /// Weekday code of a calendar date
    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeekdayCode::Mon => "Mon",
            WeekdayCode::Tue => "Tue",
            WeekdayCode::Wed => "Wed",
            WeekdayCode::Thu => "Thu",
            WeekdayCode::Fri => "Fri",
            WeekdayCode::Sat => "Sat",
            WeekdayCode::Sun => "Sun",
        }
    }
}

impl From<Weekday> for WeekdayCode {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => WeekdayCode::Mon,
            Weekday::Tue => WeekdayCode::Tue,
            Weekday::Wed => WeekdayCode::Wed,
            Weekday::Thu => WeekdayCode::Thu,
            Weekday::Fri => WeekdayCode::Fri,
            Weekday::Sat => WeekdayCode::Sat,
            Weekday::Sun => WeekdayCode::Sun,
        }
    }
}

impl fmt::Display for WeekdayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekdayCode {
    type Err = ScheduleError;

    // Case-sensitive: the backend always sends "Mon", never "mon" or "MON".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeekdayCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| ScheduleError::UnknownWeekday(s.to_string()))
    }
}

/// Weekly recurrence pattern of a course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    days: BTreeSet<WeekdayCode>,
    start_date: NaiveDate,
}

impl Schedule {
    pub fn new(
        days: impl IntoIterator<Item = WeekdayCode>,
        start_date: NaiveDate,
    ) -> Result<Self, ScheduleError> {
        let days: BTreeSet<WeekdayCode> = days.into_iter().collect();
        if days.is_empty() {
            return Err(ScheduleError::MissingDays);
        }
        Ok(Self { days, start_date })
    }

    /// Build a schedule from the raw fields of a course payload.
    ///
    /// Unknown weekday codes are dropped (they could never match a date).
    /// The schedule is rejected only when nothing usable is left.
    pub fn from_raw<S: AsRef<str>>(
        days: Option<&[S]>,
        start_date: Option<&str>,
    ) -> Result<Self, ScheduleError> {
        let raw_days = days.ok_or(ScheduleError::MissingDays)?;

        let mut parsed = Vec::with_capacity(raw_days.len());
        for raw in raw_days {
            match raw.as_ref().trim().parse::<WeekdayCode>() {
                Ok(code) => parsed.push(code),
                Err(e) => warn!(error = %e, "Ignoring schedule day"),
            }
        }

        let start_date = start_date
            .filter(|s| !s.trim().is_empty())
            .ok_or(ScheduleError::MissingStartDate)?;
        let start_date = parse_start_date(start_date)?;

        Self::new(parsed, start_date)
    }

    pub fn days(&self) -> &BTreeSet<WeekdayCode> {
        &self.days
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Whether a session is scheduled on this date's weekday
    pub fn includes(&self, date: NaiveDate) -> bool {
        self.days.contains(&WeekdayCode::of(date))
    }
}

/// Parse an ISO-like start date.
///
/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp (the date in the timestamp's
/// own offset is used), or a zone-less `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_start_date(raw: &str) -> Result<NaiveDate, ScheduleError> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }

    Err(ScheduleError::InvalidStartDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekday_code_of_date() {
        assert_eq!(WeekdayCode::of(date(2024, 1, 1)), WeekdayCode::Mon);
        assert_eq!(WeekdayCode::of(date(2024, 1, 7)), WeekdayCode::Sun);
    }

    #[test]
    fn test_weekday_code_parse_is_case_sensitive() {
        assert_eq!("Wed".parse::<WeekdayCode>().unwrap(), WeekdayCode::Wed);
        assert!("wed".parse::<WeekdayCode>().is_err());
        assert!("Wednesday".parse::<WeekdayCode>().is_err());
    }

    #[test]
    fn test_parse_start_date_formats() {
        assert_eq!(parse_start_date("2024-01-01").unwrap(), date(2024, 1, 1));
        assert_eq!(
            parse_start_date("2024-01-01T00:00:00Z").unwrap(),
            date(2024, 1, 1)
        );
        assert_eq!(
            parse_start_date("2024-01-01T08:30:00").unwrap(),
            date(2024, 1, 1)
        );
        assert!(matches!(
            parse_start_date("next monday"),
            Err(ScheduleError::InvalidStartDate(_))
        ));
    }

    #[test]
    fn test_from_raw_drops_unknown_days() {
        let days = vec!["Mon", "Funday"];
        let schedule = Schedule::from_raw(Some(days.as_slice()), Some("2024-01-01")).unwrap();
        assert_eq!(schedule.days().len(), 1);
        assert!(schedule.includes(date(2024, 1, 8)));
    }

    #[test]
    fn test_from_raw_all_days_unknown() {
        let days = vec!["Funday", "mon"];
        assert_eq!(
            Schedule::from_raw(Some(days.as_slice()), Some("2024-01-01")),
            Err(ScheduleError::MissingDays)
        );
    }

    #[test]
    fn test_from_raw_rejects_missing_fields() {
        let days = vec!["Mon"];
        let none: Option<&[&str]> = None;
        let empty: Vec<&str> = Vec::new();

        assert_eq!(
            Schedule::from_raw(none, Some("2024-01-01")),
            Err(ScheduleError::MissingDays)
        );
        assert_eq!(
            Schedule::from_raw(Some(empty.as_slice()), Some("2024-01-01")),
            Err(ScheduleError::MissingDays)
        );
        assert_eq!(
            Schedule::from_raw(Some(days.as_slice()), None),
            Err(ScheduleError::MissingStartDate)
        );
        assert_eq!(
            Schedule::from_raw(Some(days.as_slice()), Some("  ")),
            Err(ScheduleError::MissingStartDate)
        );
    }
}
