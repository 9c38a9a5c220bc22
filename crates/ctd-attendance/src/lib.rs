//! # ctd-attendance
//!
//! Attendance reconciliation for CTD courses.
//!
//! A course meets on a fixed set of weekdays starting from some date. This
//! crate turns that weekly pattern into the concrete list of session dates
//! that have happened so far, then checks each one against the attendance
//! records the backend returned for the signed-in student.
//!
//! ## Key Types
//!
//! - [`Schedule`] - Validated weekly schedule (weekdays + start date)
//! - [`WeekdayCode`] - Three-letter weekday code as sent by the backend
//! - [`AttendanceRecord`] - One "marked present" event
//! - [`AttendanceStatus`] - Per-session attended flag
//! - [`AttendanceSummary`] - Attended / total counts for display
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chrono::NaiveDate;
//! use ctd_attendance::{enumerate_raw, match_attendance};
//!
//! let days = vec!["Mon".to_string(), "Wed".to_string()];
//! let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//!
//! let sessions = enumerate_raw(Some(days.as_slice()), Some("2024-01-01"), today);
//! let statuses = match_attendance(&sessions, &records, "Algo101");
//! ```
//!
//! ## Malformed schedules
//!
//! A schedule with no usable weekdays or no parseable start date yields no
//! sessions instead of an error, so a course view degrades to "no sessions"
//! rather than failing.

mod enumerate;
mod matcher;
mod schedule;

pub use enumerate::{enumerate, enumerate_raw, SessionDate};
pub use matcher::{
    match_attendance, match_attendance_in, AttendanceRecord, AttendanceStatus, AttendanceSummary,
};
pub use schedule::{parse_start_date, Schedule, ScheduleError, WeekdayCode};
