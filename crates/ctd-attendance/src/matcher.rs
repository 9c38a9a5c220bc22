use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::enumerate::SessionDate;

/// A "marked present" event reported by the attendance service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub course_name: String,
    pub marked_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn new(course_name: impl Into<String>, marked_at: DateTime<Utc>) -> Self {
        Self {
            course_name: course_name.into(),
            marked_at,
        }
    }

    /// Calendar day the record was marked on, as seen from `tz`
    pub fn marked_on<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.marked_at.with_timezone(tz).date_naive()
    }
}

/// Whether the student attended one scheduled session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStatus {
    pub session_date: SessionDate,
    pub attended: bool,
}

/// Classify each session as attended or not, truncating timestamps in UTC.
pub fn match_attendance(
    sessions: &[SessionDate],
    records: &[AttendanceRecord],
    course_name: &str,
) -> Vec<AttendanceStatus> {
    match_attendance_in(sessions, records, course_name, &Utc)
}

/// Classify each session as attended or not.
///
/// Only records whose course name equals `course_name` exactly are
/// considered. The output has one entry per session, in input order.
pub fn match_attendance_in<Tz: TimeZone>(
    sessions: &[SessionDate],
    records: &[AttendanceRecord],
    course_name: &str,
    tz: &Tz,
) -> Vec<AttendanceStatus> {
    let marked_days: HashSet<NaiveDate> = records
        .iter()
        .filter(|r| r.course_name == course_name)
        .map(|r| r.marked_on(tz))
        .collect();

    sessions
        .iter()
        .map(|&session_date| AttendanceStatus {
            session_date,
            attended: marked_days.contains(&session_date),
        })
        .collect()
}

/// Attended / total counts over a list of statuses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub attended: usize,
    pub total: usize,
}

impl AttendanceSummary {
    pub fn from_statuses(statuses: &[AttendanceStatus]) -> Self {
        Self {
            attended: statuses.iter().filter(|s| s.attended).count(),
            total: statuses.len(),
        }
    }

    pub fn missed(&self) -> usize {
        self.total.saturating_sub(self.attended)
    }

    /// Attendance percentage, or `None` when no sessions have happened yet
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.attended as f64 * 100.0 / self.total as f64)
        }
    }
}
