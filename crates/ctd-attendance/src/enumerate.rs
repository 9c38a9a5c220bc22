use chrono::NaiveDate;
use tracing::warn;

use crate::schedule::Schedule;

/// A calendar date on which a course session is scheduled
pub type SessionDate = NaiveDate;

/// Every scheduled session date from the schedule's start through `today`,
/// inclusive, in ascending order.
///
/// A start date after `today` yields no sessions.
pub fn enumerate(schedule: &Schedule, today: NaiveDate) -> Vec<SessionDate> {
    schedule
        .start_date()
        .iter_days()
        .take_while(|day| *day <= today)
        .filter(|day| schedule.includes(*day))
        .collect()
}

/// Enumerate straight from the raw course fields.
///
/// Missing days, a missing start date or an unparseable start date all
/// yield an empty list; the reason is logged.
pub fn enumerate_raw<S: AsRef<str>>(
    days: Option<&[S]>,
    start_date: Option<&str>,
    today: NaiveDate,
) -> Vec<SessionDate> {
    match Schedule::from_raw(days, start_date) {
        Ok(schedule) => enumerate(&schedule, today),
        Err(e) => {
            warn!(error = %e, start_date = ?start_date, "Unknown schedule, no sessions");
            Vec::new()
        }
    }
}
