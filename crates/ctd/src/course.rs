//! Course dashboard and attendance grid.

use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeZone};
use colored::Colorize;
use serde::Serialize;
use tracing::{debug, error};

use ctd_attendance::{match_attendance_in, AttendanceRecord, AttendanceStatus, AttendanceSummary};
use ctd_client::{Course, PortalApi};

/// Per-session attendance for one course
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceView {
    pub course_name: String,
    pub statuses: Vec<AttendanceStatus>,
    pub summary: AttendanceSummary,
}

impl AttendanceView {
    /// Reconcile the course schedule against `records`, truncating
    /// timestamps to calendar days in `tz`.
    pub fn build<Tz: TimeZone>(
        course: &Course,
        records: &[AttendanceRecord],
        today: NaiveDate,
        tz: &Tz,
    ) -> Self {
        let sessions = course.session_dates(today);
        let statuses = match_attendance_in(&sessions, records, &course.name, tz);
        let summary = AttendanceSummary::from_statuses(&statuses);
        debug!(
            course = %course.name,
            sessions = summary.total,
            attended = summary.attended,
            "Reconciled attendance"
        );
        Self {
            course_name: course.name.clone(),
            statuses,
            summary,
        }
    }

    /// Fetch the student's records and reconcile. A failed fetch is logged
    /// and treated as "no records".
    pub async fn load<Tz: TimeZone>(
        api: &dyn PortalApi,
        course: &Course,
        today: NaiveDate,
        tz: &Tz,
    ) -> Self {
        let records = match api.recent_attendance().await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, course = %course.name, "Failed to fetch attendance");
                Vec::new()
            }
        };
        Self::build(course, &records, today, tz)
    }

    pub fn render(&self) -> String {
        let mut out = format!("{}\n", "Attendance".bold());

        if self.statuses.is_empty() {
            out.push_str(&format!("  {}\n", "No sessions scheduled".dimmed()));
            return out;
        }

        for status in &self.statuses {
            let mark = if status.attended {
                "✓".green()
            } else {
                "✗".red()
            };
            out.push_str(&format!(
                "  {}  {}  {}\n",
                status.session_date.format("%Y-%m-%d"),
                status.session_date.format("%a"),
                mark
            ));
        }

        let percent = self.summary.percentage().unwrap_or(0.0);
        out.push_str(&format!(
            "\nAttended {} of {} sessions ({:.0}%)\n",
            self.summary.attended, self.summary.total, percent
        ));
        out
    }
}

/// What the course page shows, depending on enrollment
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum CourseView {
    Enrolled {
        course: Course,
        attendance: AttendanceView,
    },
    NotEnrolled {
        course: Course,
    },
}

impl CourseView {
    pub fn course(&self) -> &Course {
        match self {
            CourseView::Enrolled { course, .. } | CourseView::NotEnrolled { course } => course,
        }
    }

    pub fn render(&self) -> String {
        match self {
            CourseView::Enrolled { course, attendance } => {
                format!("{}\n{}", render_card(course), attendance.render())
            }
            CourseView::NotEnrolled { course } => format!(
                "{}\n{}\n",
                render_card(course),
                "You are not enrolled in this course.".yellow()
            ),
        }
    }
}

fn render_card(course: &Course) -> String {
    let mut out = format!("{}\n", course.name.bold());
    if let Some(description) = course.description.as_deref() {
        out.push_str(&format!("{}\n", description));
    }
    if let Some(days) = course.schedule_days() {
        out.push_str(&format!("Schedule: {}\n", days.join(", ")));
    }
    if let Some(start) = course.effective_start_date() {
        out.push_str(&format!("Starts: {}\n", start));
    }
    if let Some(link) = course.link.as_deref() {
        out.push_str(&format!("Link: {}\n", link.underline()));
    }
    out
}

/// Whether `course_id` is in the student's enrolled list. A failed check
/// counts as not enrolled.
async fn is_enrolled(api: &dyn PortalApi, course_id: &str) -> bool {
    match api.enrolled_courses().await {
        Ok(enrolled) => enrolled.iter().any(|c| c.id == course_id),
        Err(e) => {
            error!(error = %e, "Failed to check enrollment");
            false
        }
    }
}

async fn find_course(api: &dyn PortalApi, course_id: &str) -> Result<Course> {
    let courses = api.courses().await.context("Failed to fetch courses")?;
    courses
        .into_iter()
        .find(|c| c.id == course_id)
        .context("Course not found.")
}

/// Load the dashboard for one course.
pub async fn load_course_view<Tz: TimeZone>(
    api: &dyn PortalApi,
    course_id: &str,
    today: NaiveDate,
    tz: &Tz,
) -> Result<CourseView> {
    let course = find_course(api, course_id).await?;

    if !is_enrolled(api, course_id).await {
        return Ok(CourseView::NotEnrolled { course });
    }

    let attendance = AttendanceView::load(api, &course, today, tz).await;
    Ok(CourseView::Enrolled { course, attendance })
}

/// Load only the attendance grid for one course.
pub async fn load_attendance<Tz: TimeZone>(
    api: &dyn PortalApi,
    course_id: &str,
    today: NaiveDate,
    tz: &Tz,
) -> Result<AttendanceView> {
    let course = find_course(api, course_id).await?;
    Ok(AttendanceView::load(api, &course, today, tz).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{algo101, course, record, FakePortal};
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn enrolled_portal(attendance: Option<Vec<AttendanceRecord>>) -> FakePortal {
        FakePortal {
            courses: Some(vec![algo101(), course("c2", "Physics201")]),
            enrolled: Some(vec![algo101()]),
            attendance,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_marks_attended_sessions() {
        let records = vec![record("Algo101", "2024-01-03T09:15:00Z")];
        let view = AttendanceView::build(&algo101(), &records, date(2024, 1, 10), &Utc);

        // Mon 1st, Wed 3rd, Mon 8th, Wed 10th
        let attended: Vec<bool> = view.statuses.iter().map(|s| s.attended).collect();
        assert_eq!(attended, vec![false, true, false, false]);
        assert_eq!(view.summary, AttendanceSummary { attended: 1, total: 4 });
    }

    #[test]
    fn test_render_grid_and_summary() {
        let records = vec![record("Algo101", "2024-01-01T10:00:00Z")];
        let view = AttendanceView::build(&algo101(), &records, date(2024, 1, 3), &Utc);
        let text = view.render();
        assert!(text.contains("2024-01-01"));
        assert!(text.contains("2024-01-03"));
        assert!(text.contains("Attended 1 of 2 sessions (50%)"));
    }

    #[test]
    fn test_unknown_schedule_renders_notice() {
        let view = AttendanceView::build(&course("c2", "Physics201"), &[], date(2024, 1, 3), &Utc);
        assert!(view.statuses.is_empty());
        assert!(view.render().contains("No sessions scheduled"));
    }

    #[tokio::test]
    async fn test_enrolled_view() {
        let api = enrolled_portal(Some(vec![record("Algo101", "2024-01-03T09:15:00Z")]));
        let view = load_course_view(&api, "c1", date(2024, 1, 3), &Utc)
            .await
            .unwrap();

        match &view {
            CourseView::Enrolled { attendance, .. } => {
                assert_eq!(attendance.summary, AttendanceSummary { attended: 1, total: 2 });
            }
            other => panic!("unexpected view: {:?}", other),
        }
        assert_eq!(view.course().name, "Algo101");
    }

    #[tokio::test]
    async fn test_not_enrolled_view() {
        let api = enrolled_portal(Some(vec![]));
        let view = load_course_view(&api, "c2", date(2024, 1, 3), &Utc)
            .await
            .unwrap();
        assert!(matches!(view, CourseView::NotEnrolled { .. }));
        assert!(view.render().contains("not enrolled"));
    }

    #[tokio::test]
    async fn test_enrollment_failure_means_not_enrolled() {
        let api = FakePortal {
            courses: Some(vec![algo101()]),
            enrolled: None,
            ..Default::default()
        };
        let view = load_course_view(&api, "c1", date(2024, 1, 3), &Utc)
            .await
            .unwrap();
        assert!(matches!(view, CourseView::NotEnrolled { .. }));
    }

    #[tokio::test]
    async fn test_missing_course() {
        let api = enrolled_portal(Some(vec![]));
        let err = load_course_view(&api, "nope", date(2024, 1, 3), &Utc)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Course not found.");
    }

    #[tokio::test]
    async fn test_attendance_fetch_failure_is_all_absent() {
        let api = enrolled_portal(None);
        let view = load_attendance(&api, "c1", date(2024, 1, 10), &Utc)
            .await
            .unwrap();
        assert_eq!(view.statuses.len(), 4);
        assert!(view.statuses.iter().all(|s| !s.attended));
    }

    #[test]
    fn test_view_serializes_with_tag() {
        let view = CourseView::NotEnrolled {
            course: course("c2", "Physics201"),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["view"], "not_enrolled");
        assert_eq!(json["course"]["name"], "Physics201");
    }
}
