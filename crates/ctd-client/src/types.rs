use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use ctd_attendance::{enumerate_raw, AttendanceRecord, SessionDate};

/// Weekly schedule block of a course payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSchedule {
    #[serde(default)]
    pub days: Option<Vec<String>>,
    #[serde(default)]
    pub start_date: Option<String>,
}

/// A course as served by `/api/courses` and `/api/enrollments/courses`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CoursePayload")]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Cover image URL
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub schedule: Option<CourseSchedule>,
    #[serde(default)]
    pub start_date: Option<String>,
}

/// Course as it arrives on the wire. The backend may send `id`, `_id`, or both.
#[derive(Deserialize)]
struct CoursePayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    schedule: Option<CourseSchedule>,
    #[serde(default)]
    start_date: Option<String>,
}

impl TryFrom<CoursePayload> for Course {
    type Error = String;

    fn try_from(raw: CoursePayload) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .or(raw.mongo_id)
            .ok_or_else(|| format!("course {:?} has no id", raw.name))?;
        Ok(Self {
            id,
            name: raw.name,
            description: raw.description,
            link: raw.link,
            schedule: raw.schedule,
            start_date: raw.start_date,
        })
    }
}

impl Course {
    pub fn schedule_days(&self) -> Option<&[String]> {
        self.schedule.as_ref().and_then(|s| s.days.as_deref())
    }

    /// Start date of the schedule, falling back to the course-level field
    pub fn effective_start_date(&self) -> Option<&str> {
        self.schedule
            .as_ref()
            .and_then(|s| s.start_date.as_deref())
            .or(self.start_date.as_deref())
    }

    /// Session dates from the course start through `today`
    pub fn session_dates(&self, today: NaiveDate) -> Vec<SessionDate> {
        enumerate_raw(self.schedule_days(), self.effective_start_date(), today)
    }
}

/// One entry of `/api/attendances/recent`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub course_name: String,
    pub marked_at: String,
}

impl AttendanceEntry {
    /// Parse the timestamp. Zone-less timestamps are taken as UTC.
    pub fn into_record(self) -> Result<AttendanceRecord, chrono::ParseError> {
        let marked_at = match DateTime::parse_from_rfc3339(&self.marked_at) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(e) => NaiveDateTime::parse_from_str(&self.marked_at, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|dt| dt.and_utc())
                .map_err(|_| e)?,
        };
        Ok(AttendanceRecord::new(self.course_name, marked_at))
    }
}

/// Student profile fields returned at sign-in.
///
/// Roll, year and mobile come back as numbers but are only ever displayed,
/// so they are kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "text_or_number")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub roll: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub branch: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub mobile: Option<String>,
}

/// Body of a successful `/api/users/signin`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// Body of `/api/users/current`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentUserResponse {
    #[serde(default)]
    pub user: Option<Value>,
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_accepts_underscore_id() {
        let json = r#"{"_id":"c1","name":"Algo101"}"#;
        let course: Course = serde_json::from_str(json).unwrap();
        assert_eq!(course.id, "c1");
        assert!(course.schedule.is_none());
        assert!(course.session_dates(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()).is_empty());
    }

    #[test]
    fn test_course_with_both_id_fields() {
        let json = r#"[{"_id":"c1","id":"c1","name":"Algo101"},{"_id":"c2","name":"Physics201"}]"#;
        let courses: Vec<Course> = serde_json::from_str(json).unwrap();
        assert_eq!(courses[0].id, "c1");
        assert_eq!(courses[1].id, "c2");

        // Serializes back with a single `id`
        let value = serde_json::to_value(&courses[0]).unwrap();
        assert_eq!(value["id"], "c1");
        assert!(value.get("_id").is_none());
    }

    #[test]
    fn test_course_without_id_is_error() {
        assert!(serde_json::from_str::<Course>(r#"{"name":"Algo101"}"#).is_err());
    }

    #[test]
    fn test_course_start_date_fallback() {
        let json = r#"{
            "id": "c1",
            "name": "Algo101",
            "schedule": {"days": ["Mon", "Wed"]},
            "start_date": "2024-01-01"
        }"#;
        let course: Course = serde_json::from_str(json).unwrap();
        assert_eq!(course.effective_start_date(), Some("2024-01-01"));

        let sessions = course.session_dates(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(sessions.len(), 4);
    }

    #[test]
    fn test_schedule_start_date_wins() {
        let json = r#"{
            "id": "c1",
            "name": "Algo101",
            "schedule": {"days": ["Mon"], "start_date": "2024-01-08"},
            "start_date": "2024-01-01"
        }"#;
        let course: Course = serde_json::from_str(json).unwrap();
        assert_eq!(course.effective_start_date(), Some("2024-01-08"));
    }

    #[test]
    fn test_attendance_entry_into_record() {
        let entry = AttendanceEntry {
            course_name: "Algo101".into(),
            marked_at: "2024-01-03T09:10:00Z".into(),
        };
        let record = entry.into_record().unwrap();
        assert_eq!(record.course_name, "Algo101");
        assert_eq!(
            record.marked_on(&Utc),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
        );

        let naive = AttendanceEntry {
            course_name: "Algo101".into(),
            marked_at: "2024-01-03T09:10:00.123".into(),
        };
        assert!(naive.into_record().is_ok());

        let bad = AttendanceEntry {
            course_name: "Algo101".into(),
            marked_at: "yesterday".into(),
        };
        assert!(bad.into_record().is_err());
    }

    #[test]
    fn test_sign_in_response_numeric_fields() {
        let json = r#"{
            "token": "tok",
            "role": "student",
            "display_name": "Asha",
            "email": "asha@example.edu",
            "roll": 102203001,
            "branch": "COE",
            "year": 3,
            "mobile": "9876543210"
        }"#;
        let resp: SignInResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token, "tok");
        assert_eq!(resp.role.as_deref(), Some("student"));
        assert_eq!(resp.profile.roll.as_deref(), Some("102203001"));
        assert_eq!(resp.profile.year.as_deref(), Some("3"));
        assert_eq!(resp.profile.mobile.as_deref(), Some("9876543210"));
    }

    #[test]
    fn test_profile_missing_fields() {
        let profile: UserProfile = serde_json::from_str(r#"{"email":null}"#).unwrap();
        assert_eq!(profile, UserProfile::default());
    }
}
