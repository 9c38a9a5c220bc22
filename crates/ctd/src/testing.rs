//! In-memory portal backend for view tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use ctd_attendance::AttendanceRecord;
use ctd_client::{
    ClientError, Course, CourseSchedule, PortalApi, SignInResponse, SignupRequest, UserProfile,
};

/// Each `None` makes the matching call fail with HTTP 500.
#[derive(Default)]
pub struct FakePortal {
    pub courses: Option<Vec<Course>>,
    pub enrolled: Option<Vec<Course>>,
    pub attendance: Option<Vec<AttendanceRecord>>,
    pub user: Option<Value>,
    /// Status and message returned by the auth endpoints
    pub auth_failure: Option<(u16, Option<String>)>,
}

fn server_error() -> ClientError {
    ClientError::Http {
        status: 500,
        message: None,
    }
}

impl FakePortal {
    fn auth_result(&self) -> Result<(), ClientError> {
        match self.auth_failure {
            Some((409, ref message)) => Err(ClientError::Conflict {
                message: message.clone(),
            }),
            Some((status, ref message)) => Err(ClientError::Http {
                status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PortalApi for FakePortal {
    async fn sign_in(&self, email: &str, _password: &str) -> Result<SignInResponse, ClientError> {
        self.auth_result()?;
        Ok(SignInResponse {
            token: "tok123".into(),
            role: Some("student".into()),
            profile: UserProfile {
                display_name: Some("Asha".into()),
                email: Some(email.to_string()),
                ..Default::default()
            },
        })
    }

    async fn sign_up(&self, _request: &SignupRequest) -> Result<(), ClientError> {
        self.auth_result()
    }

    async fn forgot_password(&self, _email: &str) -> Result<(), ClientError> {
        self.auth_result()
    }

    async fn current_user(&self) -> Result<Value, ClientError> {
        self.user.clone().ok_or(ClientError::NotAuthenticated)
    }

    async fn courses(&self) -> Result<Vec<Course>, ClientError> {
        self.courses.clone().ok_or_else(server_error)
    }

    async fn enrolled_courses(&self) -> Result<Vec<Course>, ClientError> {
        self.enrolled.clone().ok_or_else(server_error)
    }

    async fn recent_attendance(&self) -> Result<Vec<AttendanceRecord>, ClientError> {
        self.attendance.clone().ok_or_else(server_error)
    }
}

pub fn course(id: &str, name: &str) -> Course {
    Course {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(format!("About {}", name)),
        link: None,
        schedule: None,
        start_date: None,
    }
}

/// Algo101 meeting Mon/Wed from Monday 2024-01-01
pub fn algo101() -> Course {
    Course {
        schedule: Some(CourseSchedule {
            days: Some(vec!["Mon".into(), "Wed".into()]),
            start_date: Some("2024-01-01".into()),
        }),
        ..course("c1", "Algo101")
    }
}

pub fn record(course_name: &str, marked_at: &str) -> AttendanceRecord {
    let marked_at: DateTime<Utc> = DateTime::parse_from_rfc3339(marked_at)
        .unwrap()
        .with_timezone(&Utc);
    AttendanceRecord::new(course_name, marked_at)
}

pub fn signed_in_user() -> Option<Value> {
    Some(json!({ "email": "asha@example.edu" }))
}
