use async_trait::async_trait;
use serde_json::Value;

use ctd_attendance::AttendanceRecord;

use crate::error::ClientError;
use crate::forms::SignupRequest;
use crate::types::{Course, SignInResponse};

/// Portal backend operations used by the CLI views
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, ClientError>;

    async fn sign_up(&self, request: &SignupRequest) -> Result<(), ClientError>;

    async fn forgot_password(&self, email: &str) -> Result<(), ClientError>;

    /// Validate the current token; returns the backend's user object
    async fn current_user(&self) -> Result<Value, ClientError>;

    /// Full course catalog
    async fn courses(&self) -> Result<Vec<Course>, ClientError>;

    /// Courses the signed-in student is enrolled in
    async fn enrolled_courses(&self) -> Result<Vec<Course>, ClientError>;

    /// Recent attendance of the signed-in student, across all courses
    async fn recent_attendance(&self) -> Result<Vec<AttendanceRecord>, ClientError>;
}
