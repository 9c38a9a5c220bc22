//! Portal HTTP client.
//!
//! Async reqwest client. Authentication is explicit: a client built without a
//! [`Session`] sends anonymous requests, one built with
//! [`PortalClient::with_session`] attaches the bearer token to every request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use ctd_attendance::AttendanceRecord;

use crate::api::PortalApi;
use crate::error::ClientError;
use crate::forms::SignupRequest;
use crate::session::Session;
use crate::types::{AttendanceEntry, Course, CurrentUserResponse, SignInResponse};

#[derive(Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    session: Option<Session>,
}

impl PortalClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl(format!(
                "{}: scheme must be http or https",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(format!("ctd/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: None,
        })
    }

    /// Attach an authentication context to every subsequent request.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, authenticated = self.session.is_some(), "Portal request");

        let req = self.http.request(method, url);
        match self.session {
            Some(ref session) => req.header(reqwest::header::AUTHORIZATION, session.bearer()),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<String, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = error_message(&body);
        if status == StatusCode::CONFLICT {
            return Err(ClientError::Conflict { message });
        }
        Err(ClientError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let body = self.send(req).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn get_course_list(&self, path: &str) -> Result<Vec<Course>, ClientError> {
        // A null body means "no courses"
        let courses: Option<Vec<Course>> = self.send_json(self.request(Method::GET, path)).await?;
        Ok(courses.unwrap_or_default())
    }
}

/// Pull `message` out of a JSON error body
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
}

#[async_trait]
impl PortalApi for PortalClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, ClientError> {
        let req = self
            .request(Method::POST, "/api/users/signin")
            .json(&json!({ "email": email, "password": password }));
        self.send_json(req).await
    }

    async fn sign_up(&self, request: &SignupRequest) -> Result<(), ClientError> {
        let req = self.request(Method::POST, "/api/users/signup").json(request);
        self.send(req).await.map(|_| ())
    }

    async fn forgot_password(&self, email: &str) -> Result<(), ClientError> {
        let req = self
            .request(Method::POST, "/api/users/forgot-password")
            .json(&json!({ "email": email }));
        self.send(req).await.map(|_| ())
    }

    async fn current_user(&self) -> Result<Value, ClientError> {
        if self.session.is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        let resp: CurrentUserResponse = self
            .send_json(self.request(Method::GET, "/api/users/current"))
            .await?;
        resp.user
            .filter(|u| !u.is_null())
            .ok_or(ClientError::NotAuthenticated)
    }

    async fn courses(&self) -> Result<Vec<Course>, ClientError> {
        self.get_course_list("/api/courses").await
    }

    async fn enrolled_courses(&self) -> Result<Vec<Course>, ClientError> {
        self.get_course_list("/api/enrollments/courses").await
    }

    async fn recent_attendance(&self) -> Result<Vec<AttendanceRecord>, ClientError> {
        let entries: Option<Vec<AttendanceEntry>> = self
            .send_json(self.request(Method::GET, "/api/attendances/recent"))
            .await?;

        let records = entries
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| {
                let raw = entry.marked_at.clone();
                match entry.into_record() {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(marked_at = %raw, error = %e, "Skipping attendance entry");
                        None
                    }
                }
            })
            .collect();

        Ok(records)
    }
}
