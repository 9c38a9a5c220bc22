//! # ctd-client
//!
//! HTTP access to the CTD portal backend.
//!
//! ## Key Types
//!
//! - [`PortalClient`] - reqwest-based client for the portal REST API
//! - [`PortalApi`] - The operations the CLI needs, as a trait
//! - [`Session`] - Explicit authentication context (bearer token + profile)
//! - [`SessionStore`] - Persists the session between runs
//! - [`SignupForm`] - Raw signup input, validated into a [`SignupRequest`]

mod api;
mod client;
mod error;
mod forms;
mod session;
mod types;

pub use api::PortalApi;
pub use client::PortalClient;
pub use error::{ClientError, StoreError};
pub use forms::{validate_email, FormError, SignupForm, SignupRequest, DEFAULT_ROLE};
pub use session::{Session, SessionStore};
pub use types::{
    AttendanceEntry, Course, CourseSchedule, CurrentUserResponse, SignInResponse, UserProfile,
};
