//! Login, signup and password-reset flows.

use anyhow::{bail, Result};
use tracing::{info, warn};

use ctd_client::{validate_email, ClientError, FormError, PortalApi, Session, SignupForm};

pub const LOGIN_FAILED: &str =
    "Login failed. Please check your credentials or verify your account.";
pub const SIGNUP_SUCCESS: &str =
    "Signup successful! Please verify your account via email and then login.";
pub const SIGNUP_FAILED: &str = "Signup failed.";
pub const EMAIL_EXISTS: &str = "Email already exists.";
pub const RESET_SENT: &str = "If an account with that email exists, a password reset link has been sent. Please check your inbox.";
pub const RESET_FAILED: &str = "Failed to send reset link. Please try again.";

/// Which auth form is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
    ForgotPassword,
}

impl AuthMode {
    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::Login => "Login",
            AuthMode::Signup => "Sign Up",
            AuthMode::ForgotPassword => "Reset Password",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            AuthMode::Login => "Login",
            AuthMode::Signup => "Sign Up",
            AuthMode::ForgotPassword => "Send Reset Link",
        }
    }

    /// How to reach the other forms from this one
    pub fn switch_hint(&self) -> &'static str {
        match self {
            AuthMode::Login => {
                "Don't have an account? Run `ctd signup`. Forgot password? Run `ctd forgot-password`."
            }
            AuthMode::Signup => "Already have an account? Run `ctd login`.",
            AuthMode::ForgotPassword => "Back to login: run `ctd login`.",
        }
    }
}

/// A filled-in auth form
#[derive(Debug, Clone)]
pub enum AuthRequest {
    Login { email: String, password: String },
    Signup(SignupForm),
    ForgotPassword { email: String },
}

impl AuthRequest {
    pub fn mode(&self) -> AuthMode {
        match self {
            AuthRequest::Login { .. } => AuthMode::Login,
            AuthRequest::Signup(_) => AuthMode::Signup,
            AuthRequest::ForgotPassword { .. } => AuthMode::ForgotPassword,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    SignedIn(Session),
    SignedUp,
    ResetRequested,
}

impl AuthOutcome {
    pub fn message(&self) -> String {
        match self {
            AuthOutcome::SignedIn(session) => {
                let who = session
                    .profile
                    .display_name
                    .as_deref()
                    .or(session.profile.email.as_deref())
                    .unwrap_or("student");
                format!("Signed in as {}.", who)
            }
            AuthOutcome::SignedUp => SIGNUP_SUCCESS.to_string(),
            AuthOutcome::ResetRequested => RESET_SENT.to_string(),
        }
    }
}

/// Submit an auth form. Errors carry the message to show the user.
pub async fn submit(api: &dyn PortalApi, request: AuthRequest) -> Result<AuthOutcome> {
    match request {
        AuthRequest::Login { email, password } => {
            let email = validate_email(&email)?;
            if password.is_empty() {
                bail!(FormError::Missing("Password"));
            }
            match api.sign_in(&email, &password).await {
                Ok(resp) => {
                    info!(email = %email, "Signed in");
                    Ok(AuthOutcome::SignedIn(Session::from(resp)))
                }
                Err(e) => {
                    warn!(error = %e, "Sign-in failed");
                    bail!(user_message(&e, LOGIN_FAILED))
                }
            }
        }
        AuthRequest::Signup(form) => {
            let request = form.validate()?;
            match api.sign_up(&request).await {
                Ok(()) => Ok(AuthOutcome::SignedUp),
                Err(ClientError::Conflict { .. }) => bail!(EMAIL_EXISTS),
                Err(e) => {
                    warn!(error = %e, "Signup failed");
                    bail!(user_message(&e, SIGNUP_FAILED))
                }
            }
        }
        AuthRequest::ForgotPassword { email } => {
            let email = validate_email(&email)?;
            match api.forgot_password(&email).await {
                Ok(()) => Ok(AuthOutcome::ResetRequested),
                Err(e) => {
                    warn!(error = %e, "Password reset request failed");
                    bail!(user_message(&e, RESET_FAILED))
                }
            }
        }
    }
}

fn user_message(err: &ClientError, fallback: &str) -> String {
    err.server_message().unwrap_or(fallback).to_string()
}

/// Result of validating a stored session against the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCheck {
    Valid,
    /// The backend rejected the token; the session must be discarded
    Rejected,
    /// The backend could not be reached; keep the session for now
    Unreachable,
}

pub async fn check_session(api: &dyn PortalApi) -> SessionCheck {
    match api.current_user().await {
        Ok(_) => SessionCheck::Valid,
        Err(ClientError::Network(e)) => {
            warn!(error = %e, "Could not validate stored session");
            SessionCheck::Unreachable
        }
        Err(e) => {
            warn!(error = %e, "Stored session rejected");
            SessionCheck::Rejected
        }
    }
}
