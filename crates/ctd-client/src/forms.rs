use serde::Serialize;
use thiserror::Error;

/// Role sent with every signup from this client
pub const DEFAULT_ROLE: &str = "student";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} must be a number, got {value:?}")]
    NotNumeric { field: &'static str, value: String },

    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: String },

    #[error("Invalid email address: {0:?}")]
    InvalidEmail(String),
}

/// Signup fields exactly as typed
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub display_name: String,
    pub roll: String,
    pub branch: String,
    pub year: String,
    pub mobile: String,
    pub email: String,
    pub password: String,
}

/// Validated body of `POST /api/users/signup`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub roll: u64,
    pub branch: String,
    pub year: u8,
    pub mobile: u64,
    pub display_name: String,
    pub password: String,
    pub role: String,
}

impl SignupForm {
    /// Parse every field into its wire type, rejecting the first bad one.
    pub fn validate(&self) -> Result<SignupRequest, FormError> {
        let display_name = required("Name", &self.display_name)?;
        let roll = numeric("Roll Number", &self.roll)?;
        let branch = required("Branch", &self.branch)?;
        let year = numeric("Year of Study", &self.year)?;
        let mobile = numeric("Mobile Number", &self.mobile)?;
        let email = validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(FormError::Missing("Password"));
        }

        Ok(SignupRequest {
            email,
            roll,
            branch,
            year,
            mobile,
            display_name,
            password: self.password.clone(),
            role: DEFAULT_ROLE.to_string(),
        })
    }
}

/// Trim and sanity-check an email address.
pub fn validate_email(raw: &str) -> Result<String, FormError> {
    let email = required("Email", raw)?;
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(email)
        }
        _ => Err(FormError::InvalidEmail(email)),
    }
}

fn required(field: &'static str, raw: &str) -> Result<String, FormError> {
    let value = raw.trim();
    if value.is_empty() {
        Err(FormError::Missing(field))
    } else {
        Ok(value.to_string())
    }
}

fn numeric<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, FormError> {
    let value = required(field, raw)?;
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(FormError::NotNumeric { field, value });
    }
    // All digits, so the only way to fail is overflow
    value
        .parse::<T>()
        .map_err(|_| FormError::OutOfRange { field, value })
}
