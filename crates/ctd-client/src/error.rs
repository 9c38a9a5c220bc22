use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid backend URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("request failed"))]
    Http { status: u16, message: Option<String> },

    #[error("Conflict: {}", .message.as_deref().unwrap_or("resource already exists"))]
    Conflict { message: Option<String> },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    /// The `message` field the backend put in its error body, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Http { message, .. } | ClientError::Conflict { message } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Conflict { .. } => Some(409),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
}
