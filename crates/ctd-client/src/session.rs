use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::types::{SignInResponse, UserProfile};

/// Authentication context for one signed-in student.
///
/// Acquired at login, handed to [`crate::PortalClient::with_session`] so
/// every request carries the bearer token, and cleared on logout or when the
/// backend rejects the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub profile: UserProfile,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            role: None,
            profile: UserProfile::default(),
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl From<SignInResponse> for Session {
    fn from(resp: SignInResponse) -> Self {
        Self {
            token: resp.token,
            role: resp.role,
            profile: resp.profile,
        }
    }
}

/// Stores the session as JSON in `~/.config/ctd/session.json`.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at the default location under the user's config directory.
    pub fn new() -> Result<Self, StoreError> {
        let config_dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(Self {
            path: config_dir.join("ctd").join("session.json"),
        })
    }

    /// Store at a custom path (useful for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved session.
    ///
    /// A missing file means "signed out". An unreadable or corrupt file is
    /// also treated as signed out, with a warning.
    pub fn load(&self) -> Option<Session> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read session file {:?}: {}", self.path, e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Ignoring corrupt session file {:?}: {}", self.path, e);
                None
            }
        }
    }

    /// Save the session, creating the parent directory. 0600 on Unix.
    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(session)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // `mode` only applies on creation; tighten a file left by an older save
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(contents.as_bytes())?;

        debug!("Saved session to {:?}", self.path);
        Ok(())
    }

    /// Remove the saved session. Removing a missing session is not an error.
    pub fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Cleared session at {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
