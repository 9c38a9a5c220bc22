//! Configuration file support for ctd.
//!
//! Loads configuration from `ctd.toml` in the working directory, then layers
//! the `CTD_BACKEND_URL` environment variable and command-line flags on top.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use ctd_logging::LogFormat;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "ctd.toml";

/// Environment variable overriding the backend URL
pub const BACKEND_URL_ENV: &str = "CTD_BACKEND_URL";

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Project-level configuration loaded from `ctd.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Base URL of the portal backend
    pub backend_url: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Tracing filter, e.g. "info" or "ctd_client=debug"
    pub log_level: Option<String>,
    /// pretty, json or compact
    pub log_format: Option<String>,
}

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }
}

/// Effective settings after all layers are applied
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend_url: String,
    pub timeout: Duration,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Settings {
    /// Resolve settings.
    /// Backend URL priority: flag > environment > file > default.
    /// Log format priority: flag > file > default.
    pub fn resolve(
        file: Option<&ProjectConfig>,
        env_backend_url: Option<String>,
        flag_backend_url: Option<String>,
        flag_log_format: Option<LogFormat>,
    ) -> Result<Self> {
        let file_backend_url = file.and_then(|f| f.backend_url.clone());
        let backend_url = flag_backend_url
            .or(env_backend_url.filter(|s| !s.trim().is_empty()))
            .or(file_backend_url)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let timeout_secs = file
            .and_then(|f| f.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let log_level = file
            .and_then(|f| f.log_level.clone())
            .unwrap_or_else(|| ctd_logging::DEFAULT_LEVEL.to_string());

        let log_format = match (flag_log_format, file.and_then(|f| f.log_format.as_deref())) {
            (Some(format), _) => format,
            (None, Some(raw)) => raw
                .parse::<LogFormat>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Invalid log_format in {}", CONFIG_FILE_NAME))?,
            (None, None) => LogFormat::default(),
        };

        Ok(Self {
            backend_url,
            timeout: Duration::from_secs(timeout_secs),
            log_level,
            log_format,
        })
    }
}
