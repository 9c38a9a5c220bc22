//! # ctd-logging
//!
//! Tracing setup for the CTD portal client.
//!
//! Diagnostics go to stderr so that command output on stdout (including
//! `--json` output) stays machine-readable.
//!
//! ## Log Formats
//!
//! - `Pretty` - Human-readable multi-field output
//! - `JSON` - Structured JSON lines
//! - `Compact` - Minimal single-line output

mod format;

pub use format::LogFormat;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when neither `RUST_LOG` nor a configured level is given
pub const DEFAULT_LEVEL: &str = "warn";

/// Initialize tracing for the application.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .without_time()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}
