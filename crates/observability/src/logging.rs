//! Logging initialization and configuration
//!
//! Sets up the tracing subscriber for the `optlens` binary. Logs go to
//! stderr so that command output on stdout stays machine-readable.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    #[default]
    Pretty,
    /// JSON format for structured logging
    Json,
    /// Compact single-line format
    Compact,
}

impl LogFormat {
    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
            Self::Compact => "compact",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown log format: {}", s))
    }
}

/// Initialize the logging system
///
/// The log level is controlled via `RUST_LOG` and defaults to `info`.
///
/// # Arguments
///
/// * `service_name` - Name of the service for log identification
/// * `format` - Output format (pretty, json, or compact)
pub fn init_logging(service_name: &str, format: LogFormat) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_ansi(true),
                )
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    tracing::debug!(
        service = service_name,
        format = format.as_str(),
        "Logging initialized"
    );

    Ok(())
}
