//! Structured logging initialisation
//!
//! Binaries call [`init_logging`] once at startup. Library code only emits
//! `tracing` events and never installs a subscriber.

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line, for log shipping
    #[default]
    Json,
    /// Human-readable multi-line output for local development
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = ObservabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(ObservabilityError::InvalidFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            with_target: true,
        }
    }
}

impl LogConfig {
    /// Read `LEARNHUB_LOG_LEVEL` and `LEARNHUB_LOG_FORMAT`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let level = std::env::var("LEARNHUB_LOG_LEVEL").unwrap_or(defaults.level);
        let format = std::env::var("LEARNHUB_LOG_FORMAT")
            .ok()
            .and_then(|f| f.parse().ok())
            .unwrap_or(defaults.format);

        Self {
            level,
            format,
            with_target: defaults.with_target,
        }
    }

    pub fn validate(&self) -> Result<(), ObservabilityError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.to_lowercase().as_str()) {
            return Err(ObservabilityError::InvalidLevel(self.level.clone()));
        }
        Ok(())
    }
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `config.level`.
///
/// # Errors
///
/// Fails if the level is invalid or a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> Result<(), ObservabilityError> {
    config.validate()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(config.with_target),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(config.with_target)
                    .with_line_number(true),
            )
            .try_init(),
    }
    .map_err(|e| ObservabilityError::SubscriberInit(e.to_string()))?;

    tracing::debug!(level = %config.level, format = ?config.format, "Logging initialized");

    Ok(())
}
