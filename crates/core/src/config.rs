//! Shared configuration loader for LearnHub crates
//!
//! Environment variables use the `LEARNHUB_` prefix. Values are resolved in the
//! order defaults < .env < environment.
//!
//! # Example
//!
//! ```no_run
//! use learnhub_core::config::{load_dotenv, ConfigLoader, DatabaseConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! load_dotenv();
//!
//! let db_config = DatabaseConfig::from_env()?;
//! db_config.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::error::LearnHubError;
use std::time::Duration;
use url::Url;

/// Configuration loader trait
///
/// Provides standardized methods for loading and validating configuration from
/// environment variables.
pub trait ConfigLoader: Sized {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if a required variable is missing or a
    /// value cannot be parsed.
    fn from_env() -> Result<Self, LearnHubError>;

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if any validation check fails.
    fn validate(&self) -> Result<(), LearnHubError>;
}

/// Database configuration
///
/// Connection settings for the PostgreSQL database holding learner
/// interactions, the course catalog and the similarity snapshot.
///
/// # Environment Variables
///
/// - `LEARNHUB_DATABASE_URL` (required, falls back to `DATABASE_URL`)
/// - `LEARNHUB_DATABASE_MAX_CONNECTIONS` (default: 20)
/// - `LEARNHUB_DATABASE_MIN_CONNECTIONS` (default: 2)
/// - `LEARNHUB_DATABASE_ACQUIRE_TIMEOUT` seconds (default: 30)
/// - `LEARNHUB_DATABASE_IDLE_TIMEOUT` seconds (default: 600)
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections in the pool
    pub min_connections: u32,
    /// How long to wait for a pooled connection
    pub acquire_timeout: Duration,
    /// Idle connection timeout duration
    pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/learnhub".to_string(),
            max_connections: 20,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl ConfigLoader for DatabaseConfig {
    fn from_env() -> Result<Self, LearnHubError> {
        let url = std::env::var("LEARNHUB_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map_err(|_| {
                LearnHubError::configuration(
                    "DATABASE_URL or LEARNHUB_DATABASE_URL must be set",
                    "LEARNHUB_DATABASE_URL",
                )
            })?;

        let defaults = DatabaseConfig::default();

        let max_connections =
            parse_env_var("LEARNHUB_DATABASE_MAX_CONNECTIONS", defaults.max_connections)?;
        let min_connections =
            parse_env_var("LEARNHUB_DATABASE_MIN_CONNECTIONS", defaults.min_connections)?;
        let acquire_timeout_secs = parse_env_var("LEARNHUB_DATABASE_ACQUIRE_TIMEOUT", 30u64)?;
        let idle_timeout_secs = parse_env_var("LEARNHUB_DATABASE_IDLE_TIMEOUT", 600u64)?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            idle_timeout: Duration::from_secs(idle_timeout_secs),
        })
    }

    fn validate(&self) -> Result<(), LearnHubError> {
        Url::parse(&self.url).map_err(|e| {
            LearnHubError::configuration(
                format!("Invalid DATABASE_URL: {}", e),
                "LEARNHUB_DATABASE_URL",
            )
        })?;

        if self.max_connections == 0 {
            return Err(LearnHubError::configuration(
                "max_connections must be greater than 0",
                "LEARNHUB_DATABASE_MAX_CONNECTIONS",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(LearnHubError::configuration(
                format!(
                    "min_connections ({}) cannot exceed max_connections ({})",
                    self.min_connections, self.max_connections
                ),
                "LEARNHUB_DATABASE_MIN_CONNECTIONS",
            ));
        }

        if self.acquire_timeout.as_secs() == 0 {
            return Err(LearnHubError::configuration(
                "acquire_timeout must be greater than 0 seconds",
                "LEARNHUB_DATABASE_ACQUIRE_TIMEOUT",
            ));
        }

        if self.idle_timeout.as_secs() == 0 {
            return Err(LearnHubError::configuration(
                "idle_timeout must be greater than 0 seconds",
                "LEARNHUB_DATABASE_IDLE_TIMEOUT",
            ));
        }

        Ok(())
    }
}

/// Parse an environment variable, falling back to `default` when unset
///
/// # Errors
///
/// Returns a `ConfigurationError` if the value is present but cannot be parsed.
pub fn parse_env_var<T>(key: &str, default: T) -> Result<T, LearnHubError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.parse::<T>().map_err(|e| {
                LearnHubError::configuration(format!("Failed to parse {}: {}", key, e), key)
            })
        })
        .unwrap_or(Ok(default))
}

/// Load .env file if present
///
/// Missing files are ignored; other failures are reported on stderr since
/// logging is usually not initialised yet.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.acquire_timeout, Duration::from_secs(30));
        assert_eq!(config.idle_timeout, Duration::from_secs(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_config_validation_invalid_url() {
        let config = DatabaseConfig {
            url: "not-a-valid-url".to_string(),
            ..DatabaseConfig::default()
        };

        let result = config.validate();
        assert!(matches!(
            result,
            Err(LearnHubError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_database_config_validation_zero_max_connections() {
        let config = DatabaseConfig {
            max_connections: 0,
            ..DatabaseConfig::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_config_validation_min_exceeds_max() {
        let config = DatabaseConfig {
            min_connections: 30,
            max_connections: 20,
            ..DatabaseConfig::default()
        };

        match config.validate() {
            Err(LearnHubError::ConfigurationError { key, .. }) => {
                assert_eq!(key.as_deref(), Some("LEARNHUB_DATABASE_MIN_CONNECTIONS"));
            }
            other => panic!("Expected ConfigurationError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_env_var_with_default() {
        let result: u32 = parse_env_var("LEARNHUB_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn test_parse_env_var_with_value() {
        env::set_var("LEARNHUB_TEST_PARSE_VAR", "100");
        let result: u32 = parse_env_var("LEARNHUB_TEST_PARSE_VAR", 42).unwrap();
        assert_eq!(result, 100);
        env::remove_var("LEARNHUB_TEST_PARSE_VAR");
    }

    #[test]
    fn test_parse_env_var_invalid_value() {
        env::set_var("LEARNHUB_TEST_INVALID_VAR", "not-a-number");
        let result: Result<u32, _> = parse_env_var("LEARNHUB_TEST_INVALID_VAR", 42);
        assert!(result.is_err());
        env::remove_var("LEARNHUB_TEST_INVALID_VAR");
    }
}
