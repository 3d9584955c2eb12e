//! Shared PostgreSQL connection pool for LearnHub services

use crate::config::DatabaseConfig;
use crate::error::LearnHubError;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

/// Shared database connection pool
#[derive(Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Create new database pool
    pub async fn new(config: &DatabaseConfig) -> Result<Self, LearnHubError> {
        info!(
            max_connections = config.max_connections,
            "Connecting to database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .idle_timeout(Some(config.idle_timeout))
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await
            .map_err(|err| LearnHubError::database(err.to_string(), "connect"))?;

        info!("Database connection pool established");
        Ok(Self { pool })
    }

    /// Wrap an already configured pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get reference to underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
        }
    }
}

/// Pool statistics
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lazy_pool_reports_empty_stats() {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy("postgresql://localhost/learnhub")
            .expect("lazy pool");
        let db = DatabasePool::from_pool(pool);

        let stats = db.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.idle, 0);
    }

    #[tokio::test]
    async fn test_connect_failure_is_a_database_error() {
        let config = DatabaseConfig {
            url: "not a database url".to_string(),
            ..DatabaseConfig::default()
        };

        match DatabasePool::new(&config).await {
            Err(LearnHubError::DatabaseError { operation, .. }) => {
                assert_eq!(operation, "connect");
            }
            Err(other) => panic!("Expected DatabaseError, got {:?}", other),
            Ok(_) => panic!("Expected connection to fail"),
        }
    }
}
