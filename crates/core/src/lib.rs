//! # LearnHub Core
//!
//! Shared building blocks for the LearnHub e-learning services.
//!
//! ## Modules
//!
//! - `models`: read-only catalog, interaction and similarity records
//! - `error`: the shared error type
//! - `validation`: range checks for incoming records
//! - `config`: environment configuration loading and validation
//! - `database`: shared PostgreSQL connection pool
//! - `observability`: structured logging setup

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod observability;
pub mod validation;

pub use config::{load_dotenv, ConfigLoader, DatabaseConfig};
pub use database::{DatabasePool, PoolStats};
pub use error::LearnHubError;
pub use models::{
    CourseStatus, CourseSummary, NeighborRecord, PurchaseRecord, RatingRecord, SearchRecord,
    SimilarityRecord, ViewRecord, WishlistRecord,
};
pub use observability::{init_logging, LogConfig, LogFormat, ObservabilityError};

/// Result type alias for LearnHub operations
pub type Result<T> = std::result::Result<T, LearnHubError>;
