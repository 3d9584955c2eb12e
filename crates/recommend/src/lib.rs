//! LearnHub Recommendation Engine
//!
//! Personalized course recommendations from a learner's ratings, views,
//! purchases and wishlist, combined with a precomputed course-to-course
//! similarity snapshot.
//!
//! Every request produces the same ordered set of channels:
//!
//! 1. `recommended_for_you`: weighted KNN over all engaged courses
//! 2. `because_you_viewed`: neighbors of the most recently viewed course
//! 3. `because_you_wishlisted`: neighbors of the most recently wishlisted course
//! 4. `learners_are_viewing`: reserved
//! 5. `because_you_searched`: reserved
//!
//! A channel that cannot be computed comes back empty with a message; only
//! an unavailable catalog fails the whole request.

pub mod assembler;
pub mod catalog;
pub mod channels;
pub mod config;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod predictor;
pub mod ranking;
pub mod signals;
pub mod similarity;
pub mod snapshot;
pub mod sources;
pub mod types;

// Re-export key types
pub use assembler::RecommendationAssembler;
pub use catalog::CourseCatalog;
pub use channels::{AnchorSelector, CandidateGenerator, ChannelDescriptor, ChannelInputs, CHANNELS};
pub use config::{EngagementWeights, RecommenderConfig};
pub use error::{InputKind, RecommendError};
pub use memory::InMemoryLearningStore;
pub use postgres::PgLearningStore;
pub use predictor::{PredictAffinity, PredictFromSeed};
pub use ranking::top_n;
pub use signals::AggregateSignals;
pub use similarity::{Neighbor, SimilarityIndex};
pub use snapshot::JsonSimilaritySnapshot;
pub use sources::{CatalogSource, InteractionSource, SimilaritySource};
pub use types::*;
