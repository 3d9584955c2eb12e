//! Recommendation error taxonomy
//!
//! Only [`RecommendError::CatalogUnavailable`] ever reaches the caller of
//! `get_recommendations`. Every other variant is turned into a degraded
//! bucket by the assembler.

use crate::types::ChannelKey;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// External input fetched for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Ratings,
    Views,
    Purchases,
    Wishlist,
    Searches,
    Similarity,
    Catalog,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Ratings => "ratings",
            InputKind::Views => "views",
            InputKind::Purchases => "purchases",
            InputKind::Wishlist => "wishlist",
            InputKind::Searches => "searches",
            InputKind::Similarity => "similarity",
            InputKind::Catalog => "catalog",
        }
    }
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecommendError {
    #[error("Input {input} unavailable: {reason}")]
    InputUnavailable { input: InputKind, reason: String },

    #[error("Invalid similarity data for course {course_id}: {reason}")]
    InvalidSimilarityData { course_id: Uuid, reason: String },

    #[error("No signal for channel {channel}")]
    NoSignal { channel: ChannelKey },

    #[error("Course {course_id} is missing from the catalog or unpublished")]
    CatalogMismatch { course_id: Uuid },

    #[error("Course catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },

    #[error("Channel {channel} did not finish before the request deadline")]
    ChannelTimedOut { channel: ChannelKey },

    #[error("Channel {channel} failed: {reason}")]
    ChannelFailed { channel: ChannelKey, reason: String },
}

impl RecommendError {
    pub fn input_unavailable(input: InputKind, err: &anyhow::Error) -> Self {
        RecommendError::InputUnavailable {
            input,
            reason: format!("{:#}", err),
        }
    }

    /// Whether this error must abort the whole request
    pub fn is_fatal(&self) -> bool {
        matches!(self, RecommendError::CatalogUnavailable { .. })
    }

    /// Learner-facing explanation for a degraded bucket
    pub fn bucket_message(&self) -> String {
        match self {
            RecommendError::NoSignal { channel } => no_signal_message(*channel).to_string(),
            RecommendError::ChannelTimedOut { .. } => {
                "recommendations took too long to compute".to_string()
            }
            _ => "recommendations are temporarily unavailable".to_string(),
        }
    }
}

fn no_signal_message(channel: ChannelKey) -> &'static str {
    match channel {
        ChannelKey::RecommendedForYou => "insufficient interaction data",
        ChannelKey::BecauseYouViewed => "no recently viewed courses",
        ChannelKey::BecauseYouWishlisted => "no wishlisted courses",
        ChannelKey::LearnersAreViewing | ChannelKey::BecauseYouSearched => "not yet available",
    }
}
