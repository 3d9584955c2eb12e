//! Learner interaction records
//!
//! One row per (user, course) event as stored by the platform. Ranges are
//! enforced with `validator`; callers skip records that fail validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Explicit star rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RatingRecord {
    pub user_id: Uuid,
    pub course_id: Uuid,

    /// Stars, 1 to 5
    #[validate(range(min = 1, max = 5))]
    pub value: u8,
}

/// Aggregated viewing activity for one course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ViewRecord {
    pub user_id: Uuid,
    pub course_id: Uuid,

    /// Number of times the course page or a lesson was opened
    pub count: u32,

    pub last_interaction_at: DateTime<Utc>,

    /// Share of the course content watched; trackers may overshoot 1.0,
    /// which scoring clamps
    #[validate(range(min = 0.0))]
    pub watched_fraction: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PurchaseRecord {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WishlistRecord {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub added_at: DateTime<Utc>,
}

/// Catalog search issued by a learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SearchRecord {
    pub user_id: Uuid,

    #[validate(length(min = 1, max = 500))]
    pub terms: String,

    pub searched_at: DateTime<Utc>,
}
