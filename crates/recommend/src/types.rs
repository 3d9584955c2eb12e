//! Core types for the recommendation pipeline

use chrono::{DateTime, Utc};
use learnhub_core::models::{
    CourseSummary, PurchaseRecord, RatingRecord, SearchRecord, ViewRecord, WishlistRecord,
};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Per-course engagement estimate in `[0, 5]`
///
/// Ordered so every walk over it is deterministic. A missing course means
/// "unknown", never "disliked".
pub type EngagementMap = BTreeMap<Uuid, f32>;

/// A single raw interaction of one learner, in arrival order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteractionSignal {
    Rating {
        course_id: Uuid,
        value: u8,
    },
    View {
        course_id: Uuid,
        count: u32,
        last_interaction_at: DateTime<Utc>,
        watched_fraction: Option<f32>,
    },
    Purchase {
        course_id: Uuid,
        purchased_at: DateTime<Utc>,
    },
    WishlistEntry {
        course_id: Uuid,
        added_at: DateTime<Utc>,
    },
    /// Reserved for the search channel; carries no course
    SearchQuery {
        terms: String,
        searched_at: DateTime<Utc>,
    },
}

impl InteractionSignal {
    pub fn course_id(&self) -> Option<Uuid> {
        match self {
            InteractionSignal::Rating { course_id, .. }
            | InteractionSignal::View { course_id, .. }
            | InteractionSignal::Purchase { course_id, .. }
            | InteractionSignal::WishlistEntry { course_id, .. } => Some(*course_id),
            InteractionSignal::SearchQuery { .. } => None,
        }
    }
}

impl From<RatingRecord> for InteractionSignal {
    fn from(record: RatingRecord) -> Self {
        InteractionSignal::Rating {
            course_id: record.course_id,
            value: record.value,
        }
    }
}

impl From<ViewRecord> for InteractionSignal {
    fn from(record: ViewRecord) -> Self {
        InteractionSignal::View {
            course_id: record.course_id,
            count: record.count,
            last_interaction_at: record.last_interaction_at,
            watched_fraction: record.watched_fraction,
        }
    }
}

impl From<PurchaseRecord> for InteractionSignal {
    fn from(record: PurchaseRecord) -> Self {
        InteractionSignal::Purchase {
            course_id: record.course_id,
            purchased_at: record.purchased_at,
        }
    }
}

impl From<WishlistRecord> for InteractionSignal {
    fn from(record: WishlistRecord) -> Self {
        InteractionSignal::WishlistEntry {
            course_id: record.course_id,
            added_at: record.added_at,
        }
    }
}

impl From<SearchRecord> for InteractionSignal {
    fn from(record: SearchRecord) -> Self {
        InteractionSignal::SearchQuery {
            terms: record.terms,
            searched_at: record.searched_at,
        }
    }
}

/// Most recent course per single-seed channel
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Anchors {
    pub last_viewed: Option<Uuid>,
    pub last_wishlisted: Option<Uuid>,
    /// Terms of the latest search, kept for the reserved search channel
    pub last_search: Option<String>,
}

/// Output of signal aggregation for one learner
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalSummary {
    pub engagement: EngagementMap,
    pub anchors: Anchors,
}

/// Named recommendation channel, in response order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKey {
    RecommendedForYou,
    BecauseYouViewed,
    BecauseYouWishlisted,
    LearnersAreViewing,
    BecauseYouSearched,
}

impl ChannelKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKey::RecommendedForYou => "recommended_for_you",
            ChannelKey::BecauseYouViewed => "because_you_viewed",
            ChannelKey::BecauseYouWishlisted => "because_you_wishlisted",
            ChannelKey::LearnersAreViewing => "learners_are_viewing",
            ChannelKey::BecauseYouSearched => "because_you_searched",
        }
    }
}

impl std::fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A course with the score that ranked it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCourse {
    pub course_id: Uuid,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedCourse {
    pub course: CourseSummary,
    /// Weighted-KNN affinity, set by the full-vector channel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_score: Option<f32>,
    /// Similarity to the anchor, set by single-seed channels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

impl RecommendedCourse {
    pub fn predicted(course: CourseSummary, score: f32) -> Self {
        Self {
            course,
            predicted_score: Some(score),
            similarity: None,
        }
    }

    pub fn similar(course: CourseSummary, similarity: f32) -> Self {
        Self {
            course,
            predicted_score: None,
            similarity: Some(similarity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationBucket {
    pub channel: ChannelKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_course_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_title: Option<String>,
    pub items: Vec<RecommendedCourse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecommendationBucket {
    pub fn new(channel: ChannelKey, items: Vec<RecommendedCourse>) -> Self {
        Self {
            channel,
            anchor_course_id: None,
            anchor_title: None,
            items,
            message: None,
        }
    }

    /// Bucket with no items and an explanation for the learner
    pub fn empty(channel: ChannelKey, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(channel, Vec::new())
        }
    }

    pub fn with_anchor(mut self, course: &CourseSummary) -> Self {
        self.anchor_course_id = Some(course.id);
        self.anchor_title = Some(course.title.clone());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn course_ids(&self) -> Vec<Uuid> {
        self.items.iter().map(|item| item.course.id).collect()
    }
}

/// Buckets of one request, always in the declared channel order
///
/// Serializes as a JSON object keyed by channel name, preserving that order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationResult {
    pub user_id: Uuid,
    pub buckets: Vec<RecommendationBucket>,
}

impl RecommendationResult {
    pub fn bucket(&self, channel: ChannelKey) -> Option<&RecommendationBucket> {
        self.buckets.iter().find(|b| b.channel == channel)
    }

    pub fn channels(&self) -> Vec<ChannelKey> {
        self.buckets.iter().map(|b| b.channel).collect()
    }

    pub fn total_items(&self) -> usize {
        self.buckets.iter().map(|b| b.items.len()).sum()
    }
}

impl Serialize for RecommendationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for bucket in &self.buckets {
            map.serialize_entry(bucket.channel.as_str(), bucket)?;
        }
        map.end()
    }
}
