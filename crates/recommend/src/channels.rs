//! Declarative recommendation channels
//!
//! Each channel is a [`ChannelDescriptor`]: how to pick its anchor, how to
//! generate candidates and which inputs it cannot do without. The assembler
//! walks [`CHANNELS`] in order and never branches on a channel key.

use crate::catalog::CourseCatalog;
use crate::error::{InputKind, RecommendError};
use crate::predictor::{PredictAffinity, PredictFromSeed};
use crate::similarity::SimilarityIndex;
use crate::types::{
    Anchors, ChannelKey, RecommendationBucket, RecommendedCourse, ScoredCourse, SignalSummary,
};
use learnhub_core::CourseSummary;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub const NOT_YET_AVAILABLE: &str = "not yet available";
const NO_PREDICTIONS: &str = "no courses similar to your activity yet";
const NO_SIMILAR_COURSES: &str = "no similar courses available";

/// Where a channel takes its seed course from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSelector {
    None,
    LastViewed,
    LastWishlisted,
    /// Search terms carry no course; reserved for a text-based generator
    LastSearched,
}

impl AnchorSelector {
    pub fn select(&self, anchors: &Anchors) -> Option<Uuid> {
        match self {
            AnchorSelector::None | AnchorSelector::LastSearched => None,
            AnchorSelector::LastViewed => anchors.last_viewed,
            AnchorSelector::LastWishlisted => anchors.last_wishlisted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateGenerator {
    /// Weighted KNN over the whole engagement map
    FullVector,
    /// The anchor's neighbor list
    SingleSeed,
    /// Not implemented yet; always an empty bucket
    Reserved,
}

#[derive(Debug, Clone, Copy)]
pub struct ChannelDescriptor {
    pub key: ChannelKey,
    pub anchor: AnchorSelector,
    pub generator: CandidateGenerator,
    pub requires: &'static [InputKind],
}

/// Every channel, in response order
pub const CHANNELS: [ChannelDescriptor; 5] = [
    ChannelDescriptor {
        key: ChannelKey::RecommendedForYou,
        anchor: AnchorSelector::None,
        generator: CandidateGenerator::FullVector,
        requires: &[
            InputKind::Ratings,
            InputKind::Views,
            InputKind::Purchases,
            InputKind::Wishlist,
            InputKind::Similarity,
        ],
    },
    ChannelDescriptor {
        key: ChannelKey::BecauseYouViewed,
        anchor: AnchorSelector::LastViewed,
        generator: CandidateGenerator::SingleSeed,
        requires: &[InputKind::Views, InputKind::Purchases, InputKind::Similarity],
    },
    ChannelDescriptor {
        key: ChannelKey::BecauseYouWishlisted,
        anchor: AnchorSelector::LastWishlisted,
        generator: CandidateGenerator::SingleSeed,
        requires: &[
            InputKind::Purchases,
            InputKind::Wishlist,
            InputKind::Similarity,
        ],
    },
    ChannelDescriptor {
        key: ChannelKey::LearnersAreViewing,
        anchor: AnchorSelector::None,
        generator: CandidateGenerator::Reserved,
        requires: &[],
    },
    ChannelDescriptor {
        key: ChannelKey::BecauseYouSearched,
        anchor: AnchorSelector::LastSearched,
        generator: CandidateGenerator::Reserved,
        requires: &[],
    },
];

/// Everything a channel reads, shared read-only across channel tasks
#[derive(Debug, Clone)]
pub struct ChannelInputs {
    pub catalog: CourseCatalog,
    pub similarity: Option<Arc<SimilarityIndex>>,
    pub summary: SignalSummary,
    /// Purchased course ids; never recommended
    pub owned: BTreeSet<Uuid>,
    /// Inputs whose fetch failed, with the reason
    pub unavailable: BTreeMap<InputKind, String>,
    pub top_n: usize,
}

impl ChannelDescriptor {
    pub fn compute(&self, inputs: &ChannelInputs) -> Result<RecommendationBucket, RecommendError> {
        for input in self.requires {
            if let Some(reason) = inputs.unavailable.get(input) {
                return Err(RecommendError::InputUnavailable {
                    input: *input,
                    reason: reason.clone(),
                });
            }
        }

        match self.generator {
            CandidateGenerator::FullVector => self.full_vector(inputs, similarity(inputs)?),
            CandidateGenerator::SingleSeed => self.single_seed(inputs, similarity(inputs)?),
            CandidateGenerator::Reserved => {
                Ok(RecommendationBucket::empty(self.key, NOT_YET_AVAILABLE))
            }
        }
    }

    fn full_vector(
        &self,
        inputs: &ChannelInputs,
        index: &SimilarityIndex,
    ) -> Result<RecommendationBucket, RecommendError> {
        let engagement = &inputs.summary.engagement;
        if engagement.is_empty() {
            return Err(RecommendError::NoSignal { channel: self.key });
        }

        let candidates: BTreeSet<Uuid> = inputs
            .catalog
            .published_ids()
            .into_iter()
            .filter(|id| !inputs.owned.contains(id))
            .collect();

        let ranked = PredictAffinity::execute(engagement, index, &candidates, inputs.top_n);

        debug!(
            channel = %self.key,
            engaged = engagement.len(),
            candidates = candidates.len(),
            ranked = ranked.len(),
            "Full-vector prediction done"
        );

        let items = to_items(&inputs.catalog, ranked, RecommendedCourse::predicted);
        let bucket = RecommendationBucket::new(self.key, items);

        Ok(if bucket.items.is_empty() {
            bucket.with_message(NO_PREDICTIONS)
        } else {
            bucket
        })
    }

    fn single_seed(
        &self,
        inputs: &ChannelInputs,
        index: &SimilarityIndex,
    ) -> Result<RecommendationBucket, RecommendError> {
        let anchor = self
            .anchor
            .select(&inputs.summary.anchors)
            .and_then(|seed| inputs.catalog.get(seed))
            .ok_or(RecommendError::NoSignal { channel: self.key })?;

        let mut exclude = inputs.owned.clone();
        exclude.extend(
            index
                .neighbors(anchor.id)
                .iter()
                .map(|n| n.course_id)
                .filter(|id| !inputs.catalog.is_eligible(*id)),
        );

        let ranked = PredictFromSeed::execute(anchor.id, index, &exclude, inputs.top_n);

        debug!(
            channel = %self.key,
            anchor = %anchor.id,
            excluded = exclude.len(),
            ranked = ranked.len(),
            "Single-seed prediction done"
        );

        let items = to_items(&inputs.catalog, ranked, RecommendedCourse::similar);
        let bucket = RecommendationBucket::new(self.key, items).with_anchor(anchor);

        Ok(if bucket.items.is_empty() {
            bucket.with_message(NO_SIMILAR_COURSES)
        } else {
            bucket
        })
    }
}

fn similarity(inputs: &ChannelInputs) -> Result<&SimilarityIndex, RecommendError> {
    inputs
        .similarity
        .as_deref()
        .ok_or_else(|| RecommendError::InputUnavailable {
            input: InputKind::Similarity,
            reason: "no similarity snapshot loaded".to_string(),
        })
}

fn to_items(
    catalog: &CourseCatalog,
    ranked: Vec<ScoredCourse>,
    make: fn(CourseSummary, f32) -> RecommendedCourse,
) -> Vec<RecommendedCourse> {
    ranked
        .into_iter()
        .filter_map(|scored| {
            catalog
                .get(scored.course_id)
                .cloned()
                .map(|course| make(course, scored.score))
        })
        .collect()
}
