//! Neighbor-based prediction
//!
//! Item-to-item KNN over the precomputed similarity index. Nothing here
//! compares courses at request time: every score comes from a bounded
//! neighbor list, so the full-vector pass is `O(candidates * K)` and the
//! single-seed pass is `O(K log K)`.

use crate::ranking::top_n;
use crate::similarity::SimilarityIndex;
use crate::types::{EngagementMap, ScoredCourse};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Default number of ranked courses returned
pub const DEFAULT_TOP_N: usize = 10;

/// Full-vector prediction over a learner's whole engagement map
///
/// For every candidate the learner has not engaged with:
///
/// ```text
/// predicted(c) = Σ sim(c, i) * engagement[i] / Σ sim(c, i)
/// ```
///
/// summed over the neighbors `i` of `c` that the learner engaged with and
/// whose similarity is positive. A candidate without such a neighbor is
/// left out rather than scored 0.
pub struct PredictAffinity;

impl PredictAffinity {
    pub fn execute(
        engagement: &EngagementMap,
        index: &SimilarityIndex,
        candidates: &BTreeSet<Uuid>,
        limit: usize,
    ) -> Vec<ScoredCourse> {
        let scored: Vec<ScoredCourse> = candidates
            .iter()
            .filter(|course_id| !engagement.contains_key(*course_id))
            .filter_map(|&course_id| {
                Self::predict_one(course_id, engagement, index)
                    .map(|score| ScoredCourse { course_id, score })
            })
            .collect();

        top_n(scored, |s| s.score, limit, |s| s.course_id)
    }

    /// Weighted average of engagement over the candidate's positive neighbors
    pub fn predict_one(
        candidate: Uuid,
        engagement: &EngagementMap,
        index: &SimilarityIndex,
    ) -> Option<f32> {
        let mut weighted = 0.0_f32;
        let mut total_similarity = 0.0_f32;

        for neighbor in index.neighbors(candidate) {
            if neighbor.similarity <= 0.0 {
                continue;
            }
            if let Some(score) = engagement.get(&neighbor.course_id) {
                weighted += neighbor.similarity * score;
                total_similarity += neighbor.similarity;
            }
        }

        if total_similarity > 0.0 {
            let predicted = weighted / total_similarity;
            predicted.is_finite().then_some(predicted)
        } else {
            None
        }
    }
}

/// Single-seed prediction: the seed's own neighbor list, filtered
///
/// Engagement plays no part. The score of each result is its similarity to
/// the seed. Negative similarities stay in the list; they can only surface
/// when the seed has fewer than `limit` positive neighbors.
pub struct PredictFromSeed;

impl PredictFromSeed {
    pub fn execute(
        seed: Uuid,
        index: &SimilarityIndex,
        exclude: &BTreeSet<Uuid>,
        limit: usize,
    ) -> Vec<ScoredCourse> {
        let scored: Vec<ScoredCourse> = index
            .neighbors(seed)
            .iter()
            .filter(|n| n.course_id != seed && !exclude.contains(&n.course_id))
            .map(|n| ScoredCourse {
                course_id: n.course_id,
                score: n.similarity,
            })
            .collect();

        top_n(scored, |s| s.score, limit, |s| s.course_id)
    }
}
