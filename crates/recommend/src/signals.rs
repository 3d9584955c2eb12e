//! Signal Aggregation
//!
//! Fuses one learner's raw interactions into per-course engagement scores and
//! picks the most recent anchor for each single-seed channel.
//!
//! An explicit rating always wins. Without one, the score is estimated from
//! views, watch progress, purchase and wishlist activity using
//! [`EngagementWeights`]. The result is a pure function of the input slice.

use crate::config::EngagementWeights;
use crate::types::{Anchors, EngagementMap, InteractionSignal, SignalSummary};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::warn;
use uuid::Uuid;

pub const MIN_ENGAGEMENT: f32 = 0.0;
pub const MAX_ENGAGEMENT: f32 = 5.0;

#[derive(Debug, Default)]
struct CourseActivity {
    rating: Option<u8>,
    view_count: u32,
    watched_fraction: f32,
    purchased: bool,
    wishlisted: bool,
}

/// Latest-timestamp tracker; an equal timestamp keeps the first one seen
#[derive(Debug)]
struct Latest<T> {
    best: Option<(DateTime<Utc>, T)>,
}

impl<T> Latest<T> {
    fn new() -> Self {
        Self { best: None }
    }

    fn offer(&mut self, at: DateTime<Utc>, value: T) {
        match &self.best {
            Some((best_at, _)) if at <= *best_at => {}
            _ => self.best = Some((at, value)),
        }
    }

    fn into_value(self) -> Option<T> {
        self.best.map(|(_, value)| value)
    }
}

/// Aggregate a learner's signals into engagement scores and anchors
///
/// Steps:
/// 1. Fold signals per course in arrival order (last rating wins, view
///    counts add up, the largest watched fraction is kept)
/// 2. Score each course: rating if present, implicit estimate otherwise
/// 3. Track the latest view, wishlist entry and search
pub struct AggregateSignals;

impl AggregateSignals {
    pub fn execute(signals: &[InteractionSignal], weights: &EngagementWeights) -> SignalSummary {
        let mut activity: BTreeMap<Uuid, CourseActivity> = BTreeMap::new();
        let mut last_viewed = Latest::new();
        let mut last_wishlisted = Latest::new();
        let mut last_search = Latest::new();

        for signal in signals {
            match signal {
                InteractionSignal::Rating { course_id, value } => {
                    if !(1..=5).contains(value) {
                        warn!(course_id = %course_id, value, "Ignoring out-of-range rating");
                        continue;
                    }
                    activity.entry(*course_id).or_default().rating = Some(*value);
                }
                InteractionSignal::View {
                    course_id,
                    count,
                    last_interaction_at,
                    watched_fraction,
                } => {
                    let entry = activity.entry(*course_id).or_default();
                    entry.view_count = entry.view_count.saturating_add(*count);
                    let fraction = watched_fraction
                        .filter(|f| f.is_finite())
                        .unwrap_or(0.0)
                        .clamp(0.0, 1.0);
                    entry.watched_fraction = entry.watched_fraction.max(fraction);
                    last_viewed.offer(*last_interaction_at, *course_id);
                }
                InteractionSignal::Purchase { course_id, .. } => {
                    activity.entry(*course_id).or_default().purchased = true;
                }
                InteractionSignal::WishlistEntry {
                    course_id,
                    added_at,
                } => {
                    activity.entry(*course_id).or_default().wishlisted = true;
                    last_wishlisted.offer(*added_at, *course_id);
                }
                InteractionSignal::SearchQuery { terms, searched_at } => {
                    last_search.offer(*searched_at, terms.clone());
                }
            }
        }

        let engagement: EngagementMap = activity
            .into_iter()
            .map(|(course_id, activity)| (course_id, Self::score(&activity, weights)))
            .collect();

        SignalSummary {
            engagement,
            anchors: Anchors {
                last_viewed: last_viewed.into_value(),
                last_wishlisted: last_wishlisted.into_value(),
                last_search: last_search.into_value(),
            },
        }
    }

    fn score(activity: &CourseActivity, weights: &EngagementWeights) -> f32 {
        if let Some(rating) = activity.rating {
            return f32::from(rating).clamp(MIN_ENGAGEMENT, MAX_ENGAGEMENT);
        }

        Self::implicit_score(
            activity.view_count,
            activity.watched_fraction,
            activity.purchased,
            activity.wishlisted,
            weights,
        )
    }

    /// Implicit engagement estimate, clamped to `[0, 5]`
    pub fn implicit_score(
        view_count: u32,
        watched_fraction: f32,
        purchased: bool,
        wishlisted: bool,
        weights: &EngagementWeights,
    ) -> f32 {
        let views = view_count.min(weights.view_count_cap) as f32;
        let watched = watched_fraction.clamp(0.0, 1.0);

        let mut score = views * weights.view_count + watched * weights.watched;
        if purchased {
            score += weights.purchase;
        }
        if wishlisted {
            score += weights.wishlist;
        }

        if score.is_finite() {
            score.clamp(MIN_ENGAGEMENT, MAX_ENGAGEMENT)
        } else {
            MIN_ENGAGEMENT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn course(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0).unwrap()
    }

    fn view(n: u128, count: u32, minute: u32, fraction: Option<f32>) -> InteractionSignal {
        InteractionSignal::View {
            course_id: course(n),
            count,
            last_interaction_at: at(minute),
            watched_fraction: fraction,
        }
    }

    #[test]
    fn test_rating_wins_over_implicit_signals() {
        let signals = vec![
            view(1, 10, 0, Some(1.0)),
            InteractionSignal::Purchase {
                course_id: course(1),
                purchased_at: at(1),
            },
            InteractionSignal::Rating {
                course_id: course(1),
                value: 2,
            },
        ];

        let summary = AggregateSignals::execute(&signals, &EngagementWeights::default());
        assert_eq!(summary.engagement[&course(1)], 2.0);
    }

    #[test]
    fn test_last_rating_in_arrival_order_wins() {
        let signals = vec![
            InteractionSignal::Rating {
                course_id: course(1),
                value: 5,
            },
            InteractionSignal::Rating {
                course_id: course(1),
                value: 3,
            },
        ];

        let summary = AggregateSignals::execute(&signals, &EngagementWeights::default());
        assert_eq!(summary.engagement[&course(1)], 3.0);
    }

    #[test]
    fn test_implicit_formula() {
        let weights = EngagementWeights::default();

        // 3 views * 0.3 + 0.5 watched * 1.0
        let score = AggregateSignals::implicit_score(3, 0.5, false, false, &weights);
        assert!((score - 1.4).abs() < 1e-6);

        // views capped at 5: 1.5 + 1.0 + 2.0 + 1.0 = 5.5, clamped to 5
        let score = AggregateSignals::implicit_score(40, 1.0, true, true, &weights);
        assert_eq!(score, MAX_ENGAGEMENT);

        let score = AggregateSignals::implicit_score(0, 0.0, false, true, &weights);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_views_accumulate_and_keep_best_progress() {
        let signals = vec![view(1, 1, 0, Some(0.6)), view(1, 1, 5, Some(0.2))];

        let summary = AggregateSignals::execute(&signals, &EngagementWeights::default());
        // 2 * 0.3 + 0.6
        assert!((summary.engagement[&course(1)] - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_missing_fraction_counts_as_zero() {
        let summary =
            AggregateSignals::execute(&[view(1, 2, 0, None)], &EngagementWeights::default());
        assert!((summary.engagement[&course(1)] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_courses_without_signals_are_absent() {
        let signals = vec![InteractionSignal::SearchQuery {
            terms: "systems programming".to_string(),
            searched_at: at(0),
        }];

        let summary = AggregateSignals::execute(&signals, &EngagementWeights::default());
        assert!(summary.engagement.is_empty());
        assert_eq!(
            summary.anchors.last_search.as_deref(),
            Some("systems programming")
        );
    }

    #[test]
    fn test_invalid_rating_falls_back_to_implicit() {
        let signals = vec![
            InteractionSignal::Rating {
                course_id: course(1),
                value: 9,
            },
            InteractionSignal::WishlistEntry {
                course_id: course(1),
                added_at: at(0),
            },
        ];

        let summary = AggregateSignals::execute(&signals, &EngagementWeights::default());
        assert_eq!(summary.engagement[&course(1)], 1.0);
    }

    #[test]
    fn test_last_viewed_is_latest_timestamp() {
        let signals = vec![
            view(1, 1, 30, None),
            view(2, 1, 45, None),
            view(3, 1, 10, None),
        ];

        let summary = AggregateSignals::execute(&signals, &EngagementWeights::default());
        assert_eq!(summary.anchors.last_viewed, Some(course(2)));
    }

    #[test]
    fn test_anchor_ties_keep_first_seen() {
        let signals = vec![
            InteractionSignal::WishlistEntry {
                course_id: course(7),
                added_at: at(20),
            },
            InteractionSignal::WishlistEntry {
                course_id: course(3),
                added_at: at(20),
            },
        ];

        let summary = AggregateSignals::execute(&signals, &EngagementWeights::default());
        assert_eq!(summary.anchors.last_wishlisted, Some(course(7)));
    }

    #[test]
    fn test_no_signals_no_anchors() {
        let summary = AggregateSignals::execute(&[], &EngagementWeights::default());
        assert!(summary.engagement.is_empty());
        assert_eq!(summary.anchors, Anchors::default());
    }

    #[test]
    fn test_aggregation_is_pure() {
        let signals = vec![
            view(1, 4, 3, Some(0.9)),
            InteractionSignal::WishlistEntry {
                course_id: course(2),
                added_at: at(8),
            },
            InteractionSignal::Rating {
                course_id: course(3),
                value: 4,
            },
        ];
        let weights = EngagementWeights::default();

        let first = AggregateSignals::execute(&signals, &weights);
        let second = AggregateSignals::execute(&signals, &weights);
        assert_eq!(first, second);
    }
}
