//! Integration tests for neighbor-based prediction
//!
//! Exercises the full-vector and single-seed predictors against a snapshot
//! built the same way production builds it.

use learnhub_core::models::SimilarityRecord;
use learnhub_recommend::{
    AggregateSignals, EngagementMap, EngagementWeights, InteractionSignal, PredictAffinity,
    PredictFromSeed, SimilarityIndex,
};
use std::collections::BTreeSet;
use uuid::Uuid;

const A: Uuid = Uuid::from_u128(0xa);
const B: Uuid = Uuid::from_u128(0xb);
const C: Uuid = Uuid::from_u128(0xc);
const D: Uuid = Uuid::from_u128(0xd);
const E: Uuid = Uuid::from_u128(0xe);

fn worked_example_index() -> SimilarityIndex {
    SimilarityIndex::from_records(
        vec![
            SimilarityRecord::new(A, [(B, 0.8), (C, 0.5)]),
            SimilarityRecord::new(D, [(B, 0.6)]),
            SimilarityRecord::new(C, [(E, 0.4)]),
        ],
        10,
    )
}

fn all_courses() -> BTreeSet<Uuid> {
    [A, B, C, D, E].into_iter().collect()
}

#[test]
fn test_worked_example_ranks_a_then_d() {
    let index = worked_example_index();
    let engagement: EngagementMap = [(B, 4.0)].into_iter().collect();

    let ranked = PredictAffinity::execute(&engagement, &index, &all_courses(), 10);

    let ids: Vec<Uuid> = ranked.iter().map(|s| s.course_id).collect();
    assert_eq!(ids, vec![A, D]);
    assert!((ranked[0].score - 4.0).abs() < 1e-6);
    assert!((ranked[1].score - 4.0).abs() < 1e-6);
}

#[test]
fn test_candidate_without_engaged_neighbor_is_absent_not_zero() {
    let index = worked_example_index();
    let engagement: EngagementMap = [(B, 4.0)].into_iter().collect();

    let ranked = PredictAffinity::execute(&engagement, &index, &all_courses(), 10);

    assert!(ranked.iter().all(|s| s.course_id != C));
    assert!(ranked.iter().all(|s| s.course_id != E));
    assert!(ranked.iter().all(|s| s.score > 0.0));
}

#[test]
fn test_prediction_ignores_candidate_order() {
    let index = worked_example_index();
    let engagement: EngagementMap = [(B, 4.0), (E, 2.0)].into_iter().collect();

    let forward: BTreeSet<Uuid> = [A, C, D].into_iter().collect();
    let backward: BTreeSet<Uuid> = [D, C, A].into_iter().collect();

    let first = PredictAffinity::execute(&engagement, &index, &forward, 10);
    let second = PredictAffinity::execute(&engagement, &index, &backward, 10);
    assert_eq!(first, second);
}

#[test]
fn test_snapshot_record_order_does_not_change_results() {
    let records = vec![
        SimilarityRecord::new(A, [(B, 0.5), (C, 0.5), (D, 0.5)]),
        SimilarityRecord::new(E, [(A, 0.9)]),
    ];
    let mut reversed = records.clone();
    reversed.reverse();

    let first = SimilarityIndex::from_records(records, 10);
    let second = SimilarityIndex::from_records(reversed, 10);

    let exclude = BTreeSet::new();
    let from_first = PredictFromSeed::execute(A, &first, &exclude, 10);
    let from_second = PredictFromSeed::execute(A, &second, &exclude, 10);

    assert_eq!(from_first, from_second);
    let ids: Vec<Uuid> = from_first.iter().map(|s| s.course_id).collect();
    assert_eq!(ids, vec![B, C, D]);
}

#[test]
fn test_seed_excludes_itself_and_owned() {
    let index = SimilarityIndex::from_records(
        vec![SimilarityRecord::new(A, [(A, 1.0), (B, 0.9), (C, 0.8), (D, 0.7)])],
        10,
    );
    let owned: BTreeSet<Uuid> = [C].into_iter().collect();

    let ranked = PredictFromSeed::execute(A, &index, &owned, 10);
    let ids: Vec<Uuid> = ranked.iter().map(|s| s.course_id).collect();
    assert_eq!(ids, vec![B, D]);
}

#[test]
fn test_malformed_neighbor_lists_are_treated_as_empty() {
    let index = SimilarityIndex::from_records(
        vec![
            SimilarityRecord::new(A, [(B, f32::NAN)]),
            SimilarityRecord::new(C, [(B, 2.0)]),
            SimilarityRecord::new(D, [(B, 0.6), (B, 0.6)]),
            SimilarityRecord::new(E, [(B, 0.6)]),
        ],
        10,
    );
    let engagement: EngagementMap = [(B, 5.0)].into_iter().collect();

    let ranked = PredictAffinity::execute(&engagement, &index, &all_courses(), 10);
    let ids: Vec<Uuid> = ranked.iter().map(|s| s.course_id).collect();
    assert_eq!(ids, vec![E]);

    assert!(PredictFromSeed::execute(A, &index, &BTreeSet::new(), 10).is_empty());
}

#[test]
fn test_aggregated_engagement_feeds_prediction() {
    let index = worked_example_index();
    let signals = vec![
        InteractionSignal::Rating {
            course_id: B,
            value: 4,
        },
        InteractionSignal::Rating {
            course_id: E,
            value: 2,
        },
    ];

    let summary = AggregateSignals::execute(&signals, &EngagementWeights::default());
    let ranked = PredictAffinity::execute(&summary.engagement, &index, &all_courses(), 10);

    // C now has an engaged neighbor (E), so it ranks after A and D
    let ids: Vec<Uuid> = ranked.iter().map(|s| s.course_id).collect();
    assert_eq!(ids, vec![A, D, C]);
    assert!((ranked[2].score - 2.0).abs() < 1e-6);
}
