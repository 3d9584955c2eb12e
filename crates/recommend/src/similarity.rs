//! Immutable course similarity index
//!
//! Built once per snapshot from [`SimilarityRecord`]s. Each neighbor list is
//! sorted by descending similarity (ties by ascending id), stripped of
//! self-references and cut to the configured top-K bound. A malformed list
//! is kept as an empty list so the course simply has no neighbors.

use crate::error::RecommendError;
use crate::ranking::sort_descending;
use learnhub_core::models::SimilarityRecord;
use learnhub_core::validation::validate_similarity_record;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};
use uuid::Uuid;

/// Default top-K bound of a neighbor list
pub const DEFAULT_NEIGHBOR_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub course_id: Uuid,
    pub similarity: f32,
}

#[derive(Debug, Clone, Default)]
pub struct SimilarityIndex {
    neighbors: BTreeMap<Uuid, Vec<Neighbor>>,
    rejected: BTreeSet<Uuid>,
    neighbor_limit: usize,
}

impl SimilarityIndex {
    pub fn from_records(
        records: impl IntoIterator<Item = SimilarityRecord>,
        neighbor_limit: usize,
    ) -> Self {
        let mut index = Self {
            neighbors: BTreeMap::new(),
            rejected: BTreeSet::new(),
            neighbor_limit,
        };

        for record in records {
            if let Err(err) = index.insert(record) {
                warn!(error = %err, "Treating course as having no neighbors");
            }
        }

        debug!(
            courses = index.neighbors.len(),
            rejected = index.rejected.len(),
            neighbor_limit,
            "Similarity index built"
        );

        index
    }

    /// Parse a JSON array of similarity records
    pub fn from_json(json: &str, neighbor_limit: usize) -> Result<Self, serde_json::Error> {
        let records: Vec<SimilarityRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records, neighbor_limit))
    }

    fn insert(&mut self, record: SimilarityRecord) -> Result<(), RecommendError> {
        let course_id = record.course_id;

        if self.rejected.contains(&course_id) {
            return Ok(());
        }

        if self.neighbors.contains_key(&course_id) {
            self.reject(course_id);
            return Err(RecommendError::InvalidSimilarityData {
                course_id,
                reason: "course appears more than once in the snapshot".to_string(),
            });
        }

        if let Err(err) = validate_similarity_record(&record) {
            self.reject(course_id);
            return Err(RecommendError::InvalidSimilarityData {
                course_id,
                reason: err.to_string(),
            });
        }

        let mut neighbors: Vec<Neighbor> = record
            .neighbors
            .into_iter()
            .filter(|n| n.course_id != course_id)
            .map(|n| Neighbor {
                course_id: n.course_id,
                similarity: n.similarity,
            })
            .collect();

        sort_descending(&mut neighbors, |n| n.similarity, |n| n.course_id);

        if neighbors.len() > self.neighbor_limit {
            debug!(
                course_id = %course_id,
                len = neighbors.len(),
                limit = self.neighbor_limit,
                "Truncating neighbor list"
            );
            neighbors.truncate(self.neighbor_limit);
        }

        self.neighbors.insert(course_id, neighbors);
        Ok(())
    }

    fn reject(&mut self, course_id: Uuid) {
        self.neighbors.insert(course_id, Vec::new());
        self.rejected.insert(course_id);
    }

    /// Neighbors of a course, best first; empty when unknown or malformed
    pub fn neighbors(&self, course_id: Uuid) -> &[Neighbor] {
        self.neighbors
            .get(&course_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, course_id: Uuid) -> bool {
        self.neighbors.contains_key(&course_id)
    }

    pub fn is_rejected(&self, course_id: Uuid) -> bool {
        self.rejected.contains(&course_id)
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn neighbor_limit(&self) -> usize {
        self.neighbor_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_neighbors_sorted_best_first() {
        let index = SimilarityIndex::from_records(
            vec![SimilarityRecord::new(
                id(1),
                [(id(4), 0.2), (id(2), 0.9), (id(3), 0.5)],
            )],
            DEFAULT_NEIGHBOR_LIMIT,
        );

        let ids: Vec<Uuid> = index.neighbors(id(1)).iter().map(|n| n.course_id).collect();
        assert_eq!(ids, vec![id(2), id(3), id(4)]);
    }

    #[test]
    fn test_equal_similarity_orders_by_id() {
        let index = SimilarityIndex::from_records(
            vec![SimilarityRecord::new(id(1), [(id(9), 0.5), (id(3), 0.5)])],
            DEFAULT_NEIGHBOR_LIMIT,
        );

        let ids: Vec<Uuid> = index.neighbors(id(1)).iter().map(|n| n.course_id).collect();
        assert_eq!(ids, vec![id(3), id(9)]);
    }

    #[test]
    fn test_unknown_course_has_no_neighbors() {
        let index = SimilarityIndex::default();
        assert!(index.neighbors(id(42)).is_empty());
        assert!(!index.contains(id(42)));
    }

    #[test]
    fn test_lists_are_bounded() {
        let neighbors: Vec<(Uuid, f32)> = (2..30).map(|n| (id(n), n as f32 / 100.0)).collect();
        let index =
            SimilarityIndex::from_records(vec![SimilarityRecord::new(id(1), neighbors)], 10);

        let list = index.neighbors(id(1));
        assert_eq!(list.len(), 10);
        assert_eq!(list[0].course_id, id(29));
    }

    #[test]
    fn test_self_reference_is_dropped() {
        let index = SimilarityIndex::from_records(
            vec![SimilarityRecord::new(id(1), [(id(1), 1.0), (id(2), 0.7)])],
            DEFAULT_NEIGHBOR_LIMIT,
        );

        assert_eq!(index.neighbors(id(1)).len(), 1);
        assert_eq!(index.neighbors(id(1))[0].course_id, id(2));
    }

    #[test]
    fn test_malformed_lists_become_empty() {
        let index = SimilarityIndex::from_records(
            vec![
                SimilarityRecord::new(id(1), [(id(2), f32::NAN)]),
                SimilarityRecord::new(id(3), [(id(4), 1.7)]),
                SimilarityRecord::new(id(5), [(id(6), 0.4), (id(6), 0.3)]),
                SimilarityRecord::new(id(7), [(id(8), 0.6)]),
            ],
            DEFAULT_NEIGHBOR_LIMIT,
        );

        for course in [id(1), id(3), id(5)] {
            assert!(index.neighbors(course).is_empty());
            assert!(index.is_rejected(course));
        }
        assert_eq!(index.neighbors(id(7)).len(), 1);
    }

    #[test]
    fn test_duplicate_course_record_is_rejected() {
        let index = SimilarityIndex::from_records(
            vec![
                SimilarityRecord::new(id(1), [(id(2), 0.8)]),
                SimilarityRecord::new(id(1), [(id(3), 0.6)]),
                SimilarityRecord::new(id(1), [(id(4), 0.6)]),
            ],
            DEFAULT_NEIGHBOR_LIMIT,
        );

        assert!(index.neighbors(id(1)).is_empty());
        assert!(index.is_rejected(id(1)));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"course_id": "00000000-0000-0000-0000-000000000001",
             "neighbors": [{"course_id": "00000000-0000-0000-0000-000000000002", "similarity": 0.8}]}
        ]"#;

        let index = SimilarityIndex::from_json(json, DEFAULT_NEIGHBOR_LIMIT).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.neighbors(id(1))[0].similarity, 0.8);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(SimilarityIndex::from_json("{not json", DEFAULT_NEIGHBOR_LIMIT).is_err());
    }
}
