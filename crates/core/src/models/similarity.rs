//! Precomputed course-to-course similarity records
//!
//! Produced by an offline job. Each record holds the top-K neighbors of one
//! course; the recommendation core treats them as authoritative.
//!
//! Range checks live in [`crate::validation::validate_similarity_record`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborRecord {
    pub course_id: Uuid,

    /// Content similarity, -1.0 to 1.0
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRecord {
    pub course_id: Uuid,
    pub neighbors: Vec<NeighborRecord>,
}

impl SimilarityRecord {
    pub fn new(course_id: Uuid, neighbors: impl IntoIterator<Item = (Uuid, f32)>) -> Self {
        Self {
            course_id,
            neighbors: neighbors
                .into_iter()
                .map(|(course_id, similarity)| NeighborRecord {
                    course_id,
                    similarity,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_preserves_neighbor_order() {
        let record = SimilarityRecord::new(
            Uuid::from_u128(1),
            [(Uuid::from_u128(3), 0.4), (Uuid::from_u128(2), 0.9)],
        );
        let ids: Vec<Uuid> = record.neighbors.iter().map(|n| n.course_id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(3), Uuid::from_u128(2)]);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = r#"[{
            "course_id": "00000000-0000-0000-0000-00000000000a",
            "neighbors": [
                {"course_id": "00000000-0000-0000-0000-00000000000b", "similarity": 0.8}
            ]
        }]"#;

        let records: Vec<SimilarityRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].neighbors[0].course_id, Uuid::from_u128(0xb));
    }
}
