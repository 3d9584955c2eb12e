//! Validation utilities for LearnHub records
//!
//! Derived `Validate` impls cover simple ranges; the helpers here add the
//! checks `validator` cannot express (finite floats, duplicate neighbors).

use crate::error::LearnHubError;
use crate::models::{SimilarityRecord, ViewRecord};
use std::collections::HashSet;
use validator::Validate;

/// Run the derived validation of a record and convert the failure
pub fn validate_record<T: Validate>(record: &T) -> Result<(), LearnHubError> {
    record.validate().map_err(LearnHubError::from)
}

/// Validate a star rating
///
/// # Examples
///
/// ```
/// use learnhub_core::validation::validate_rating_value;
///
/// assert!(validate_rating_value(1).is_ok());
/// assert!(validate_rating_value(5).is_ok());
/// assert!(validate_rating_value(0).is_err());
/// ```
pub fn validate_rating_value(value: u8) -> Result<(), LearnHubError> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(LearnHubError::validation_field(
            format!("Rating must be between 1 and 5, got {}", value),
            "value",
        ))
    }
}

/// Validate a watched fraction
///
/// Values above 1.0 pass; the engagement estimate clamps them.
///
/// # Examples
///
/// ```
/// use learnhub_core::validation::validate_watched_fraction;
///
/// assert!(validate_watched_fraction(0.5).is_ok());
/// assert!(validate_watched_fraction(1.05).is_ok());
/// assert!(validate_watched_fraction(-0.2).is_err());
/// assert!(validate_watched_fraction(f32::NAN).is_err());
/// ```
pub fn validate_watched_fraction(fraction: f32) -> Result<(), LearnHubError> {
    if fraction.is_finite() && fraction >= 0.0 {
        Ok(())
    } else {
        Err(LearnHubError::validation_field(
            format!("Watched fraction must be a finite non-negative number, got {}", fraction),
            "watched_fraction",
        ))
    }
}

/// Validate a similarity value
///
/// # Examples
///
/// ```
/// use learnhub_core::validation::validate_similarity_value;
///
/// assert!(validate_similarity_value(-1.0).is_ok());
/// assert!(validate_similarity_value(1.01).is_err());
/// ```
pub fn validate_similarity_value(similarity: f32) -> Result<(), LearnHubError> {
    if similarity.is_finite() && (-1.0..=1.0).contains(&similarity) {
        Ok(())
    } else {
        Err(LearnHubError::validation_field(
            format!("Similarity must be between -1.0 and 1.0, got {}", similarity),
            "similarity",
        ))
    }
}

pub fn validate_view_record(view: &ViewRecord) -> Result<(), LearnHubError> {
    validate_record(view)?;
    match view.watched_fraction {
        Some(fraction) => validate_watched_fraction(fraction),
        None => Ok(()),
    }
}

/// Validate a neighbor list
///
/// Neighbor ids form a set, so a repeated id marks the whole list as
/// malformed. A course listing itself is tolerated; consumers skip it.
pub fn validate_similarity_record(record: &SimilarityRecord) -> Result<(), LearnHubError> {
    let mut seen = HashSet::with_capacity(record.neighbors.len());

    for neighbor in &record.neighbors {
        validate_similarity_value(neighbor.similarity)?;

        if !seen.insert(neighbor.course_id) {
            return Err(LearnHubError::validation_field(
                format!("Duplicate neighbor {} in similarity list", neighbor.course_id),
                "neighbors",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_rating_bounds() {
        for value in 1..=5 {
            assert!(validate_rating_value(value).is_ok());
        }
        assert!(validate_rating_value(0).is_err());
        assert!(validate_rating_value(6).is_err());
    }

    #[test]
    fn test_similarity_rejects_non_finite() {
        assert!(validate_similarity_value(f32::NAN).is_err());
        assert!(validate_similarity_value(f32::INFINITY).is_err());
        assert!(validate_similarity_value(0.0).is_ok());
    }

    #[test]
    fn test_view_record_with_nan_fraction_is_rejected() {
        let view = ViewRecord {
            user_id: Uuid::from_u128(1),
            course_id: Uuid::from_u128(2),
            count: 1,
            last_interaction_at: Utc::now(),
            watched_fraction: Some(f32::NAN),
        };

        match validate_view_record(&view) {
            Err(LearnHubError::ValidationError { field, .. }) => {
                assert_eq!(field.as_deref(), Some("watched_fraction"));
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_neighbors_are_malformed() {
        let b = Uuid::from_u128(2);
        let record = SimilarityRecord::new(Uuid::from_u128(1), [(b, 0.8), (b, 0.4)]);
        assert!(validate_similarity_record(&record).is_err());
    }

    #[test]
    fn test_well_formed_neighbor_list() {
        let record = SimilarityRecord::new(
            Uuid::from_u128(1),
            [(Uuid::from_u128(2), 0.8), (Uuid::from_u128(3), -0.2)],
        );
        assert!(validate_similarity_record(&record).is_ok());
    }

    #[test]
    fn test_out_of_range_neighbor() {
        let record = SimilarityRecord::new(Uuid::from_u128(1), [(Uuid::from_u128(2), -1.5)]);
        assert!(validate_similarity_record(&record).is_err());
    }
}
