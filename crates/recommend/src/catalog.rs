//! Per-request course catalog snapshot

use learnhub_core::models::CourseSummary;
use learnhub_core::validation::validate_record;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;
use uuid::Uuid;

/// Immutable view of the course catalog, keyed by course id
#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    courses: BTreeMap<Uuid, CourseSummary>,
}

impl CourseCatalog {
    /// Build a catalog, skipping entries that fail validation
    ///
    /// When an id repeats, the later entry replaces the earlier one.
    pub fn from_courses(courses: impl IntoIterator<Item = CourseSummary>) -> Self {
        let mut map = BTreeMap::new();

        for course in courses {
            if let Err(err) = validate_record(&course) {
                warn!(course_id = %course.id, error = %err, "Skipping invalid catalog entry");
                continue;
            }
            map.insert(course.id, course);
        }

        Self { courses: map }
    }

    pub fn get(&self, course_id: Uuid) -> Option<&CourseSummary> {
        self.courses.get(&course_id)
    }

    /// Whether the course exists and is published
    pub fn is_eligible(&self, course_id: Uuid) -> bool {
        self.courses
            .get(&course_id)
            .map(CourseSummary::is_published)
            .unwrap_or(false)
    }

    /// Published course ids in ascending order
    pub fn published_ids(&self) -> BTreeSet<Uuid> {
        self.courses
            .values()
            .filter(|course| course.is_published())
            .map(|course| course.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}
