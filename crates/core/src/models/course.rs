//! Course catalog records

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Publication state of a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    Draft,
    Published,
    Archived,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Draft => "draft",
            CourseStatus::Published => "published",
            CourseStatus::Archived => "archived",
        }
    }
}

impl std::str::FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(CourseStatus::Draft),
            "published" => Ok(CourseStatus::Published),
            "archived" => Ok(CourseStatus::Archived),
            other => Err(format!("unknown course status '{}'", other)),
        }
    }
}

/// Catalog entry for a course
///
/// Only published courses may be recommended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CourseSummary {
    pub id: Uuid,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub cover_image_url: String,

    pub status: CourseStatus,
}

impl CourseSummary {
    pub fn new(id: Uuid, title: impl Into<String>, status: CourseStatus) -> Self {
        Self {
            id,
            title: title.into(),
            cover_image_url: String::new(),
            status,
        }
    }

    pub fn with_cover_image(mut self, url: impl Into<String>) -> Self {
        self.cover_image_url = url.into();
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == CourseStatus::Published
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_published_is_published() {
        let id = Uuid::from_u128(1);
        assert!(CourseSummary::new(id, "Rust 101", CourseStatus::Published).is_published());
        assert!(!CourseSummary::new(id, "Rust 101", CourseStatus::Draft).is_published());
        assert!(!CourseSummary::new(id, "Rust 101", CourseStatus::Archived).is_published());
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            CourseStatus::Draft,
            CourseStatus::Published,
            CourseStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<CourseStatus>().unwrap(), status);
        }
        assert!("retired".parse::<CourseStatus>().is_err());
    }

    #[test]
    fn test_empty_title_fails_validation() {
        let course = CourseSummary::new(Uuid::from_u128(7), "", CourseStatus::Published);
        assert!(course.validate().is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&CourseStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
    }
}
