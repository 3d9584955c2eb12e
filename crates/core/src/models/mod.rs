//! Read-only records supplied by the surrounding platform
//!
//! The recommendation core never writes these; they arrive from the catalog
//! and interaction stores owned by other services.

pub mod course;
pub mod interaction;
pub mod similarity;

pub use course::{CourseStatus, CourseSummary};
pub use interaction::{PurchaseRecord, RatingRecord, SearchRecord, ViewRecord, WishlistRecord};
pub use similarity::{NeighborRecord, SimilarityRecord};
