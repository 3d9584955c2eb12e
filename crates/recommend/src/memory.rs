//! In-memory learning store for tests and local runs

use crate::catalog::CourseCatalog;
use crate::error::InputKind;
use crate::similarity::{SimilarityIndex, DEFAULT_NEIGHBOR_LIMIT};
use crate::sources::{CatalogSource, InteractionSource, SimilaritySource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use learnhub_core::models::{
    CourseSummary, PurchaseRecord, RatingRecord, SearchRecord, SimilarityRecord, ViewRecord,
    WishlistRecord,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Builder-style fixture store implementing every data source
///
/// Any input can be made to fail or to respond slowly, which is how the
/// degradation paths of the assembler are exercised.
///
/// ```
/// use learnhub_core::{CourseStatus, CourseSummary};
/// use learnhub_recommend::memory::InMemoryLearningStore;
/// use uuid::Uuid;
///
/// let rust = Uuid::from_u128(1);
/// let store = InMemoryLearningStore::new()
///     .with_course(CourseSummary::new(rust, "Rust", CourseStatus::Published))
///     .with_rating(Uuid::from_u128(100), rust, 5);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryLearningStore {
    courses: Vec<CourseSummary>,
    ratings: Vec<RatingRecord>,
    views: Vec<ViewRecord>,
    purchases: Vec<PurchaseRecord>,
    wishlist: Vec<WishlistRecord>,
    searches: Vec<SearchRecord>,
    similarity_records: Vec<SimilarityRecord>,
    similarity: Arc<SimilarityIndex>,
    neighbor_limit: usize,
    failing: BTreeSet<InputKind>,
    delays: BTreeMap<InputKind, Duration>,
}

impl Default for InMemoryLearningStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLearningStore {
    pub fn new() -> Self {
        Self {
            courses: Vec::new(),
            ratings: Vec::new(),
            views: Vec::new(),
            purchases: Vec::new(),
            wishlist: Vec::new(),
            searches: Vec::new(),
            similarity_records: Vec::new(),
            similarity: Arc::new(SimilarityIndex::default()),
            neighbor_limit: DEFAULT_NEIGHBOR_LIMIT,
            failing: BTreeSet::new(),
            delays: BTreeMap::new(),
        }
    }

    pub fn with_course(mut self, course: CourseSummary) -> Self {
        self.courses.push(course);
        self
    }

    pub fn with_rating(mut self, user_id: Uuid, course_id: Uuid, value: u8) -> Self {
        self.ratings.push(RatingRecord {
            user_id,
            course_id,
            value,
        });
        self
    }

    pub fn with_view(
        mut self,
        user_id: Uuid,
        course_id: Uuid,
        count: u32,
        last_interaction_at: DateTime<Utc>,
        watched_fraction: Option<f32>,
    ) -> Self {
        self.views.push(ViewRecord {
            user_id,
            course_id,
            count,
            last_interaction_at,
            watched_fraction,
        });
        self
    }

    pub fn with_purchase(mut self, user_id: Uuid, course_id: Uuid, at: DateTime<Utc>) -> Self {
        self.purchases.push(PurchaseRecord {
            user_id,
            course_id,
            purchased_at: at,
        });
        self
    }

    pub fn with_wishlist(mut self, user_id: Uuid, course_id: Uuid, at: DateTime<Utc>) -> Self {
        self.wishlist.push(WishlistRecord {
            user_id,
            course_id,
            added_at: at,
        });
        self
    }

    pub fn with_search(mut self, user_id: Uuid, terms: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.searches.push(SearchRecord {
            user_id,
            terms: terms.into(),
            searched_at: at,
        });
        self
    }

    /// Add the neighbor list of one course
    pub fn with_similarity(
        self,
        course_id: Uuid,
        neighbors: impl IntoIterator<Item = (Uuid, f32)>,
    ) -> Self {
        self.with_similarity_records([SimilarityRecord::new(course_id, neighbors)])
    }

    pub fn with_similarity_records(
        mut self,
        records: impl IntoIterator<Item = SimilarityRecord>,
    ) -> Self {
        self.similarity_records.extend(records);
        self.rebuild_index();
        self
    }

    pub fn with_neighbor_limit(mut self, neighbor_limit: usize) -> Self {
        self.neighbor_limit = neighbor_limit;
        self.rebuild_index();
        self
    }

    /// Make every fetch of `input` fail
    pub fn fail_input(mut self, input: InputKind) -> Self {
        self.failing.insert(input);
        self
    }

    /// Delay every fetch of `input` by `delay`
    pub fn delay_input(mut self, input: InputKind, delay: Duration) -> Self {
        self.delays.insert(input, delay);
        self
    }

    fn rebuild_index(&mut self) {
        self.similarity = Arc::new(SimilarityIndex::from_records(
            self.similarity_records.clone(),
            self.neighbor_limit,
        ));
    }

    async fn gate(&self, input: InputKind) -> anyhow::Result<()> {
        if let Some(delay) = self.delays.get(&input) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.contains(&input) {
            anyhow::bail!("{} store unavailable", input);
        }

        Ok(())
    }
}

fn for_user<T: Clone>(records: &[T], user_id: Uuid, owner: impl Fn(&T) -> Uuid) -> Vec<T> {
    records
        .iter()
        .filter(|record| owner(record) == user_id)
        .cloned()
        .collect()
}

#[async_trait]
impl InteractionSource for InMemoryLearningStore {
    async fn ratings(&self, user_id: Uuid) -> anyhow::Result<Vec<RatingRecord>> {
        self.gate(InputKind::Ratings).await?;
        Ok(for_user(&self.ratings, user_id, |r| r.user_id))
    }

    async fn views(&self, user_id: Uuid) -> anyhow::Result<Vec<ViewRecord>> {
        self.gate(InputKind::Views).await?;
        Ok(for_user(&self.views, user_id, |r| r.user_id))
    }

    async fn purchases(&self, user_id: Uuid) -> anyhow::Result<Vec<PurchaseRecord>> {
        self.gate(InputKind::Purchases).await?;
        Ok(for_user(&self.purchases, user_id, |r| r.user_id))
    }

    async fn wishlist(&self, user_id: Uuid) -> anyhow::Result<Vec<WishlistRecord>> {
        self.gate(InputKind::Wishlist).await?;
        Ok(for_user(&self.wishlist, user_id, |r| r.user_id))
    }

    async fn searches(&self, user_id: Uuid) -> anyhow::Result<Vec<SearchRecord>> {
        self.gate(InputKind::Searches).await?;
        Ok(for_user(&self.searches, user_id, |r| r.user_id))
    }
}

#[async_trait]
impl SimilaritySource for InMemoryLearningStore {
    async fn snapshot(&self) -> anyhow::Result<Arc<SimilarityIndex>> {
        self.gate(InputKind::Similarity).await?;
        Ok(Arc::clone(&self.similarity))
    }
}

#[async_trait]
impl CatalogSource for InMemoryLearningStore {
    async fn catalog(&self) -> anyhow::Result<CourseCatalog> {
        self.gate(InputKind::Catalog).await?;
        Ok(CourseCatalog::from_courses(self.courses.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnhub_core::CourseStatus;

    #[tokio::test]
    async fn test_records_are_scoped_to_user() {
        let alice = Uuid::from_u128(100);
        let bob = Uuid::from_u128(200);
        let course = Uuid::from_u128(1);

        let store = InMemoryLearningStore::new()
            .with_rating(alice, course, 5)
            .with_rating(bob, course, 2);

        let ratings = store.ratings(alice).await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].value, 5);
    }

    #[tokio::test]
    async fn test_failing_input() {
        let store = InMemoryLearningStore::new().fail_input(InputKind::Wishlist);

        let err = store.wishlist(Uuid::from_u128(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "wishlist store unavailable");
        assert!(store.views(Uuid::from_u128(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_catalog_and_snapshot() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let store = InMemoryLearningStore::new()
            .with_course(CourseSummary::new(a, "A", CourseStatus::Published))
            .with_similarity(a, [(b, 0.5)]);

        let catalog = store.catalog().await.unwrap();
        assert!(catalog.is_eligible(a));

        let index = store.snapshot().await.unwrap();
        assert_eq!(index.neighbors(a).len(), 1);
    }

    #[tokio::test]
    async fn test_neighbor_limit_applies_to_existing_records() {
        let a = Uuid::from_u128(1);
        let store = InMemoryLearningStore::new()
            .with_similarity(a, (2..6).map(|n| (Uuid::from_u128(n), 0.5)))
            .with_neighbor_limit(2);

        let index = store.snapshot().await.unwrap();
        assert_eq!(index.neighbors(a).len(), 2);
    }
}
