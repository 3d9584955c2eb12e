//! Read-only data sources consumed by the assembler

use crate::catalog::CourseCatalog;
use crate::similarity::SimilarityIndex;
use async_trait::async_trait;
use learnhub_core::models::{
    PurchaseRecord, RatingRecord, SearchRecord, ViewRecord, WishlistRecord,
};
use std::sync::Arc;
use uuid::Uuid;

/// Per-learner interaction history
#[async_trait]
pub trait InteractionSource: Send + Sync {
    async fn ratings(&self, user_id: Uuid) -> anyhow::Result<Vec<RatingRecord>>;

    async fn views(&self, user_id: Uuid) -> anyhow::Result<Vec<ViewRecord>>;

    async fn purchases(&self, user_id: Uuid) -> anyhow::Result<Vec<PurchaseRecord>>;

    async fn wishlist(&self, user_id: Uuid) -> anyhow::Result<Vec<WishlistRecord>>;

    /// Search history feeds no channel yet
    async fn searches(&self, _user_id: Uuid) -> anyhow::Result<Vec<SearchRecord>> {
        Ok(Vec::new())
    }
}

/// Precomputed course similarity, shared by every request
#[async_trait]
pub trait SimilaritySource: Send + Sync {
    async fn snapshot(&self) -> anyhow::Result<Arc<SimilarityIndex>>;
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn catalog(&self) -> anyhow::Result<CourseCatalog>;
}
