//! PostgreSQL-backed learning store
//!
//! Reads the `learning` schema owned by the catalog and activity services.
//! Rows that cannot be mapped onto a record are skipped with a warning so a
//! single bad row never takes an input down.

use crate::catalog::CourseCatalog;
use crate::similarity::SimilarityIndex;
use crate::sources::{CatalogSource, InteractionSource, SimilaritySource};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use learnhub_core::models::{
    CourseStatus, CourseSummary, NeighborRecord, PurchaseRecord, RatingRecord, SearchRecord,
    SimilarityRecord, ViewRecord, WishlistRecord,
};
use learnhub_core::{DatabaseConfig, DatabasePool};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub struct PgLearningStore {
    pool: PgPool,
    neighbor_limit: usize,
    similarity: RwLock<Option<Arc<SimilarityIndex>>>,
}

impl PgLearningStore {
    pub fn new(database: &DatabasePool, neighbor_limit: usize) -> Self {
        Self {
            pool: database.pool().clone(),
            neighbor_limit,
            similarity: RwLock::new(None),
        }
    }

    pub async fn connect(config: &DatabaseConfig, neighbor_limit: usize) -> anyhow::Result<Self> {
        let database = DatabasePool::new(config)
            .await
            .context("Failed to connect to learning database")?;
        Ok(Self::new(&database, neighbor_limit))
    }

    /// Reload the similarity snapshot after the offline job has published a new one
    #[instrument(skip(self))]
    pub async fn refresh_similarity(&self) -> anyhow::Result<Arc<SimilarityIndex>> {
        let index = Arc::new(self.load_similarity().await?);
        *self.similarity.write().await = Some(Arc::clone(&index));
        Ok(index)
    }

    async fn load_similarity(&self) -> anyhow::Result<SimilarityIndex> {
        let rows: Vec<(Uuid, Uuid, f32)> = sqlx::query_as(
            r#"
            SELECT course_id, neighbor_course_id, similarity
            FROM learning.course_similarity
            ORDER BY course_id, rank
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch course similarity")?;

        let records = group_neighbors(rows);
        let index = SimilarityIndex::from_records(records, self.neighbor_limit);

        info!(courses = index.len(), "Loaded similarity snapshot");
        Ok(index)
    }
}

/// Fold `(course, neighbor, similarity)` rows, already ordered by course
fn group_neighbors(rows: Vec<(Uuid, Uuid, f32)>) -> Vec<SimilarityRecord> {
    let mut records: Vec<SimilarityRecord> = Vec::new();

    for (course_id, neighbor_id, similarity) in rows {
        let neighbor = NeighborRecord {
            course_id: neighbor_id,
            similarity,
        };

        match records.last_mut() {
            Some(record) if record.course_id == course_id => record.neighbors.push(neighbor),
            _ => records.push(SimilarityRecord {
                course_id,
                neighbors: vec![neighbor],
            }),
        }
    }

    records
}

type ViewRow = (Uuid, i32, DateTime<Utc>, Option<f32>);

/// Map a `course_views` row, skipping negative counts
fn view_record(user_id: Uuid, row: ViewRow) -> Option<ViewRecord> {
    let (course_id, count, last_interaction_at, watched_fraction) = row;

    match u32::try_from(count) {
        Ok(count) => Some(ViewRecord {
            user_id,
            course_id,
            count,
            last_interaction_at,
            watched_fraction,
        }),
        Err(_) => {
            warn!(course_id = %course_id, count, "Skipping view with negative count");
            None
        }
    }
}

#[async_trait]
impl InteractionSource for PgLearningStore {
    async fn ratings(&self, user_id: Uuid) -> anyhow::Result<Vec<RatingRecord>> {
        let rows: Vec<(Uuid, i16)> = sqlx::query_as(
            "SELECT course_id, rating FROM learning.course_ratings WHERE user_id = $1 ORDER BY rated_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch ratings")?;

        Ok(rows
            .into_iter()
            .filter_map(|(course_id, rating)| match u8::try_from(rating) {
                Ok(value) => Some(RatingRecord {
                    user_id,
                    course_id,
                    value,
                }),
                Err(_) => {
                    warn!(course_id = %course_id, rating, "Skipping rating outside u8 range");
                    None
                }
            })
            .collect())
    }

    async fn views(&self, user_id: Uuid) -> anyhow::Result<Vec<ViewRecord>> {
        let rows: Vec<ViewRow> = sqlx::query_as(
            r#"
            SELECT course_id, view_count, last_viewed_at, watched_fraction
            FROM learning.course_views
            WHERE user_id = $1
            ORDER BY last_viewed_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch course views")?;

        Ok(rows.into_iter().filter_map(|row| view_record(user_id, row)).collect())
    }

    async fn purchases(&self, user_id: Uuid) -> anyhow::Result<Vec<PurchaseRecord>> {
        let rows: Vec<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            "SELECT course_id, purchased_at FROM learning.course_purchases WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch purchases")?;

        Ok(rows
            .into_iter()
            .map(|(course_id, purchased_at)| PurchaseRecord {
                user_id,
                course_id,
                purchased_at,
            })
            .collect())
    }

    async fn wishlist(&self, user_id: Uuid) -> anyhow::Result<Vec<WishlistRecord>> {
        let rows: Vec<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            "SELECT course_id, added_at FROM learning.course_wishlist WHERE user_id = $1 ORDER BY added_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch wishlist")?;

        Ok(rows
            .into_iter()
            .map(|(course_id, added_at)| WishlistRecord {
                user_id,
                course_id,
                added_at,
            })
            .collect())
    }

    async fn searches(&self, user_id: Uuid) -> anyhow::Result<Vec<SearchRecord>> {
        let rows: Vec<(String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT terms, searched_at
            FROM learning.search_history
            WHERE user_id = $1
            ORDER BY searched_at DESC
            LIMIT 20
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch search history")?;

        Ok(rows
            .into_iter()
            .map(|(terms, searched_at)| SearchRecord {
                user_id,
                terms,
                searched_at,
            })
            .collect())
    }
}

#[async_trait]
impl SimilaritySource for PgLearningStore {
    async fn snapshot(&self) -> anyhow::Result<Arc<SimilarityIndex>> {
        if let Some(index) = self.similarity.read().await.as_ref() {
            return Ok(Arc::clone(index));
        }

        self.refresh_similarity().await
    }
}

#[async_trait]
impl CatalogSource for PgLearningStore {
    async fn catalog(&self) -> anyhow::Result<CourseCatalog> {
        let rows: Vec<(Uuid, String, Option<String>, String)> = sqlx::query_as(
            "SELECT id, title, cover_image_url, status FROM learning.courses",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch course catalog")?;

        let courses = rows
            .into_iter()
            .filter_map(|(id, title, cover_image_url, status)| {
                match status.parse::<CourseStatus>() {
                    Ok(status) => Some(CourseSummary {
                        id,
                        title,
                        cover_image_url: cover_image_url.unwrap_or_default(),
                        status,
                    }),
                    Err(err) => {
                        warn!(course_id = %id, error = %err, "Skipping course with unknown status");
                        None
                    }
                }
            });

        Ok(CourseCatalog::from_courses(courses))
    }
}
