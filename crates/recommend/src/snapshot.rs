//! Similarity snapshot loaded from a JSON file
//!
//! The offline similarity job writes a JSON array of [`SimilarityRecord`]s.
//! The file is read once at startup and the index shared by every request.
//!
//! [`SimilarityRecord`]: learnhub_core::models::SimilarityRecord

use crate::similarity::SimilarityIndex;
use crate::sources::SimilaritySource;
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct JsonSimilaritySnapshot {
    index: Arc<SimilarityIndex>,
}

impl JsonSimilaritySnapshot {
    pub async fn load(path: impl AsRef<Path>, neighbor_limit: usize) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read similarity snapshot {}", path.display()))?;

        let index = SimilarityIndex::from_json(&json, neighbor_limit)
            .with_context(|| format!("Failed to parse similarity snapshot {}", path.display()))?;

        info!(path = %path.display(), courses = index.len(), "Loaded similarity snapshot");
        Ok(Self::from_index(index))
    }

    pub fn from_index(index: SimilarityIndex) -> Self {
        Self {
            index: Arc::new(index),
        }
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }
}

#[async_trait]
impl SimilaritySource for JsonSimilaritySnapshot {
    async fn snapshot(&self) -> anyhow::Result<Arc<SimilarityIndex>> {
        Ok(Arc::clone(&self.index))
    }
}
