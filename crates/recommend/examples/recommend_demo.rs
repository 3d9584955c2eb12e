//! Recommendation pipeline demo
//!
//! Builds a small catalog in memory and prints one learner's buckets as JSON.
//!
//! Run with:
//! ```bash
//! LEARNHUB_LOG_FORMAT=pretty cargo run -p learnhub-recommend --example recommend_demo
//! ```
//!
//! Set `LEARNHUB_SIMILARITY_SNAPSHOT` to a JSON snapshot file to use it in
//! place of the built-in neighbor lists.

use anyhow::Result;
use chrono::{Duration, Utc};
use learnhub_core::{init_logging, load_dotenv, CourseStatus, CourseSummary, LogConfig};
use learnhub_recommend::{
    CatalogSource, InMemoryLearningStore, InteractionSource, JsonSimilaritySnapshot,
    RecommendationAssembler, RecommenderConfig, SimilaritySource,
};
use std::sync::Arc;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    init_logging(&LogConfig::from_env())?;

    let config = RecommenderConfig::load()?;

    let learner = Uuid::new_v4();
    let courses: Vec<(Uuid, &str)> = [
        "Rust Basics",
        "Ownership and Borrowing",
        "Async Rust",
        "Building CLI Tools",
        "Web Services with Rust",
        "Embedded Rust",
    ]
    .into_iter()
    .map(|title| (Uuid::new_v4(), title))
    .collect();
    let id = |i: usize| courses[i].0;

    let now = Utc::now();
    let mut store = InMemoryLearningStore::new().with_neighbor_limit(config.neighbor_limit);
    for (course_id, title) in &courses {
        store = store.with_course(
            CourseSummary::new(*course_id, *title, CourseStatus::Published)
                .with_cover_image(format!("https://cdn.learnhub.dev/covers/{}.png", course_id)),
        );
    }

    let store = store
        .with_similarity(id(0), [(id(1), 0.92), (id(2), 0.71), (id(3), 0.44)])
        .with_similarity(id(1), [(id(0), 0.92), (id(2), 0.65)])
        .with_similarity(id(2), [(id(4), 0.83), (id(1), 0.65), (id(0), 0.71)])
        .with_similarity(id(3), [(id(4), 0.52), (id(0), 0.44)])
        .with_similarity(id(4), [(id(2), 0.83), (id(3), 0.52), (id(5), 0.18)])
        .with_similarity(id(5), [(id(4), 0.18), (id(3), 0.31)])
        .with_rating(learner, id(0), 5)
        .with_purchase(learner, id(0), now - Duration::days(30))
        .with_view(learner, id(1), 4, now - Duration::days(2), Some(0.6))
        .with_view(learner, id(2), 1, now - Duration::hours(3), Some(0.1))
        .with_wishlist(learner, id(3), now - Duration::days(5))
        .with_search(learner, "rust web frameworks", now - Duration::hours(1));
    let store = Arc::new(store);

    let similarity: Arc<dyn SimilaritySource> =
        match std::env::var("LEARNHUB_SIMILARITY_SNAPSHOT") {
            Ok(path) => Arc::new(JsonSimilaritySnapshot::load(path, config.neighbor_limit).await?),
            Err(_) => store.clone(),
        };
    let interactions: Arc<dyn InteractionSource> = store.clone();
    let catalog: Arc<dyn CatalogSource> = store;

    let assembler = RecommendationAssembler::new(interactions, similarity, catalog, config);
    let result = assembler.get_recommendations(learner).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
