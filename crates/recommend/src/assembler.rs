//! Recommendation Assembler
//!
//! Builds every channel of one learner's recommendation page.
//!
//! Steps:
//! 1. Fetch all inputs concurrently, each bounded by the fetch timeout
//! 2. Abort only if the catalog is missing; record every other failed input
//! 3. Drop invalid records and signals for courses outside the catalog
//! 4. Aggregate signals into engagement scores and anchors
//! 5. Run every channel as its own blocking task, bounded by the request deadline
//!    or, when fetching used it up, by a short grace window
//! 6. Turn each channel error into a degraded bucket, in declared channel order

use crate::channels::{ChannelInputs, CHANNELS};
use crate::config::RecommenderConfig;
use crate::error::{InputKind, RecommendError};
use crate::signals::AggregateSignals;
use crate::sources::{CatalogSource, InteractionSource, SimilaritySource};
use crate::types::{ChannelKey, InteractionSignal, RecommendationBucket, RecommendationResult};
use learnhub_core::validation::{validate_record, validate_view_record};
use learnhub_core::LearnHubError;
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

pub struct RecommendationAssembler {
    interactions: Arc<dyn InteractionSource>,
    similarity: Arc<dyn SimilaritySource>,
    catalog: Arc<dyn CatalogSource>,
    config: RecommenderConfig,
}

impl RecommendationAssembler {
    pub fn new(
        interactions: Arc<dyn InteractionSource>,
        similarity: Arc<dyn SimilaritySource>,
        catalog: Arc<dyn CatalogSource>,
        config: RecommenderConfig,
    ) -> Self {
        Self {
            interactions,
            similarity,
            catalog,
            config,
        }
    }

    /// Assembler reading every input from one store
    pub fn from_store<S>(store: Arc<S>, config: RecommenderConfig) -> Self
    where
        S: InteractionSource + SimilaritySource + CatalogSource + 'static,
    {
        Self::new(store.clone(), store.clone(), store, config)
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Build all recommendation buckets for a learner
    ///
    /// Only a missing catalog fails the request. Any other problem empties
    /// the affected buckets and says why in their message.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_recommendations(
        &self,
        user_id: Uuid,
    ) -> Result<RecommendationResult, RecommendError> {
        let started = Instant::now();
        let deadline = started + self.config.request_timeout();

        // Step 1: Fetch inputs concurrently
        let (ratings, views, purchases, wishlist, searches, similarity, catalog) = tokio::join!(
            self.fetch(InputKind::Ratings, deadline, self.interactions.ratings(user_id)),
            self.fetch(InputKind::Views, deadline, self.interactions.views(user_id)),
            self.fetch(InputKind::Purchases, deadline, self.interactions.purchases(user_id)),
            self.fetch(InputKind::Wishlist, deadline, self.interactions.wishlist(user_id)),
            self.fetch(InputKind::Searches, deadline, self.interactions.searches(user_id)),
            self.fetch(InputKind::Similarity, deadline, self.similarity.snapshot()),
            self.fetch(InputKind::Catalog, deadline, self.catalog.catalog()),
        );

        // Step 2: The catalog is the only input we cannot degrade around
        let catalog = match catalog {
            Ok(catalog) => catalog,
            Err(err) => {
                let reason = match err {
                    RecommendError::InputUnavailable { reason, .. } => reason,
                    other => other.to_string(),
                };
                let err = RecommendError::CatalogUnavailable { reason };
                error!(error = %err, "Cannot assemble recommendations");
                return Err(err);
            }
        };

        let mut unavailable = BTreeMap::new();
        let ratings = settle(ratings, &mut unavailable);
        let views = settle(views, &mut unavailable);
        let purchases = settle(purchases, &mut unavailable);
        let wishlist = settle(wishlist, &mut unavailable);
        let searches = settle(searches, &mut unavailable);
        let similarity = settle(similarity.map(Some), &mut unavailable);

        // Step 3: Drop invalid records and courses outside the catalog
        let ratings = keep_valid(ratings, InputKind::Ratings, validate_record);
        let views = keep_valid(views, InputKind::Views, validate_view_record);
        let purchases = keep_valid(purchases, InputKind::Purchases, validate_record);
        let wishlist = keep_valid(wishlist, InputKind::Wishlist, validate_record);
        let searches = keep_valid(searches, InputKind::Searches, validate_record);

        let owned: BTreeSet<Uuid> = purchases.iter().map(|p| p.course_id).collect();

        let signals: Vec<InteractionSignal> = ratings
            .into_iter()
            .map(InteractionSignal::from)
            .chain(views.into_iter().map(InteractionSignal::from))
            .chain(purchases.into_iter().map(InteractionSignal::from))
            .chain(wishlist.into_iter().map(InteractionSignal::from))
            .chain(searches.into_iter().map(InteractionSignal::from))
            .filter(|signal| match signal.course_id() {
                Some(course_id) if !catalog.is_eligible(course_id) => {
                    let mismatch = RecommendError::CatalogMismatch { course_id };
                    debug!(error = %mismatch, "Skipping signal");
                    false
                }
                _ => true,
            })
            .collect();

        // Step 4: Aggregate
        let summary = AggregateSignals::execute(&signals, &self.config.weights);

        debug!(
            signals = signals.len(),
            engaged = summary.engagement.len(),
            owned = owned.len(),
            unavailable = unavailable.len(),
            "Signals aggregated"
        );

        let inputs = Arc::new(ChannelInputs {
            catalog,
            similarity,
            summary,
            owned,
            unavailable,
            top_n: self.config.top_n,
        });

        // Steps 5 and 6: Channels
        let grace_until = Instant::now() + self.config.channel_grace();
        if grace_until > deadline {
            debug!(
                grace_ms = self.config.channel_grace_ms,
                "Request deadline spent on fetching; channels run in the grace window"
            );
        }
        let buckets = run_channels(inputs, deadline.max(grace_until)).await;
        let result = RecommendationResult { user_id, buckets };

        info!(
            items = result.total_items(),
            empty_buckets = result
                .buckets
                .iter()
                .filter(|b| b.items.is_empty())
                .count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommendations assembled"
        );

        Ok(result)
    }

    async fn fetch<T, F>(
        &self,
        input: InputKind,
        deadline: Instant,
        request: F,
    ) -> Result<T, RecommendError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        let start = Instant::now();
        let until = std::cmp::min(start + self.config.fetch_timeout(), deadline);

        match timeout_at(until, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(input = %input, error = %format!("{:#}", err), "Input fetch failed");
                Err(RecommendError::input_unavailable(input, &err))
            }
            Err(_) => {
                let bound_ms = until.saturating_duration_since(start).as_millis();
                warn!(input = %input, bound_ms = bound_ms as u64, "Input fetch timed out");
                Err(RecommendError::InputUnavailable {
                    input,
                    reason: format!("no response within {}ms", bound_ms),
                })
            }
        }
    }
}

/// Unwrap a fetched input, recording the failure and substituting an empty value
fn settle<T: Default>(
    fetched: Result<T, RecommendError>,
    unavailable: &mut BTreeMap<InputKind, String>,
) -> T {
    match fetched {
        Ok(value) => value,
        Err(RecommendError::InputUnavailable { input, reason }) => {
            unavailable.insert(input, reason);
            T::default()
        }
        Err(other) => {
            warn!(error = %other, "Unexpected input error");
            T::default()
        }
    }
}

fn keep_valid<T>(
    records: Vec<T>,
    input: InputKind,
    check: impl Fn(&T) -> Result<(), LearnHubError>,
) -> Vec<T> {
    records
        .into_iter()
        .filter(|record| match check(record) {
            Ok(()) => true,
            Err(err) => {
                warn!(input = %input, error = %err, "Skipping invalid record");
                false
            }
        })
        .collect()
}

async fn run_channels(inputs: Arc<ChannelInputs>, deadline: Instant) -> Vec<RecommendationBucket> {
    let mut tasks = JoinSet::new();

    for descriptor in CHANNELS {
        let inputs = Arc::clone(&inputs);
        tasks.spawn_blocking(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| descriptor.compute(&inputs)))
                .unwrap_or_else(|payload| {
                    Err(RecommendError::ChannelFailed {
                        channel: descriptor.key,
                        reason: panic_message(payload.as_ref()),
                    })
                });
            (descriptor.key, outcome)
        });
    }

    let mut outcomes: BTreeMap<ChannelKey, Result<RecommendationBucket, RecommendError>> =
        BTreeMap::new();
    let mut deadline_reached = false;

    loop {
        match timeout_at(deadline, tasks.join_next()).await {
            Ok(Some(Ok((key, outcome)))) => {
                outcomes.insert(key, outcome);
            }
            Ok(Some(Err(err))) => {
                warn!(error = %err, "Channel task did not complete");
            }
            Ok(None) => break,
            Err(_) => {
                warn!(pending = tasks.len(), "Request deadline reached");
                tasks.abort_all();
                deadline_reached = true;
                break;
            }
        }
    }

    CHANNELS
        .iter()
        .map(|descriptor| {
            let channel = descriptor.key;
            let outcome = outcomes.remove(&channel).unwrap_or_else(|| {
                if deadline_reached {
                    Err(RecommendError::ChannelTimedOut { channel })
                } else {
                    Err(RecommendError::ChannelFailed {
                        channel,
                        reason: "channel task was cancelled".to_string(),
                    })
                }
            });

            match outcome {
                Ok(bucket) => bucket,
                Err(err) => {
                    match &err {
                        RecommendError::NoSignal { .. } => {
                            debug!(channel = %channel, error = %err, "Channel has no signal")
                        }
                        _ => warn!(channel = %channel, error = %err, "Channel degraded"),
                    }
                    RecommendationBucket::empty(channel, err.bucket_message())
                }
            }
        })
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "channel panicked".to_string()
    }
}
