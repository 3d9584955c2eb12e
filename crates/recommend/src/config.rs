//! Recommendation engine configuration

use learnhub_core::LearnHubError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Weights of the implicit engagement estimate
///
/// `score = min(views, view_count_cap) * view_count
///        + min(watched_fraction, 1) * watched
///        + purchased * purchase
///        + wishlisted * wishlist`, clamped to `[0, 5]`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngagementWeights {
    /// Weight per view (default: 0.3)
    pub view_count: f32,
    /// Views beyond this count add nothing (default: 5)
    pub view_count_cap: u32,
    /// Weight of the watched fraction (default: 1.0)
    pub watched: f32,
    /// Bonus for a purchased course (default: 2.0)
    pub purchase: f32,
    /// Bonus for a wishlisted course (default: 1.0)
    pub wishlist: f32,
}

impl Default for EngagementWeights {
    fn default() -> Self {
        Self {
            view_count: 0.3,
            view_count_cap: 5,
            watched: 1.0,
            purchase: 2.0,
            wishlist: 1.0,
        }
    }
}

impl EngagementWeights {
    fn validate(&self) -> Result<(), LearnHubError> {
        let weights = [
            ("view_count", self.view_count),
            ("watched", self.watched),
            ("purchase", self.purchase),
            ("wishlist", self.wishlist),
        ];

        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(LearnHubError::configuration(
                    format!("weight {} must be a finite non-negative number, got {}", name, weight),
                    format!("weights.{}", name),
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Items per bucket (default: 10)
    pub top_n: usize,
    /// Upper bound K on neighbor lists read from a snapshot (default: 10)
    pub neighbor_limit: usize,
    /// Budget of a single input fetch in milliseconds (default: 2000)
    pub fetch_timeout_ms: u64,
    /// Budget of a whole request in milliseconds (default: 5000)
    pub request_timeout_ms: u64,
    /// Time channels still get when fetching ran into the request deadline
    /// (default: 100)
    pub channel_grace_ms: u64,
    pub weights: EngagementWeights,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            neighbor_limit: 10,
            fetch_timeout_ms: 2000,
            request_timeout_ms: 5000,
            channel_grace_ms: 100,
            weights: EngagementWeights::default(),
        }
    }
}

impl RecommenderConfig {
    /// Load configuration from `config/recommend.*` and the environment
    ///
    /// Environment keys use the `LEARNHUB_RECOMMEND_` prefix with `__` for
    /// nesting, e.g. `LEARNHUB_RECOMMEND_TOP_N=20` or
    /// `LEARNHUB_RECOMMEND_WEIGHTS__PURCHASE=1.5`.
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/recommend").required(false))
            .add_source(
                config::Environment::with_prefix("LEARNHUB_RECOMMEND")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LearnHubError> {
        if self.top_n == 0 {
            return Err(LearnHubError::configuration(
                "top_n must be greater than 0",
                "top_n",
            ));
        }

        if self.neighbor_limit == 0 {
            return Err(LearnHubError::configuration(
                "neighbor_limit must be greater than 0",
                "neighbor_limit",
            ));
        }

        if self.fetch_timeout_ms == 0 {
            return Err(LearnHubError::configuration(
                "fetch_timeout_ms must be greater than 0",
                "fetch_timeout_ms",
            ));
        }

        if self.request_timeout_ms == 0 {
            return Err(LearnHubError::configuration(
                "request_timeout_ms must be greater than 0",
                "request_timeout_ms",
            ));
        }

        self.weights.validate()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn channel_grace(&self) -> Duration {
        Duration::from_millis(self.channel_grace_ms)
    }
}
