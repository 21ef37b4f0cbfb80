//! Pipeline configuration.
//!
//! Every setting has a default matching the Hacker News front page, so the
//! YAML file passed with `--config` only needs the keys it wants to change:
//!
//! ```yaml
//! listing_url: https://news.ycombinator.com/news?p=2
//! article_ttl_secs: 600
//! summary:
//!   max_length: 150
//! ```
//!
//! Model connection settings are not here; they live in the `awful_aj`
//! config file.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_LISTING_URL: &str = "https://news.ycombinator.com/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36";

/// Settings for the headline, article and summary stages.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Listing page scraped for headlines.
    pub listing_url: String,
    /// User agent sent with every request.
    pub user_agent: String,
    pub listing_timeout_secs: u64,
    pub article_timeout_secs: u64,
    /// How long a scraped headline list stays fresh.
    pub headline_ttl_secs: u64,
    /// How long an extracted article (or extraction failure) stays fresh.
    pub article_ttl_secs: u64,
    /// CSS selector for the element wrapping each headline.
    pub title_selector: String,
    /// CSS selector for the anchor inside a title element.
    pub anchor_selector: String,
    /// Content gate: extracted text must have more characters than this.
    pub min_article_chars: usize,
    pub summary: SummarySettings,
    pub model_retries: usize,
    pub model_retry_base_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            listing_timeout_secs: 10,
            article_timeout_secs: 7,
            headline_ttl_secs: 3600,
            article_ttl_secs: 3600,
            title_selector: "span.titleline".to_string(),
            anchor_selector: "a".to_string(),
            min_article_chars: 200,
            summary: SummarySettings::default(),
            model_retries: 3,
            model_retry_base_ms: 1000,
        }
    }
}

/// Bounds applied around the model call.
///
/// Lengths are counted in whitespace-separated tokens.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SummarySettings {
    pub min_length: usize,
    pub max_length: usize,
    /// Trimmed input of at most this many characters is not summarized.
    pub min_input_chars: usize,
    /// Model input window; longer input is truncated before the call.
    pub max_input_tokens: usize,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            min_length: 30,
            max_length: 130,
            min_input_chars: 50,
            max_input_tokens: 1024,
        }
    }
}

impl PipelineConfig {
    /// Load the config from `path`, or return the defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No pipeline config given; using defaults");
            return Ok(Self::default());
        };
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_string(),
                source,
            })?;
        let config = Self::from_yaml_str(&raw).map_err(|e| match e {
            ConfigError::Yaml { source, .. } => ConfigError::Yaml {
                path: path.to_string(),
                source,
            },
            other => other,
        })?;
        info!(path, listing_url = %config.listing_url, "Loaded pipeline config");
        Ok(config)
    }

    /// Parse and validate a YAML document. An empty document yields the defaults.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(raw).map_err(|source| ConfigError::Yaml {
                path: "<inline>".to_string(),
                source,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the listing URL and validate the result.
    pub fn with_listing_url(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        self.listing_url = url.into();
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.listing_url).is_err() {
            return Err(ConfigError::Invalid(format!(
                "listing_url {} is not an absolute URL",
                self.listing_url
            )));
        }
        if self.summary.min_length > self.summary.max_length {
            return Err(ConfigError::Invalid(format!(
                "summary.min_length {} exceeds summary.max_length {}",
                self.summary.min_length, self.summary.max_length
            )));
        }
        if self.summary.max_length == 0 || self.summary.max_input_tokens == 0 {
            return Err(ConfigError::Invalid(
                "summary lengths must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub fn article_timeout(&self) -> Duration {
        Duration::from_secs(self.article_timeout_secs)
    }

    pub fn headline_ttl(&self) -> Duration {
        Duration::from_secs(self.headline_ttl_secs)
    }

    pub fn article_ttl(&self) -> Duration {
        Duration::from_secs(self.article_ttl_secs)
    }

    pub fn model_retry_base(&self) -> Duration {
        Duration::from_millis(self.model_retry_base_ms)
    }
}
