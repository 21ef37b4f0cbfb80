//! Pipeline orchestration: "top N headlines" and "summarize headline i".
//!
//! [`Pipeline`] owns the three cache tiers and the per-headline session
//! state:
//!
//! | Tier      | Key          | TTL       | Stores failures? |
//! |-----------|--------------|-----------|------------------|
//! | headlines | listing URL  | 1 hour    | no               |
//! | articles  | article URL  | 1 hour    | yes              |
//! | summaries | article text | none      | no `ModelError`  |
//!
//! The summary tier is content-addressed: two headlines whose articles
//! extract to byte-identical text share one model invocation.
//!
//! Session state maps each headline's identity (title + link) to the last
//! [`SummaryResult`] it produced. It is only written when the user asks for a
//! summary, never refreshed in the background.

use crate::cache::TtlCache;
use crate::config::PipelineConfig;
use crate::error::{ExtractError, HeadlineError, PipelineError};
use crate::extractor::ArticleExtractor;
use crate::headlines::HeadlineSource;
use crate::http::PageFetcher;
use crate::model::SummaryModel;
use crate::models::{HeadlineRecord, SummaryResult};
use crate::summarizer::SummarizationEngine;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{error, info, instrument, warn};

/// Upper bound on how many headlines a caller can ask for.
pub const MAX_HEADLINES: usize = 20;

/// Placeholder shown for a headline that has not been summarized yet.
pub const SUMMARY_PLACEHOLDER: &str = "Click 'Summarize' to get an AI-generated summary.";

/// Message shown when the listing yields nothing.
pub const NO_HEADLINES_MESSAGE: &str =
    "No headlines found or an error occurred. Please try again later.";

/// Result of [`Pipeline::top_headlines`].
///
/// `records` is empty whenever `problem` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct TopHeadlines {
    pub records: Vec<HeadlineRecord>,
    pub problem: Option<HeadlineError>,
}

/// Last known summary per headline identity.
#[derive(Debug, Default)]
pub struct SessionSummaries {
    entries: RwLock<HashMap<HeadlineRecord, SummaryResult>>,
}

impl SessionSummaries {
    pub fn record(&self, headline: &HeadlineRecord, result: SummaryResult) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(headline.clone(), result);
    }

    pub fn get(&self, headline: &HeadlineRecord) -> Option<SummaryResult> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(headline)
            .cloned()
    }

    /// The string to show for `headline`: its last summary or the placeholder.
    pub fn display_text(&self, headline: &HeadlineRecord) -> String {
        self.get(headline)
            .map(|result| result.to_string())
            .unwrap_or_else(|| SUMMARY_PLACEHOLDER.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Composes headline scraping, article extraction and summarization.
pub struct Pipeline<F, M> {
    headlines: HeadlineSource<F>,
    extractor: ArticleExtractor<F>,
    engine: SummarizationEngine<M>,
    headline_cache: TtlCache<String, Vec<HeadlineRecord>>,
    article_cache: TtlCache<String, Result<String, ExtractError>>,
    summary_cache: TtlCache<String, SummaryResult>,
    session: SessionSummaries,
}

impl<F: PageFetcher, M: SummaryModel> Pipeline<F, M> {
    /// Build a pipeline sharing one fetcher between both scrapers and one
    /// model instance for every summary.
    pub fn new(config: &PipelineConfig, fetcher: Arc<F>, model: Arc<M>) -> Self {
        let headlines = HeadlineSource::new(
            Arc::clone(&fetcher),
            config.listing_url.clone(),
            config.listing_timeout(),
            config.title_selector.clone(),
            config.anchor_selector.clone(),
        );
        let extractor =
            ArticleExtractor::new(fetcher, config.article_timeout(), config.min_article_chars);
        let engine = SummarizationEngine::new(model, config.summary.clone());

        Self {
            headlines,
            extractor,
            engine,
            headline_cache: TtlCache::with_ttl("headlines", config.headline_ttl()),
            article_cache: TtlCache::with_ttl("articles", config.article_ttl()),
            summary_cache: TtlCache::unbounded("summaries"),
            session: SessionSummaries::default(),
        }
    }

    pub fn listing_url(&self) -> &str {
        self.headlines.listing_url()
    }

    pub fn session(&self) -> &SessionSummaries {
        &self.session
    }

    async fn listing(&self) -> Result<Vec<HeadlineRecord>, HeadlineError> {
        self.headline_cache
            .get_or_try_compute(self.headlines.listing_url().to_string(), move || {
                self.headlines.fetch_headlines()
            })
            .await
    }

    /// The first `n` headlines in page order, `n` clamped to `1..=20`.
    ///
    /// A failed fetch yields no records and the reported problem.
    #[instrument(level = "info", skip(self))]
    pub async fn top_headlines(&self, n: usize) -> TopHeadlines {
        let n = n.clamp(1, MAX_HEADLINES);
        match self.listing().await {
            Ok(all) => {
                let records: Vec<HeadlineRecord> = all.into_iter().take(n).collect();
                info!(requested = n, returned = records.len(), "Selected top headlines");
                TopHeadlines {
                    records,
                    problem: None,
                }
            }
            Err(e) => {
                error!(error = %e, "Headline listing unavailable");
                TopHeadlines {
                    records: Vec::new(),
                    problem: Some(e),
                }
            }
        }
    }

    /// Summarize the headline at 0-based `index` of the current listing.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Headlines`] if the listing cannot be fetched, and
    /// [`PipelineError::HeadlineIndex`] if `index` is past its end.
    #[instrument(level = "info", skip(self))]
    pub async fn summarize_headline(&self, index: usize) -> Result<SummaryResult, PipelineError> {
        let listing = self.listing().await?;
        let record = listing
            .get(index)
            .ok_or(PipelineError::HeadlineIndex {
                index,
                available: listing.len(),
            })?;
        Ok(self.summarize_record(record).await)
    }

    /// Extract and summarize one headline's article, remembering the outcome
    /// for the session.
    #[instrument(level = "info", skip_all, fields(title = %record.title(), link = %record.link()))]
    pub async fn summarize_record(&self, record: &HeadlineRecord) -> SummaryResult {
        let result = match self.article_text(record.link()).await {
            Some(text) => self.summary_for(text).await,
            None => SummaryResult::ContentUnavailable,
        };
        self.session.record(record, result.clone());
        result
    }

    /// Cached [`ArticleExtractor::extract`].
    pub async fn article_text(&self, url: &str) -> Option<String> {
        self.article_cache
            .get_or_compute(url.to_string(), move || self.extractor.extract_detailed(url))
            .await
            .ok()
    }

    async fn summary_for(&self, text: String) -> SummaryResult {
        let engine = &self.engine;
        let input = text.as_str();
        let outcome = self
            .summary_cache
            .get_or_try_compute(text.clone(), move || async move {
                match engine.summarize(input).await {
                    failed @ SummaryResult::ModelError(_) => Err(failed),
                    done => Ok(done),
                }
            })
            .await;
        match outcome {
            Ok(result) => result,
            Err(failed) => {
                warn!("Model error not cached; a later request will retry");
                failed
            }
        }
    }

    pub fn session_summary(&self, record: &HeadlineRecord) -> Option<SummaryResult> {
        self.session.get(record)
    }

    pub fn display_text(&self, record: &HeadlineRecord) -> String {
        self.session.display_text(record)
    }

    /// Evict expired headline and article entries.
    pub fn purge_expired(&self) -> usize {
        self.headline_cache.purge_expired() + self.article_cache.purge_expired()
    }
}
