//! Error taxonomy for the headline → article → summary pipeline.
//!
//! Every component converts its failures into one of these types at its own
//! boundary. None of them is allowed to take down the orchestrator: listing
//! failures turn into an empty headline list plus a reported problem, and
//! article or model failures turn into a [`SummaryResult`](crate::models::SummaryResult)
//! that the presentation layer shows in place of the summary.

use thiserror::Error;

/// Failure of a single outbound HTTP GET.
///
/// Variants carry rendered messages instead of `reqwest::Error` so results
/// holding them can be cloned into the caches.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not complete within its timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// DNS, TLS, connection reset and other transport-level failures.
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// The response arrived but its body could not be read.
    #[error("failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    /// The headers announced a non-HTML document; the body was not read.
    #[error("{url} serves {content_type}, not HTML")]
    NotHtml { url: String, content_type: String },
}

/// Failure of the headline listing fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeadlineError {
    /// The listing page could not be downloaded.
    #[error("Failed to fetch news headlines: {0}")]
    Network(#[from] FetchError),

    /// The listing page was downloaded but scraping it failed.
    #[error("An unexpected error occurred during headline scraping: {0}")]
    UnexpectedParse(String),
}

/// Reason an article URL yielded no usable text.
///
/// [`ArticleExtractor::extract`](crate::extractor::ArticleExtractor::extract)
/// collapses all of these into `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("download failed: {0}")]
    Download(#[from] FetchError),

    #[error("content type {content_type} is not HTML")]
    NotHtml { content_type: String },

    #[error("readability could not extract an article: {0}")]
    Unreadable(String),

    /// Extracted text did not pass the content gate.
    #[error("extracted text has {chars} characters, need more than {min}")]
    TooShort { chars: usize, min: usize },
}

/// Failure inside the summarization model call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("{0}")]
    Inference(String),

    #[error("model panicked: {0}")]
    Panicked(String),

    #[error("model returned an empty summary")]
    EmptyOutput,

    /// The request asked for sampled decoding, which the backend refuses.
    #[error("sampled decoding is not supported")]
    SamplingUnsupported,
}

impl ModelError {
    /// Whether trying the same request again could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ModelError::SamplingUnsupported)
    }
}

/// Errors returned by [`Pipeline`](crate::pipeline::Pipeline) operations that
/// address a headline by position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no headline at index {index} ({available} available)")]
    HeadlineIndex { index: usize, available: usize },

    #[error(transparent)]
    Headlines(#[from] HeadlineError),
}

/// Errors loading the pipeline configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
