//! Data models for headlines, summaries and the rendered digest.
//!
//! This module defines the core data structures used throughout the application:
//! - [`HeadlineRecord`]: A (title, link) pair scraped from the listing page
//! - [`SummaryResult`]: The outcome of summarizing one headline's article
//! - [`Digest`] and [`DigestEntry`]: What the CLI renders and writes as JSON

use serde::{Deserialize, Serialize};
use std::fmt;

/// A headline scraped from the listing page.
///
/// Identity is the (title, link) pair, so the record itself is the key used
/// for per-headline session state. Records are never deduplicated.
///
/// # Fields
///
/// * `title` - Visible anchor text, whitespace collapsed, never empty
/// * `link` - Absolute URL starting with `http://` or `https://`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "RawHeadline")]
pub struct HeadlineRecord {
    title: String,
    link: String,
}

/// Unchecked wire form of a [`HeadlineRecord`].
#[derive(Deserialize)]
struct RawHeadline {
    title: String,
    link: String,
}

impl TryFrom<RawHeadline> for HeadlineRecord {
    type Error = String;

    fn try_from(raw: RawHeadline) -> Result<Self, Self::Error> {
        HeadlineRecord::new(raw.title, raw.link)
            .ok_or_else(|| "headline needs a title and an absolute http(s) link".to_string())
    }
}

impl HeadlineRecord {
    /// Build a record, returning `None` if the title is blank or the link is
    /// not an absolute HTTP(S) URL.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Option<Self> {
        let title = title.into();
        let link = link.into();
        if title.trim().is_empty() || !has_http_scheme(&link) {
            return None;
        }
        Some(Self { title, link })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    /// Host of the linked article, e.g. `"example.com"` for display.
    pub fn domain(&self) -> Option<String> {
        url::Url::parse(&self.link)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
    }
}

fn has_http_scheme(link: &str) -> bool {
    let lower = link.get(..8).unwrap_or(link).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Outcome of summarizing a headline's article.
///
/// The presentation layer only ever shows the [`Display`](fmt::Display)
/// string, but each outcome stays a distinct value so callers and tests can
/// tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SummaryResult {
    /// The model produced a summary.
    Summary(String),
    /// The article text was too short to be worth sending to the model.
    InsufficientContent,
    /// No usable article text could be retrieved for the headline's link.
    ContentUnavailable,
    /// The model call failed; the detail is shown to the user.
    ModelError(String),
}

impl SummaryResult {
    pub fn is_summary(&self) -> bool {
        matches!(self, SummaryResult::Summary(_))
    }

    /// The summary text, if the model produced one.
    pub fn summary_text(&self) -> Option<&str> {
        match self {
            SummaryResult::Summary(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for SummaryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryResult::Summary(text) => write!(f, "**AI Summary:** {text}"),
            SummaryResult::InsufficientContent => {
                f.write_str("Not enough content to generate a summary.")
            }
            SummaryResult::ContentUnavailable => f.write_str(
                "Could not retrieve meaningful article content for summarization \
                 (link may not be a standard article).",
            ),
            SummaryResult::ModelError(detail) => write!(
                f,
                "Could not summarize this article due to an AI model error: {detail}"
            ),
        }
    }
}

/// One rendered headline card.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DigestEntry {
    /// 1-based position on the listing page.
    pub rank: usize,
    pub title: String,
    pub link: String,
    /// Host of the link, shown next to the title.
    pub domain: Option<String>,
    /// `None` when the user did not ask for this headline to be summarized.
    pub summary: Option<SummaryResult>,
}

/// The full output of one CLI run.
///
/// Serialized to JSON by [`outputs::json`](crate::outputs::json) and
/// rendered as Markdown cards by [`outputs::markdown`](crate::outputs::markdown).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Digest {
    /// The listing URL the headlines were scraped from.
    pub source: String,
    /// RFC 3339 local timestamp of the run.
    pub generated_at: String,
    pub headlines: Vec<DigestEntry>,
    /// Why the headline list is empty, if fetching it failed.
    pub problem: Option<String>,
}
