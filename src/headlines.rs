//! Headline listing scraper.
//!
//! Scrapes the Hacker News front page (or any page laid out the same way)
//! for its title lines. Each title line is a `span.titleline` whose first
//! anchor carries the headline text and the outbound link:
//!
//! ```html
//! <span class="titleline"><a href="https://example.com/post">Post title</a>
//!   <span class="sitebit comhead">(<a href="from?site=example.com">example.com</a>)</span></span>
//! ```
//!
//! Self posts such as "Ask HN" link to a relative `item?id=` URL and are
//! skipped, as is any anchor with no visible text.

use crate::error::HeadlineError;
use crate::http::PageFetcher;
use crate::models::HeadlineRecord;
use crate::utils::collapse_whitespace;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Fetches and parses the configured listing page.
#[derive(Debug)]
pub struct HeadlineSource<F> {
    fetcher: Arc<F>,
    listing_url: String,
    timeout: Duration,
    title_selector: String,
    anchor_selector: String,
}

impl<F: PageFetcher> HeadlineSource<F> {
    pub fn new(
        fetcher: Arc<F>,
        listing_url: impl Into<String>,
        timeout: Duration,
        title_selector: impl Into<String>,
        anchor_selector: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            listing_url: listing_url.into(),
            timeout,
            title_selector: title_selector.into(),
            anchor_selector: anchor_selector.into(),
        }
    }

    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }

    /// Download the listing page and return its headlines in page order.
    ///
    /// # Errors
    ///
    /// - [`HeadlineError::Network`] if the download times out, fails at the
    ///   transport level, or returns a non-2xx status
    /// - [`HeadlineError::UnexpectedParse`] if the page cannot be scraped
    ///
    /// A page with no qualifying anchors is not an error; it yields an empty list.
    #[instrument(level = "info", skip_all, fields(url = %self.listing_url))]
    pub async fn fetch_headlines(&self) -> Result<Vec<HeadlineRecord>, HeadlineError> {
        let page = self
            .fetcher
            .fetch(&self.listing_url, Some(self.timeout))
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch news headlines");
                HeadlineError::Network(e)
            })?;

        let headlines = parse_headlines(&page.body, &self.title_selector, &self.anchor_selector)
            .inspect_err(|e| error!(error = %e, "Headline scraping failed"))?;

        info!(count = headlines.len(), "Indexed headlines");
        Ok(headlines)
    }
}

/// Extract headline records from a listing page.
///
/// For every element matching `title_selector`, the first descendant matching
/// `anchor_selector` becomes a record when it has visible text and an
/// absolute HTTP(S) `href`.
pub fn parse_headlines(
    html: &str,
    title_selector: &str,
    anchor_selector: &str,
) -> Result<Vec<HeadlineRecord>, HeadlineError> {
    let title_sel = compile(title_selector)?;
    let anchor_sel = compile(anchor_selector)?;
    let document = Html::parse_document(html);

    let mut headlines = Vec::new();
    for title_line in document.select(&title_sel) {
        let Some(anchor) = title_line.select(&anchor_sel).next() else {
            continue;
        };
        let title = collapse_whitespace(&anchor.text().collect::<String>());
        let href = anchor.value().attr("href").unwrap_or_default().trim();

        match HeadlineRecord::new(title, href) {
            Some(record) => headlines.push(record),
            None => debug!(%href, "Skipping title line without text or absolute link"),
        }
    }
    Ok(headlines)
}

fn compile(selector: &str) -> Result<Selector, HeadlineError> {
    Selector::parse(selector).map_err(|e| {
        HeadlineError::UnexpectedParse(format!("invalid selector {selector:?}: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::http::testing::MockFetcher;

    const LISTING: &str = "https://news.ycombinator.com/";

    fn front_page() -> String {
        r#"<html><body><table>
        <tr class="athing"><td class="title"><span class="titleline">
            <a href="https://example.com/rust">Rust 2.0 announced</a>
            <span class="sitebit comhead">(<a href="from?site=example.com"><span class="sitestr">example.com</span></a>)</span>
        </span></td></tr>
        <tr class="athing"><td class="title"><span class="titleline">
            <a href="item?id=123">Ask HN: What are you working on?</a>
        </span></td></tr>
        <tr class="athing"><td class="title"><span class="titleline">
            <a href="http://blog.example.org/post">  Show HN:
               a   <b>tiny</b> parser </a>
        </span></td></tr>
        <tr class="athing"><td class="title"><span class="titleline">
            <a href="https://example.net/empty">   </a>
        </span></td></tr>
        <tr class="athing"><td class="title"><span class="titleline">
            <a href="https://example.com/rust">Rust 2.0 announced</a>
        </span></td></tr>
        <tr><td><span class="titleline">no anchor here</span></td></tr>
        </table></body></html>"#
            .to_string()
    }

    fn source(fetcher: MockFetcher) -> HeadlineSource<MockFetcher> {
        HeadlineSource::new(
            Arc::new(fetcher),
            LISTING,
            Duration::from_secs(10),
            "span.titleline",
            "a",
        )
    }

    #[test]
    fn test_parse_keeps_document_order_and_duplicates() {
        let headlines = parse_headlines(&front_page(), "span.titleline", "a").unwrap();
        let titles: Vec<&str> = headlines.iter().map(|h| h.title()).collect();
        assert_eq!(
            titles,
            vec![
                "Rust 2.0 announced",
                "Show HN: a tiny parser",
                "Rust 2.0 announced"
            ]
        );
        assert_eq!(headlines[0].link(), "https://example.com/rust");
        assert_eq!(headlines[1].link(), "http://blog.example.org/post");
        assert_eq!(headlines[0], headlines[2]);
    }

    #[test]
    fn test_parse_uses_first_anchor_only() {
        let html = r#"<span class="titleline"><a href="item?id=1">Self post</a><a href="https://x.io">Other</a></span>"#;
        assert!(parse_headlines(html, "span.titleline", "a").unwrap().is_empty());
    }

    #[test]
    fn test_parse_page_without_title_lines_is_empty() {
        let html = "<html><body><p>Nothing to see</p><a href=\"https://x.io\">x</a></body></html>";
        assert!(parse_headlines(html, "span.titleline", "a").unwrap().is_empty());
        assert!(parse_headlines("", "span.titleline", "a").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_selector_is_unexpected_parse() {
        let err = parse_headlines("<html></html>", "span[", "a").unwrap_err();
        assert!(matches!(err, HeadlineError::UnexpectedParse(_)));
    }

    #[tokio::test]
    async fn test_fetch_headlines_from_listing() {
        let fetcher = MockFetcher::new().with_html(LISTING, &front_page());
        let src = source(fetcher);
        let headlines = src.fetch_headlines().await.unwrap();
        assert_eq!(headlines.len(), 3);
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let fetcher = MockFetcher::new().with_error(
            LISTING,
            FetchError::Timeout {
                url: LISTING.to_string(),
            },
        );
        let err = source(fetcher).fetch_headlines().await.unwrap_err();
        assert!(matches!(err, HeadlineError::Network(FetchError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_non_success_status_is_network_error() {
        let fetcher = MockFetcher::new().with_error(
            LISTING,
            FetchError::Status {
                url: LISTING.to_string(),
                status: 503,
            },
        );
        let err = source(fetcher).fetch_headlines().await.unwrap_err();
        assert!(matches!(
            err,
            HeadlineError::Network(FetchError::Status { status: 503, .. })
        ));
    }
}
