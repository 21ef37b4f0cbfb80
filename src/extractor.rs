//! Article body extraction.
//!
//! Headlines on an aggregator point anywhere: news sites, blogs, GitHub
//! repos, PDFs, discussion threads. [`ArticleExtractor`] downloads the page,
//! runs Readability (via `dom_smoothie`) to find the main text, and then
//! applies one content gate: the text must be longer than
//! `min_chars` characters. Long threads pass and short real articles fail;
//! that is the accepted cost of a single cheap heuristic.

use crate::error::{ExtractError, FetchError};
use crate::http::PageFetcher;
use crate::utils::normalize_text;
use dom_smoothie::Readability;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Downloads article pages and extracts their main text.
#[derive(Debug)]
pub struct ArticleExtractor<F> {
    fetcher: Arc<F>,
    timeout: Duration,
    min_chars: usize,
}

impl<F: PageFetcher> ArticleExtractor<F> {
    pub fn new(fetcher: Arc<F>, timeout: Duration, min_chars: usize) -> Self {
        Self {
            fetcher,
            timeout,
            min_chars,
        }
    }

    /// The article text at `url`, or `None` if it is not a usable article.
    ///
    /// Download failures, non-HTML pages, unreadable documents and text that
    /// fails the content gate all come back as `None`.
    pub async fn extract(&self, url: &str) -> Option<String> {
        self.extract_detailed(url).await.ok()
    }

    /// Like [`extract`](Self::extract), but says why no article was found.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn extract_detailed(&self, url: &str) -> Result<String, ExtractError> {
        let result = self.download_and_extract(url).await;
        match &result {
            Ok(text) => info!(chars = text.chars().count(), "Extracted article text"),
            Err(e) => warn!(error = %e, "No usable article content"),
        }
        result
    }

    async fn download_and_extract(&self, url: &str) -> Result<String, ExtractError> {
        let page = match self.fetcher.fetch(url, Some(self.timeout)).await {
            Ok(page) => page,
            Err(FetchError::NotHtml { content_type, .. }) => {
                return Err(ExtractError::NotHtml { content_type });
            }
            Err(e) => return Err(e.into()),
        };
        let text = readable_text(&page.body, &page.url)?;
        apply_content_gate(text, self.min_chars)
    }
}

/// Run Readability over `html` and return the normalized main text.
pub fn readable_text(html: &str, url: &str) -> Result<String, ExtractError> {
    let mut readability = Readability::new(html, Some(url), None)
        .map_err(|e| ExtractError::Unreadable(e.to_string()))?;
    let article = readability
        .parse()
        .map_err(|e| ExtractError::Unreadable(e.to_string()))?;
    let text = normalize_text(&article.text_content.to_string());
    debug!(title = %article.title, chars = text.chars().count(), "Readability parsed page");
    Ok(text)
}

/// Accept `text` only if it has more than `min_chars` characters.
pub fn apply_content_gate(text: String, min_chars: usize) -> Result<String, ExtractError> {
    let chars = text.chars().count();
    if chars > min_chars {
        Ok(text)
    } else {
        Err(ExtractError::TooShort {
            chars,
            min: min_chars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::MockFetcher;

    const URL: &str = "https://blog.example.com/post";

    fn article_html(paragraphs: &[&str]) -> String {
        let body = paragraphs
            .iter()
            .map(|p| format!("<p>{p}</p>"))
            .collect::<String>();
        format!(
            "<html><head><title>A post</title></head><body>\
             <nav><a href=\"/\">Home</a> <a href=\"/about\">About</a></nav>\
             <article><h1>A post</h1>{body}</article>\
             <footer>Copyright</footer></body></html>"
        )
    }

    fn lorem_paragraphs() -> Vec<&'static str> {
        vec![
            "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor \
             incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud \
             exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.",
            "Duis aute irure dolor in reprehenderit in voluptate velit esse cillum dolore eu \
             fugiat nulla pariatur. Excepteur sint occaecat cupidatat non proident, sunt in culpa \
             qui officia deserunt mollit anim id est laborum.",
            "Sed ut perspiciatis unde omnis iste natus error sit voluptatem accusantium doloremque \
             laudantium, totam rem aperiam, eaque ipsa quae ab illo inventore veritatis et quasi \
             architecto beatae vitae dicta sunt explicabo.",
        ]
    }

    fn extractor(fetcher: MockFetcher) -> ArticleExtractor<MockFetcher> {
        ArticleExtractor::new(Arc::new(fetcher), Duration::from_secs(7), 200)
    }

    #[test]
    fn test_content_gate_boundary() {
        let at_limit = "a".repeat(200);
        let over_limit = "a".repeat(201);
        assert_eq!(
            apply_content_gate(at_limit, 200),
            Err(ExtractError::TooShort { chars: 200, min: 200 })
        );
        assert_eq!(apply_content_gate(over_limit.clone(), 200), Ok(over_limit));
    }

    #[test]
    fn test_content_gate_counts_characters_not_bytes() {
        // 150 two-byte characters: 300 bytes but only 150 characters.
        let text = "é".repeat(150);
        assert!(apply_content_gate(text, 200).is_err());
    }

    #[tokio::test]
    async fn test_extract_long_article() {
        let html = article_html(&lorem_paragraphs());
        let ex = extractor(MockFetcher::new().with_html(URL, &html));
        let text = ex.extract(URL).await.expect("article should pass the gate");
        assert!(text.chars().count() > 200);
        assert!(text.contains("Lorem ipsum dolor sit amet"));
        assert!(text.contains("architecto beatae vitae"));
    }

    #[tokio::test]
    async fn test_extract_short_page_is_none() {
        let html = article_html(&["Just a couple of words."]);
        let ex = extractor(MockFetcher::new().with_html(URL, &html));
        assert_eq!(ex.extract(URL).await, None);
    }

    #[tokio::test]
    async fn test_extract_download_failure_is_none() {
        let ex = extractor(MockFetcher::new().with_error(
            URL,
            FetchError::Transport {
                url: URL.to_string(),
                message: "connection reset".to_string(),
            },
        ));
        assert_eq!(ex.extract(URL).await, None);
        assert!(matches!(
            ex.extract_detailed(URL).await,
            Err(ExtractError::Download(FetchError::Transport { .. }))
        ));
    }

    #[tokio::test]
    async fn test_extract_non_html_is_none() {
        let ex = extractor(MockFetcher::new().with_page(
            URL,
            Some("application/pdf"),
            "%PDF-1.7 ...",
        ));
        assert_eq!(ex.extract(URL).await, None);
        assert_eq!(
            ex.extract_detailed(URL).await,
            Err(ExtractError::NotHtml {
                content_type: "application/pdf".to_string()
            })
        );
    }
}
