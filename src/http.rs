//! Outbound HTTP for the listing page and article pages.
//!
//! The scrapers talk to the network only through [`PageFetcher`], so the
//! pipeline can be driven by a counting mock in tests and by
//! [`ReqwestFetcher`] in production.

use crate::error::FetchError;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// A downloaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: String,
    /// Value of the `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
    pub body: String,
}

/// Whether a `Content-Type` value denotes an HTML document.
///
/// A missing `Content-Type` counts as HTML.
pub fn is_html_content_type(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(ct) => {
            let ct = ct.to_ascii_lowercase();
            ct.contains("text/html") || ct.contains("application/xhtml")
        }
    }
}

/// Something that can GET an HTML page and hand back its body.
///
/// Implementations must treat any non-2xx status as an error, never return
/// a partially read body, and reject non-HTML responses with
/// [`FetchError::NotHtml`] from the headers alone.
pub trait PageFetcher {
    /// GET `url`. `timeout` bounds the whole request when given.
    async fn fetch(&self, url: &str, timeout: Option<Duration>) -> Result<FetchedPage, FetchError>;
}

/// [`PageFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Build a client that sends `user_agent` with every request.
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for ReqwestFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str, timeout: Option<Duration>) -> Result<FetchedPage, FetchError> {
        let t0 = Instant::now();
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| classify(url, e))?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if !is_html_content_type(content_type.as_deref()) {
            let content_type = content_type.unwrap_or_default();
            debug!(%content_type, "Skipping non-HTML body");
            return Err(FetchError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(FetchedPage {
            url: final_url,
            content_type,
            body,
        })
    }
}

fn classify(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
