//! Summarization model seam with exponential backoff retry logic.
//!
//! The model is an opaque text → text function. This module defines how the
//! rest of the pipeline talks to it:
//! - [`SummaryModel`]: Core trait, one call per summary
//! - [`JadeModel`]: Production backend calling an OpenAI-compatible chat API
//!   through `awful_aj`
//! - [`RetryModel`]: Decorator that adds retry logic to any `SummaryModel`
//!
//! # Retry Strategy
//!
//! - Configurable retry budget (3 by default)
//! - Exponential backoff starting at the configured base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to every delay

use crate::error::ModelError;
use crate::utils::truncate_tokens;
use awful_aj::api::ask;
use awful_aj::{config, config::AwfulJadeConfig, config_dir, template, template::ChatTemplate};
use rand::{Rng, rng};
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Parameters of a single summarization call.
///
/// Lengths are in tokens. `do_sample` is always `false` in this crate so a
/// given input and model version always produce the same summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest<'a> {
    pub text: &'a str,
    pub min_length: usize,
    pub max_length: usize,
    pub do_sample: bool,
    /// Cut input that exceeds `max_input_tokens` instead of failing.
    pub truncation: bool,
    pub max_input_tokens: usize,
}

impl SummaryRequest<'_> {
    /// The text the model should actually see, honoring `truncation`.
    pub fn model_input(&self) -> Cow<'_, str> {
        if self.truncation {
            truncate_tokens(self.text, self.max_input_tokens)
        } else {
            Cow::Borrowed(self.text)
        }
    }
}

/// Refuse requests with `do_sample` set.
///
/// Backends whose output is cached by input text call this before decoding.
pub fn require_greedy(request: &SummaryRequest<'_>) -> Result<(), ModelError> {
    if request.do_sample {
        Err(ModelError::SamplingUnsupported)
    } else {
        Ok(())
    }
}

/// An async text-summarization model.
///
/// Implementations are shared read-only behind an `Arc` and must not rely on
/// `&mut self`.
pub trait SummaryModel {
    async fn summarize(&self, request: &SummaryRequest<'_>) -> Result<String, ModelError>;
}

/// Wrapper that adds exponential backoff retry logic to any [`SummaryModel`].
///
/// # Backoff Strategy
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryModel<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T: SummaryModel> RetryModel<T> {
    /// # Example
    ///
    /// ```ignore
    /// let model = RetryModel::new(JadeModel::load(None, "news_summarizer").await?, 3, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryModel")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T: SummaryModel> SummaryModel for RetryModel<T> {
    #[instrument(level = "info", skip_all)]
    async fn summarize(&self, request: &SummaryRequest<'_>) -> Result<String, ModelError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.summarize(request).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries || !e.is_retryable() {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "summarize() exhausted retries"
                        );
                        return Err(e);
                    }

                    let shift = u32::try_from(attempt - 1).unwrap_or(u32::MAX).min(16);
                    let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "summarize() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// [`SummaryModel`] that asks an OpenAI-compatible chat endpoint via `awful_aj`.
///
/// The endpoint, model name and sampling settings come from the `awful_aj`
/// config file; the system prompt comes from the named chat template. The
/// requested length bounds are stated in the user message. Requests with
/// `do_sample` set are rejected with [`ModelError::SamplingUnsupported`].
pub struct JadeModel {
    config: AwfulJadeConfig,
    template: ChatTemplate,
}

impl fmt::Debug for JadeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JadeModel").finish_non_exhaustive()
    }
}

impl JadeModel {
    /// Load the `awful_aj` config and chat template once at startup.
    ///
    /// `config_path` defaults to `config.yaml` in the `awful_aj` config directory.
    #[instrument(level = "info")]
    pub async fn load(config_path: Option<&str>, template_name: &str) -> Result<Self, Box<dyn Error>> {
        let template = template::load_template(template_name).await?;
        info!(template_name, "Loaded chat template");

        let config_path = match config_path {
            Some(path) => path.to_string(),
            None => config_dir()?.join("config.yaml").to_string_lossy().into_owned(),
        };
        let config = config::load_config(&config_path)?;
        info!(%config_path, "Loaded model configuration");

        Ok(Self { config, template })
    }
}

/// The user message sent for one summary.
pub fn summary_prompt(request: &SummaryRequest<'_>) -> String {
    format!(
        "Summarize the following article in {} to {} words. \
         Reply with the summary only.\n\n{}",
        request.min_length,
        request.max_length,
        request.model_input()
    )
}

impl SummaryModel for JadeModel {
    #[instrument(level = "info", skip_all)]
    async fn summarize(&self, request: &SummaryRequest<'_>) -> Result<String, ModelError> {
        require_greedy(request)?;
        let t0 = Instant::now();
        let prompt = summary_prompt(request);
        let res = ask(&self.config, prompt, &self.template, None, None).await;
        let dt = t0.elapsed();

        match res {
            Ok(summary) => {
                info!(elapsed_ms = dt.as_millis() as u64, "Model call succeeded");
                Ok(summary)
            }
            Err(e) => {
                warn!(elapsed_ms = dt.as_millis() as u64, error = %e, "Model call failed");
                Err(ModelError::Inference(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Deterministic [`SummaryModel`] that counts its invocations.

    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    pub struct EchoModel {
        calls: AtomicUsize,
        inputs: Mutex<Vec<String>>,
        failures_left: AtomicUsize,
    }

    impl EchoModel {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail the next `n` calls with an inference error.
        pub fn failing(n: usize) -> Self {
            let model = Self::default();
            model.failures_left.store(n, Ordering::SeqCst);
            model
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn inputs(&self) -> Vec<String> {
            self.inputs.lock().unwrap().clone()
        }
    }

    impl SummaryModel for EchoModel {
        async fn summarize(&self, request: &SummaryRequest<'_>) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            require_greedy(request)?;
            let input = request.model_input().into_owned();
            self.inputs.lock().unwrap().push(input.clone());

            let pending = self.failures_left.load(Ordering::SeqCst);
            if pending > 0 {
                self.failures_left.store(pending - 1, Ordering::SeqCst);
                return Err(ModelError::Inference("CUDA out of memory".to_string()));
            }

            // The first `max_length` tokens stand in for a real summary.
            let words: Vec<&str> = input.split_whitespace().take(request.max_length).collect();
            Ok(format!("Summary: {}", words.join(" ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::EchoModel;
    use super::*;

    fn request(text: &str) -> SummaryRequest<'_> {
        SummaryRequest {
            text,
            min_length: 30,
            max_length: 130,
            do_sample: false,
            truncation: true,
            max_input_tokens: 5,
        }
    }

    #[test]
    fn test_model_input_truncates_to_token_window() {
        let req = request("one two three four five six seven");
        assert_eq!(req.model_input(), "one two three four five");

        let untruncated = SummaryRequest {
            truncation: false,
            ..request("one two three four five six seven")
        };
        assert_eq!(untruncated.model_input(), "one two three four five six seven");
    }

    #[test]
    fn test_summary_prompt_states_bounds_and_truncated_text() {
        let prompt = summary_prompt(&request("one two three four five six seven"));
        assert!(prompt.contains("in 30 to 130 words"));
        assert!(prompt.ends_with("one two three four five"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_from_transient_failures() {
        let model = RetryModel::new(EchoModel::failing(2), 3, StdDuration::from_secs(1));
        let out = model.summarize(&request("alpha beta")).await.unwrap();
        assert_eq!(out, "Summary: alpha beta");
        assert_eq!(model.inner.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_budget() {
        let model = RetryModel::new(EchoModel::failing(10), 2, StdDuration::from_secs(1));
        let err = model.summarize(&request("alpha beta")).await.unwrap_err();
        assert_eq!(err, ModelError::Inference("CUDA out of memory".to_string()));
        assert_eq!(model.inner.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampled_request_is_rejected_without_retry() {
        let model = RetryModel::new(EchoModel::new(), 3, StdDuration::from_secs(1));
        let sampled = SummaryRequest {
            do_sample: true,
            ..request("alpha beta")
        };
        assert_eq!(
            model.summarize(&sampled).await,
            Err(ModelError::SamplingUnsupported)
        );
        assert_eq!(model.inner.calls(), 1);
        assert!(model.inner.inputs().is_empty());
    }

    #[test]
    fn test_require_greedy() {
        assert!(require_greedy(&request("a")).is_ok());
        let sampled = SummaryRequest {
            do_sample: true,
            ..request("a")
        };
        assert_eq!(require_greedy(&sampled), Err(ModelError::SamplingUnsupported));
    }
}
