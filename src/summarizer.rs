//! Summarization engine: input policy and output bounds around the model.
//!
//! The engine owns everything that is not the model itself:
//! 1. Trimmed input of at most `min_input_chars` characters is answered
//!    locally with [`SummaryResult::InsufficientContent`]; the model is never
//!    called.
//! 2. Longer input is sent with `do_sample = false` and `truncation = true`,
//!    so decoding is greedy and text beyond the
//!    model's token window is cut instead of failing the call.
//! 3. The model output is trimmed and clipped to `max_length` tokens.
//! 4. Any model failure, including a panic inside the model future, becomes
//!    [`SummaryResult::ModelError`].

use crate::config::SummarySettings;
use crate::error::ModelError;
use crate::model::{SummaryModel, SummaryRequest};
use crate::models::SummaryResult;
use crate::utils::{token_count, truncate_for_log, truncate_tokens};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Wraps a shared model with the summarization policy.
#[derive(Debug)]
pub struct SummarizationEngine<M> {
    model: Arc<M>,
    settings: SummarySettings,
}

impl<M: SummaryModel> SummarizationEngine<M> {
    pub fn new(model: Arc<M>, settings: SummarySettings) -> Self {
        Self { model, settings }
    }

    pub fn settings(&self) -> &SummarySettings {
        &self.settings
    }

    /// Summarize `text`. Never fails; every outcome is a [`SummaryResult`].
    #[instrument(level = "info", skip_all, fields(input_chars = text.chars().count()))]
    pub async fn summarize(&self, text: &str) -> SummaryResult {
        let trimmed = text.trim();
        let chars = trimmed.chars().count();
        if chars <= self.settings.min_input_chars {
            debug!(chars, min = self.settings.min_input_chars, "Input too short to summarize");
            return SummaryResult::InsufficientContent;
        }

        let request = SummaryRequest {
            text: trimmed,
            min_length: self.settings.min_length,
            max_length: self.settings.max_length,
            do_sample: false,
            truncation: true,
            max_input_tokens: self.settings.max_input_tokens,
        };
        let input_tokens = token_count(trimmed);
        if input_tokens > request.max_input_tokens {
            info!(
                input_tokens,
                max_input_tokens = request.max_input_tokens,
                "Input exceeds model window; truncating"
            );
        }

        let outcome = AssertUnwindSafe(self.model.summarize(&request))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(ModelError::Panicked(panic_message(payload.as_ref()))))
            .and_then(|raw| bound_output(&raw, self.settings.max_length));

        match outcome {
            Ok(summary) => {
                debug!(preview = %truncate_for_log(&summary, 120), "Summary ready");
                SummaryResult::Summary(summary)
            }
            Err(e) => {
                warn!(error = %e, "Summarization failed");
                SummaryResult::ModelError(e.to_string())
            }
        }
    }
}

/// Trim model output and keep at most `max_length` tokens.
fn bound_output(raw: &str, max_length: usize) -> Result<String, ModelError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ModelError::EmptyOutput);
    }
    Ok(truncate_tokens(trimmed, max_length).into_owned())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
