//! Upstream dispatcher with quality-based fallback.
//!
//! One dispatch per request, plus at most one fallback dispatch when the
//! first answer is empty or matches the refusal heuristic. Transport
//! failures on the first call are not retried; the fallback path is a
//! soft degradation, never a hard failure.

use crate::quality;
use lexrelay_common::{CompletionClient, CompletionError};
use std::sync::Arc;
use tracing::{info, warn};

/// Answer returned when both dispatches come back useless.
pub const FALLBACK_ANSWER: &str = "Sorry, an answer could not be generated for this request. \
Please try rephrasing your question.";

/// Dispatches assembled prompts to the completion client.
pub struct Dispatcher {
    client: Arc<dyn CompletionClient>,
    is_low_quality: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self::with_quality_check(client, quality::is_low_quality_answer)
    }

    /// Swap in a different quality predicate without touching dispatch logic.
    pub fn with_quality_check(
        client: Arc<dyn CompletionClient>,
        check: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            client,
            is_low_quality: Box::new(check),
        }
    }

    /// Dispatch a prompt. `original_query` is the user's raw question,
    /// used verbatim by the fallback prompt (persona and context dropped).
    ///
    /// Errors here mean the first upstream call failed; a failed or empty
    /// fallback degrades to [`FALLBACK_ANSWER`] instead.
    pub async fn dispatch(
        &self,
        prompt: &str,
        original_query: &str,
    ) -> Result<String, CompletionError> {
        let answer = self.client.complete(prompt).await?;

        if !(self.is_low_quality)(&answer) {
            return Ok(answer);
        }

        info!("[D]  First answer judged low quality, issuing fallback dispatch");
        match self.client.complete(&fallback_prompt(original_query)).await {
            Ok(second) if !second.trim().is_empty() => Ok(second),
            Ok(_) => Ok(FALLBACK_ANSWER.to_string()),
            Err(e) => {
                warn!("[D]  Fallback dispatch failed: {}", e);
                Ok(FALLBACK_ANSWER.to_string())
            }
        }
    }
}

fn fallback_prompt(query: &str) -> String {
    format!(
        "The previous attempt to answer did not produce a usable reply. Make reasonable \
assumptions wherever information is missing and answer the following question as completely \
as you can, even if some details are incomplete. Do not ask for more information.\n\n\
Question: {}",
        query
    )
}
