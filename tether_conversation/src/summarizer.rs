//! Running summary of messages evicted from the window.

use std::sync::Arc;
use tether_core::{ChatMessage, CompletionGateway};
use tracing::{debug, warn};

use crate::prompts::{
    FOLD_SYSTEM_PROMPT, FULL_SYSTEM_PROMPT, NOTHING_TO_SUMMARIZE, SUMMARY_UNAVAILABLE,
    fold_prompt, full_summary_prompt,
};

/// Output budget for `summarize_full`.
const FULL_SUMMARY_TOKEN_BUDGET: u32 = 300;

/// Folds evicted messages into a session summary via the completion gateway.
///
/// Summarization is best-effort: no method here returns an error.
#[derive(Clone)]
pub struct Summarizer {
    gateway: Arc<dyn CompletionGateway>,
    token_budget: u32,
}

impl Summarizer {
    #[must_use]
    pub fn new(gateway: Arc<dyn CompletionGateway>, token_budget: u32) -> Self {
        Self {
            gateway,
            token_budget,
        }
    }

    #[must_use]
    pub const fn token_budget(&self) -> u32 {
        self.token_budget
    }

    /// Return the summary updated with whatever is worth keeping from `evicted`.
    ///
    /// Gives back `existing` unchanged when the gateway fails or replies with
    /// blank text, so a non-empty summary never becomes empty.
    pub async fn fold_into_summary(&self, existing: &str, evicted: &ChatMessage) -> String {
        let prompt = fold_prompt(existing, evicted.role.as_str(), &evicted.content);

        match self
            .gateway
            .complete_prompt(FOLD_SYSTEM_PROMPT, &prompt, self.token_budget)
            .await
        {
            Ok(updated) => {
                let updated = updated.trim();
                if updated.is_empty() {
                    debug!("Summarizer returned blank text, keeping existing summary");
                    existing.to_string()
                } else {
                    updated.to_string()
                }
            }
            Err(e) => {
                warn!("Failed to update summary, keeping existing one: {e}");
                existing.to_string()
            }
        }
    }

    /// Summarize a whole message history in one request.
    pub async fn summarize_full(&self, messages: &[ChatMessage]) -> String {
        let history = messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n");

        if history.trim().is_empty() {
            return NOTHING_TO_SUMMARIZE.to_string();
        }

        match self
            .gateway
            .complete_prompt(
                FULL_SYSTEM_PROMPT,
                &full_summary_prompt(&history),
                FULL_SUMMARY_TOKEN_BUDGET,
            )
            .await
        {
            Ok(summary) if !summary.trim().is_empty() => summary.trim().to_string(),
            Ok(_) => SUMMARY_UNAVAILABLE.to_string(),
            Err(e) => {
                warn!("Failed to summarize history: {e}");
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }
}
