//! Supervisor-style feedback on a whole session transcript.

use std::sync::Arc;
use tether_core::{ChatMessage, CompletionGateway, GatewayError, ReviewConfig, Role};

/// Produces supervisor feedback on a whole transcript.
#[derive(Clone)]
pub struct Reviewer {
    gateway: Arc<dyn CompletionGateway>,
    config: ReviewConfig,
}

impl Reviewer {
    #[must_use]
    pub fn new(gateway: Arc<dyn CompletionGateway>, config: ReviewConfig) -> Self {
        Self { gateway, config }
    }

    /// Render user and assistant turns with the configured labels. System
    /// entries (prompts, reset markers) are left out.
    #[must_use]
    pub fn render(&self, transcript: &[ChatMessage]) -> String {
        transcript
            .iter()
            .filter_map(|m| {
                let label = match m.role {
                    Role::User => &self.config.user_label,
                    Role::Assistant => &self.config.assistant_label,
                    Role::System => return None,
                };
                Some(format!("{label}: {}", m.content))
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// `None` when there is nothing to review.
    pub async fn review(&self, transcript: &[ChatMessage]) -> Option<Result<String, GatewayError>> {
        let rendered = self.render(transcript);
        if rendered.is_empty() {
            return None;
        }

        let prompt = format!(
            "{}\n\nSession transcript:\n\n{rendered}",
            self.config.instructions
        );
        Some(
            self.gateway
                .complete_prompt(&self.config.system_prompt, &prompt, self.config.token_budget)
                .await,
        )
    }
}
