//! Turn processing for a single session.

use std::sync::Arc;
use tether_core::{
    ChatMessage, CompletionGateway, ContextConfig, GatewayError, SessionId, TranscriptStore,
};
use tracing::{debug, error, info, warn};

use crate::prompts::{RESET_MARKER, summary_context};
use crate::summarizer::Summarizer;
use crate::window::ContextWindow;

/// Collaborators shared by every session of a registry.
#[derive(Clone)]
pub struct SessionServices {
    pub gateway: Arc<dyn CompletionGateway>,
    pub store: Arc<dyn TranscriptStore>,
    pub summarizer: Summarizer,
    pub config: ContextConfig,
}

impl SessionServices {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        store: Arc<dyn TranscriptStore>,
        config: ContextConfig,
    ) -> Self {
        let summarizer = Summarizer::new(gateway.clone(), config.summary_token_budget);
        Self {
            gateway,
            store,
            summarizer,
            config,
        }
    }
}

/// Window, summary and system prompt of one active session.
///
/// Only `process_turn`, `reset` and `initialize` mutate it; callers must not
/// run two of them concurrently on the same context.
pub struct SessionContext {
    session_id: SessionId,
    system_prompt: String,
    window: ContextWindow,
    summary: String,
    services: SessionServices,
}

impl SessionContext {
    /// In-memory state only; nothing is recorded until `initialize`.
    pub(crate) fn new(session_id: SessionId, system_prompt: String, services: SessionServices) -> Self {
        let window = ContextWindow::new(services.config.window_size);
        Self {
            session_id,
            system_prompt,
            window,
            summary: String::new(),
            services,
        }
    }

    /// Create an active context and record its system prompt.
    pub async fn start(
        session_id: SessionId,
        system_prompt: String,
        services: SessionServices,
    ) -> Self {
        let mut context = Self::new(session_id, system_prompt.clone(), services);
        context.initialize(system_prompt).await;
        context
    }

    /// Fresh window and summary under `system_prompt`, recorded as a system entry.
    pub async fn initialize(&mut self, system_prompt: String) {
        self.window.clear();
        self.summary.clear();
        self.system_prompt = system_prompt;
        info!("Session {} started", self.session_id);
        self.record(ChatMessage::system(self.system_prompt.clone()))
            .await;
    }

    /// Discard window and summary, optionally replacing the system prompt, and
    /// record a reset marker. Earlier transcript entries are left untouched.
    pub async fn reset(&mut self, system_prompt: Option<String>) {
        self.window.clear();
        self.summary.clear();
        if let Some(prompt) = system_prompt {
            self.system_prompt = prompt;
        }
        info!("Session {} reset", self.session_id);
        self.record(ChatMessage::system(RESET_MARKER)).await;
    }

    /// Run one user turn and return the assistant reply.
    ///
    /// On gateway failure the user message stays in the window and transcript
    /// but no assistant message is added.
    pub async fn process_turn(&mut self, text: &str) -> Result<String, GatewayError> {
        let user = ChatMessage::user(text);
        self.record(user.clone()).await;

        if let Some(evicted) = self.window.push_user(user) {
            debug!(
                "Session {}: window over {} exchanges, folding oldest into summary",
                self.session_id,
                self.window.capacity()
            );
            for message in evicted.messages() {
                self.summary = self
                    .services
                    .summarizer
                    .fold_into_summary(&self.summary, message)
                    .await;
            }
        }

        let request = self.build_context();
        match self
            .services
            .gateway
            .complete(&request, self.services.config.turn_token_budget)
            .await
        {
            Ok(reply) => {
                let reply = ChatMessage::assistant(reply);
                self.window.set_reply(reply.clone());
                self.record(reply.clone()).await;
                Ok(reply.content)
            }
            Err(e) => {
                warn!("Session {}: completion failed: {e}", self.session_id);
                Err(e)
            }
        }
    }

    /// `[system prompt] + [summary if non-empty] + window`, oldest first.
    #[must_use]
    pub fn build_context(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.window.len() * 2 + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        if !self.summary.is_empty() {
            messages.push(ChatMessage::system(summary_context(&self.summary)));
        }
        messages.extend(self.window.messages().cloned());
        messages
    }

    /// Persistence is best-effort relative to the turn: failures are reported
    /// to the operator log only.
    async fn record(&self, message: ChatMessage) {
        if let Err(e) = self.services.store.append(&self.session_id, &message).await {
            error!(
                "Session {}: failed to record {} message in transcript: {e}",
                self.session_id, message.role
            );
        }
    }

    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    #[must_use]
    pub const fn window(&self) -> &ContextWindow {
        &self.window
    }

    /// Window contents flattened to messages, oldest first.
    #[must_use]
    pub fn window_messages(&self) -> Vec<ChatMessage> {
        self.window.messages().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tether_core::Role;
    use tether_transcript::MemoryTranscriptStore;

    /// Turn replies are `R<n>`; summaries are a fixed text.
    struct NumberedGateway {
        turns: AtomicUsize,
    }

    #[async_trait]
    impl CompletionGateway for NumberedGateway {
        async fn complete(&self, _: &[ChatMessage], _: u32) -> Result<String, GatewayError> {
            let n = self.turns.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("R{n}"))
        }

        async fn complete_prompt(&self, _: &str, _: &str, _: u32) -> Result<String, GatewayError> {
            Ok("summary so far".to_string())
        }
    }

    fn services(window_size: usize) -> (SessionServices, Arc<MemoryTranscriptStore>) {
        let store = Arc::new(MemoryTranscriptStore::new());
        let gateway = Arc::new(NumberedGateway {
            turns: AtomicUsize::new(0),
        });
        let config = ContextConfig::default().with_window_size(window_size);
        (SessionServices::new(gateway, store.clone(), config), store)
    }

    #[tokio::test]
    async fn start_records_system_prompt() {
        let (services, store) = services(6);
        let sid = SessionId::from("s");
        let context = SessionContext::start(sid.clone(), "persona".into(), services).await;

        assert!(context.window().is_empty());
        assert!(context.summary().is_empty());
        let log = store.load(&sid).await.unwrap_or_default();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].role, Role::System);
        assert_eq!(log[0].content, "persona");
    }

    #[tokio::test]
    async fn context_places_summary_after_system_prompt() {
        let (services, _) = services(1);
        let mut context =
            SessionContext::start(SessionId::from("s"), "persona".into(), services).await;

        assert_eq!(context.process_turn("first").await.ok().as_deref(), Some("R1"));
        assert_eq!(context.build_context().len(), 3);

        assert_eq!(context.process_turn("second").await.ok().as_deref(), Some("R2"));
        let request = context.build_context();
        let rendered: Vec<(Role, &str)> =
            request.iter().map(|m| (m.role, m.content.as_str())).collect();
        assert_eq!(
            rendered,
            [
                (Role::System, "persona"),
                (Role::System, "Summarized context: summary so far"),
                (Role::User, "second"),
                (Role::Assistant, "R2"),
            ]
        );
    }

    #[tokio::test]
    async fn reset_can_replace_prompt_and_keeps_transcript() {
        let (services, store) = services(6);
        let sid = SessionId::from("s");
        let mut context = SessionContext::start(sid.clone(), "old".into(), services).await;
        let _ = context.process_turn("hello").await;

        context.reset(Some("new".into())).await;

        assert_eq!(context.system_prompt(), "new");
        assert!(context.window().is_empty());
        let log = store.load(&sid).await.unwrap_or_default();
        let contents: Vec<&str> = log.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["old", "hello", "R1", RESET_MARKER]);
    }
}
