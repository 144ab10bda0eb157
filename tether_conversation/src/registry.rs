//! Process-wide mapping from session id to active context.

use std::collections::HashMap;
use std::sync::Arc;
use tether_core::{
    ChatMessage, CompletionGateway, ContextConfig, ReviewConfig, SessionId, TranscriptStore,
};
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};
use tracing::{error, info};

use crate::context::{SessionContext, SessionServices};
use crate::error::ConversationError;
use crate::prompts::{NOTHING_TO_REVIEW, REVIEW_REQUEST};
use crate::review::Reviewer;
use crate::summarizer::Summarizer;

/// Shared handle to one session. Holding its lock gives exclusive access for
/// a whole turn.
pub type SessionHandle = Arc<Mutex<SessionContext>>;

/// Result of `SessionRegistry::start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The session had no context yet.
    Started,
    /// An active context was replaced by a fresh one.
    Restarted,
}

/// All active sessions of the process.
///
/// Starts empty. Sessions only appear through `start` or `reset`; nothing is rebuilt
/// from the transcript store.
pub struct SessionRegistry {
    services: SessionServices,
    reviewer: Reviewer,
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        store: Arc<dyn TranscriptStore>,
        context: ContextConfig,
        review: ReviewConfig,
    ) -> Self {
        let reviewer = Reviewer::new(gateway.clone(), review);
        Self {
            services: SessionServices::new(gateway, store, context),
            reviewer,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ContextConfig {
        &self.services.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn TranscriptStore> {
        &self.services.store
    }

    #[must_use]
    pub const fn summarizer(&self) -> &Summarizer {
        &self.services.summarizer
    }

    /// The session's context, or `None` if it was never started in this process.
    pub async fn get(&self, session_id: &SessionId) -> Option<SessionHandle> {
        self.sessions.lock().await.get(session_id).cloned()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Activate the session with `system_prompt` (default: the configured one).
    ///
    /// Starting an already active session re-initializes it.
    pub async fn start(&self, session_id: &SessionId, system_prompt: Option<String>) -> StartOutcome {
        let prompt = system_prompt.unwrap_or_else(|| self.services.config.system_prompt.clone());

        let sessions = self.sessions.lock().await;
        if let Some(handle) = sessions.get(session_id).cloned() {
            drop(sessions);
            handle.lock().await.initialize(prompt).await;
            return StartOutcome::Restarted;
        }

        let mut context = self.insert(sessions, session_id, prompt.clone()).await;
        context.initialize(prompt).await;
        StartOutcome::Started
    }

    /// Fresh window and summary for the session, recorded with a reset marker.
    ///
    /// An absent session is created first, as by `start`, so a clear command
    /// always leaves an active session behind.
    pub async fn reset(&self, session_id: &SessionId, system_prompt: Option<String>) {
        let sessions = self.sessions.lock().await;
        if let Some(handle) = sessions.get(session_id).cloned() {
            drop(sessions);
            handle.lock().await.reset(system_prompt).await;
            return;
        }

        let prompt = system_prompt.unwrap_or_else(|| self.services.config.system_prompt.clone());
        let mut context = self.insert(sessions, session_id, prompt.clone()).await;
        context.initialize(prompt).await;
        context.reset(None).await;
    }

    /// Register a new context and return it locked, so no turn runs ahead of
    /// its initial transcript records.
    async fn insert(
        &self,
        mut sessions: MutexGuard<'_, HashMap<SessionId, SessionHandle>>,
        session_id: &SessionId,
        prompt: String,
    ) -> OwnedMutexGuard<SessionContext> {
        let handle = Arc::new(Mutex::new(SessionContext::new(
            session_id.clone(),
            prompt,
            self.services.clone(),
        )));
        let context = handle.clone().lock_owned().await;
        sessions.insert(session_id.clone(), handle);
        context
    }

    /// Run one user turn for an active session.
    pub async fn process_turn(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<String, ConversationError> {
        let handle = self.require(session_id).await?;
        let mut context = handle.lock().await;
        context
            .process_turn(text)
            .await
            .map_err(ConversationError::from)
    }

    /// Supervisor feedback on the session's full transcript, including
    /// history from before any reset.
    ///
    /// The request and the feedback are appended to the transcript but never
    /// enter the window.
    pub async fn review(&self, session_id: &SessionId) -> Result<String, ConversationError> {
        let handle = self.require(session_id).await?;
        let _turn = handle.lock().await;

        let transcript = self.services.store.load(session_id).await?;
        let Some(feedback) = self.reviewer.review(&transcript).await else {
            return Ok(NOTHING_TO_REVIEW.to_string());
        };
        let feedback = feedback?;

        info!("Session {session_id}: review produced {} chars", feedback.len());
        for message in [
            ChatMessage::user(REVIEW_REQUEST),
            ChatMessage::assistant(feedback.clone()),
        ] {
            if let Err(e) = self.services.store.append(session_id, &message).await {
                error!("Session {session_id}: failed to record review in transcript: {e}");
            }
        }

        Ok(feedback)
    }

    async fn require(&self, session_id: &SessionId) -> Result<SessionHandle, ConversationError> {
        self.get(session_id)
            .await
            .ok_or_else(|| ConversationError::SessionNotStarted(session_id.clone()))
    }
}
