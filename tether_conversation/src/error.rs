use tether_core::{GatewayError, PersistenceError, SessionId};
use thiserror::Error;

/// Errors that can surface from session operations.
///
/// All of them are recoverable: the session (if any) stays usable.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("session {0} has not been started")]
    SessionNotStarted(SessionId),

    #[error("completion failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("transcript unavailable: {0}")]
    Transcript(#[from] PersistenceError),
}

impl ConversationError {
    pub const GATEWAY_FAILURE_REPLY: &'static str =
        "⚠️ Something went wrong while processing your request. Please try again.";
    pub const NOT_STARTED_REPLY: &'static str =
        "Please start the session and give your consent first.";
    pub const TRANSCRIPT_FAILURE_REPLY: &'static str =
        "⚠️ The conversation history is unavailable right now.";

    /// Fixed text to show the end user instead of the error details.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::SessionNotStarted(_) => Self::NOT_STARTED_REPLY,
            Self::Gateway(_) => Self::GATEWAY_FAILURE_REPLY,
            Self::Transcript(_) => Self::TRANSCRIPT_FAILURE_REPLY,
        }
    }
}
