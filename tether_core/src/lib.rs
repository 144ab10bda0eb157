#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod context;
pub mod error;

pub use context::{ContextConfig, ReviewConfig};
pub use error::{GatewayError, PersistenceError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message. Never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Identifies one conversation, e.g. `telegram:42` or `cli:default`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Session id for a Telegram chat.
    #[must_use]
    pub fn telegram(chat_id: i64) -> Self {
        Self(format!("telegram:{chat_id}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Call contract to the external completion service.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Complete a full chat context.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_output_tokens: u32,
    ) -> Result<String, GatewayError>;

    /// Single system + user prompt completion.
    async fn complete_prompt(
        &self,
        system: &str,
        user_prompt: &str,
        max_output_tokens: u32,
    ) -> Result<String, GatewayError> {
        let messages = [ChatMessage::system(system), ChatMessage::user(user_prompt)];
        self.complete(&messages, max_output_tokens).await
    }
}

/// Append-only per-session message log.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Record `message` at the end of the session's log.
    async fn append(
        &self,
        session_id: &SessionId,
        message: &ChatMessage,
    ) -> Result<(), PersistenceError>;

    /// Full ordered log for the session, empty if nothing was ever recorded.
    async fn load(&self, session_id: &SessionId) -> Result<Vec<ChatMessage>, PersistenceError>;
}
