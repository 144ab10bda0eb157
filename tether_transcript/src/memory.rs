use async_trait::async_trait;
use std::collections::HashMap;
use tether_core::{ChatMessage, PersistenceError, SessionId, TranscriptStore};
use tokio::sync::Mutex;

/// Process-local transcript store, used by the local chat mode and tests.
#[derive(Debug, Default)]
pub struct MemoryTranscriptStore {
    logs: Mutex<HashMap<SessionId, Vec<ChatMessage>>>,
}

impl MemoryTranscriptStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TranscriptStore for MemoryTranscriptStore {
    async fn append(
        &self,
        session_id: &SessionId,
        message: &ChatMessage,
    ) -> Result<(), PersistenceError> {
        self.logs
            .lock()
            .await
            .entry(session_id.clone())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn load(&self, session_id: &SessionId) -> Result<Vec<ChatMessage>, PersistenceError> {
        Ok(self
            .logs
            .lock()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "Test failure should panic")]
    async fn sessions_are_kept_apart() {
        let store = MemoryTranscriptStore::new();
        let a = SessionId::from("a");
        let b = SessionId::from("b");

        store.append(&a, &ChatMessage::user("for a")).await.unwrap();
        store.append(&b, &ChatMessage::user("for b")).await.unwrap();
        store.append(&a, &ChatMessage::assistant("reply a")).await.unwrap();

        let log_a = store.load(&a).await.unwrap();
        assert_eq!(log_a.len(), 2);
        assert_eq!(log_a[1].content, "reply a");
        assert_eq!(store.load(&b).await.unwrap().len(), 1);
        assert!(store.load(&SessionId::from("c")).await.unwrap().is_empty());
    }
}
