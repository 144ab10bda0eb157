#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tether_conversation::SessionRegistry;
use tether_core::{
    ChatMessage, CompletionGateway, ContextConfig, GatewayError, PersistenceError, ReviewConfig,
    SessionId, TranscriptStore,
};
use tether_transcript::MemoryTranscriptStore;

/// Gateway double.
///
/// Turn completions reply `R<n>` for the n-th call, failing the calls listed
/// in `fail_turns`. Prompt completions emulate the summarizer: the new
/// summary is the old one with the evicted message appended, so tests can
/// see exactly what was folded.
#[derive(Default)]
pub struct ScriptedGateway {
    turn_calls: AtomicUsize,
    fail_turns: Mutex<HashSet<usize>>,
    fail_prompts: AtomicBool,
    pub contexts: Mutex<Vec<Vec<ChatMessage>>>,
    pub folded: Mutex<Vec<String>>,
    pub reviews: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_turn(&self, n: usize) {
        self.fail_turns.lock().unwrap().insert(n);
    }

    pub fn fail_prompts(&self, fail: bool) {
        self.fail_prompts.store(fail, Ordering::SeqCst);
    }

    pub fn turn_calls(&self) -> usize {
        self.turn_calls.load(Ordering::SeqCst)
    }

    pub fn folded(&self) -> Vec<String> {
        self.folded.lock().unwrap().clone()
    }

    pub fn last_context(&self) -> Vec<ChatMessage> {
        self.contexts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _max_output_tokens: u32,
    ) -> Result<String, GatewayError> {
        let n = self.turn_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.contexts.lock().unwrap().push(messages.to_vec());
        if self.fail_turns.lock().unwrap().contains(&n) {
            return Err(GatewayError::Transport("connection reset".into()));
        }
        Ok(format!("R{n}"))
    }

    async fn complete_prompt(
        &self,
        _system: &str,
        user_prompt: &str,
        _max_output_tokens: u32,
    ) -> Result<String, GatewayError> {
        if self.fail_prompts.load(Ordering::SeqCst) {
            return Err(GatewayError::RateLimited);
        }

        let Some((head, message)) = user_prompt.rsplit_once("\n\nNew message:\n") else {
            self.reviews.lock().unwrap().push(user_prompt.to_string());
            return Ok("Solid rapport, work on open questions.".to_string());
        };
        let current = head
            .rsplit_once("Current summary:\n")
            .map_or("", |(_, current)| current);

        self.folded.lock().unwrap().push(message.to_string());
        if current == "—" {
            Ok(message.to_string())
        } else {
            Ok(format!("{current} | {message}"))
        }
    }
}

/// Store whose every operation fails.
pub struct BrokenStore;

#[async_trait]
impl TranscriptStore for BrokenStore {
    async fn append(&self, _: &SessionId, _: &ChatMessage) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("disk full".into()))
    }

    async fn load(&self, _: &SessionId) -> Result<Vec<ChatMessage>, PersistenceError> {
        Err(PersistenceError::Unavailable("disk full".into()))
    }
}

pub fn config(window_size: usize) -> ContextConfig {
    ContextConfig::default()
        .with_window_size(window_size)
        .with_system_prompt("p")
}

pub fn registry(
    window_size: usize,
) -> (SessionRegistry, Arc<ScriptedGateway>, Arc<MemoryTranscriptStore>) {
    let gateway = ScriptedGateway::new();
    let store = Arc::new(MemoryTranscriptStore::new());
    let registry = SessionRegistry::new(
        gateway.clone(),
        store.clone(),
        config(window_size),
        ReviewConfig::default(),
    );
    (registry, gateway, store)
}

/// `role:content` strings, the compact form used in assertions.
pub fn render(messages: &[ChatMessage]) -> Vec<String> {
    messages
        .iter()
        .map(|m| format!("{}:{}", m.role, m.content))
        .collect()
}
