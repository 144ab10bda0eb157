use std::path::PathBuf;
use tether_core::{SessionId, TranscriptStore};

/// Input for the Transcript command.
#[derive(Debug, Clone)]
pub struct TranscriptInput {
    pub config: Option<PathBuf>,
    /// Session to print; all stored sessions are listed when absent
    pub session: Option<String>,
}

/// Strategy for inspecting stored transcripts.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptStrategy;

impl super::CommandStrategy for TranscriptStrategy {
    type Input = TranscriptInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = super::load_config(input.config.as_ref())?;
        let store = super::open_file_store(&config).await?;

        let Some(session) = input.session else {
            let sessions = store.list_sessions().await?;
            if sessions.is_empty() {
                println!("No transcripts in {}", store.dir().display());
            }
            for session_id in sessions {
                println!("{session_id}");
            }
            return Ok(());
        };

        let session_id = SessionId::from(session);
        let messages = store.load(&session_id).await?;
        if messages.is_empty() {
            println!("No transcript for session {session_id}");
        }
        for message in messages {
            println!(
                "[{}] {}: {}",
                message.timestamp.format("%Y-%m-%d %H:%M:%S"),
                message.role,
                message.content
            );
        }

        Ok(())
    }
}
