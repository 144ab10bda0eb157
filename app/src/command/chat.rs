//! Interactive terminal chat against the same registry the bot uses.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tether_conversation::SessionRegistry;
use tether_core::{SessionId, TranscriptStore};
use tether_transcript::MemoryTranscriptStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use uuid::Uuid;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    pub config: Option<PathBuf>,
    /// Session id (new `cli:<uuid>` when not provided)
    pub session: Option<String>,
    /// Single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Keep the transcript in memory instead of on disk
    pub ephemeral: bool,
}

/// Strategy for executing the Chat command.
///
/// The session is started right away. In interactive mode `/reset` clears
/// the memory, `/review` asks for feedback and `exit` quits.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = super::load_config(input.config.as_ref())?;

        let store: Arc<dyn TranscriptStore> = if input.ephemeral {
            Arc::new(MemoryTranscriptStore::new())
        } else {
            super::open_file_store(&config).await?
        };
        let registry = super::build_registry(&config, store)?;

        let session_id = input
            .session
            .map_or_else(|| SessionId::new(format!("cli:{}", Uuid::now_v7())), SessionId::from);
        registry.start(&session_id, None).await;
        info!("Started session {session_id}");

        if let Some(msg) = input.message {
            println!("{}", turn(&registry, &session_id, &msg).await);
            return Ok(());
        }

        run_interactive(&registry, &session_id).await
    }
}

async fn run_interactive(registry: &SessionRegistry, session_id: &SessionId) -> anyhow::Result<()> {
    println!("Session {session_id}. Commands: /reset, /review, exit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => {}
            "exit" | "quit" => break,
            "/reset" => {
                registry.reset(session_id, None).await;
                println!("Conversation memory cleared.");
            }
            "/review" => match registry.review(session_id).await {
                Ok(feedback) => println!("{feedback}"),
                Err(e) => println!("{}", e.user_message()),
            },
            text => println!("{}", turn(registry, session_id, text).await),
        }
    }

    Ok(())
}

/// The reply, or the fixed error text for the user.
async fn turn(registry: &SessionRegistry, session_id: &SessionId, text: &str) -> String {
    match registry.process_turn(session_id, text).await {
        Ok(reply) => reply,
        Err(e) => e.user_message().to_string(),
    }
}
