use std::path::PathBuf;
use tether_conversation::Summarizer;
use tether_core::{Role, SessionId, TranscriptStore};

/// Input for the Summarize command.
#[derive(Debug, Clone)]
pub struct SummarizeInput {
    pub config: Option<PathBuf>,
    pub session: String,
}

/// Strategy for printing a one-shot summary of a stored transcript.
///
/// System entries (prompts, reset markers) are left out of the summary.
#[derive(Debug, Clone, Copy)]
pub struct SummarizeStrategy;

impl super::CommandStrategy for SummarizeStrategy {
    type Input = SummarizeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = super::load_config(input.config.as_ref())?;
        let store = super::open_file_store(&config).await?;

        let session_id = SessionId::from(input.session);
        let dialogue: Vec<_> = store
            .load(&session_id)
            .await?
            .into_iter()
            .filter(|m| m.role != Role::System)
            .collect();

        let summarizer = Summarizer::new(
            super::build_provider(&config)?,
            config.context.summary_token_budget,
        );
        println!("{}", summarizer.summarize_full(&dialogue).await);

        Ok(())
    }
}
