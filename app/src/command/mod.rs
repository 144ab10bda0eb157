//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type.

use std::path::PathBuf;
use std::sync::Arc;
use tether_config::Config;
use tether_conversation::SessionRegistry;
use tether_core::TranscriptStore;
use tether_providers::OpenAiCompatProvider;
use tether_transcript::FileTranscriptStore;

mod chat;
mod info;
mod init;
mod summarize;
mod telegram;
mod transcript;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use summarize::{SummarizeInput, SummarizeStrategy};
pub use telegram::{TelegramInput, TelegramStrategy};
pub use transcript::{TranscriptInput, TranscriptStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Config from `path`, or from the default location.
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// The configured on-disk transcript store.
async fn open_file_store(config: &Config) -> anyhow::Result<Arc<FileTranscriptStore>> {
    let dir = config.transcript.resolved_dir()?;
    Ok(Arc::new(FileTranscriptStore::new(dir).await?))
}

fn build_provider(config: &Config) -> anyhow::Result<Arc<OpenAiCompatProvider>> {
    Ok(Arc::new(OpenAiCompatProvider::new(
        config.provider_settings()?,
    )?))
}

/// Registry wired to the configured provider and `store`.
fn build_registry(
    config: &Config,
    store: Arc<dyn TranscriptStore>,
) -> anyhow::Result<Arc<SessionRegistry>> {
    let provider = build_provider(config)?;
    Ok(Arc::new(SessionRegistry::new(
        provider,
        store,
        config.context.clone(),
        config.review.clone(),
    )))
}
