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

mod command;

use clap::{Parser, Subcommand};
use command::{
    ChatInput, ChatStrategy, CommandStrategy, InfoStrategy, InitStrategy, SummarizeInput,
    SummarizeStrategy, TelegramInput, TelegramStrategy, TranscriptInput, TranscriptStrategy,
    VersionStrategy,
};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "tether")]
#[command(about = "LLM chat sessions with a sliding window and running summary", long_about = None)]
struct Cli {
    /// Config file (default: ~/tether/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the model in the terminal
    Chat {
        /// Session id (default: a new `cli:<uuid>` id)
        #[arg(short, long)]
        session: Option<String>,

        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Keep the transcript in memory only
        #[arg(long)]
        ephemeral: bool,
    },
    /// Serve the Telegram bot
    Telegram {
        /// Bot token (overrides config)
        #[arg(short, long)]
        token: Option<String>,

        /// Allowed chat ids (overrides config)
        #[arg(long, value_delimiter = ',')]
        allow_from: Option<Vec<i64>>,
    },
    /// List stored sessions or print one transcript
    Transcript {
        session: Option<String>,
    },
    /// Summarize a stored transcript
    Summarize {
        session: String,
    },
    /// Show the effective configuration
    Info,
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = cli.config;

    match cli.command {
        Commands::Chat {
            session,
            message,
            ephemeral,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    config,
                    session,
                    message,
                    ephemeral,
                })
                .await
        }
        Commands::Telegram { token, allow_from } => {
            TelegramStrategy
                .execute(TelegramInput {
                    config,
                    token,
                    allow_from,
                })
                .await
        }
        Commands::Transcript { session } => {
            TranscriptStrategy
                .execute(TranscriptInput { config, session })
                .await
        }
        Commands::Summarize { session } => {
            SummarizeStrategy
                .execute(SummarizeInput { config, session })
                .await
        }
        Commands::Info => InfoStrategy.execute(config).await,
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
