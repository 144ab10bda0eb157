use crate::command::CommandStrategy;
use std::path::PathBuf;
use tether_telegram::TelegramBot;
use tracing::info;

/// Input for Telegram bot command.
pub struct TelegramInput {
    pub config: Option<PathBuf>,
    /// Optional bot token (overrides config)
    pub token: Option<String>,
    /// Optional allowed chat IDs (overrides config)
    pub allow_from: Option<Vec<i64>>,
}

/// Strategy for running Telegram bot.
pub struct TelegramStrategy;

impl CommandStrategy for TelegramStrategy {
    type Input = TelegramInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = super::load_config(input.config.as_ref())?;

        let token = if let Some(t) = input.token {
            t
        } else if !config.telegram.token.is_empty() {
            config.telegram.token.clone()
        } else {
            anyhow::bail!(
                "Telegram bot token not configured. Set \"telegram.token\" in config or TELEGRAM_TOKEN"
            );
        };

        let allow_from = input
            .allow_from
            .unwrap_or_else(|| config.telegram.allow_from.clone());

        info!("Starting Telegram bot...");

        let store = super::open_file_store(&config).await?;
        let registry = super::build_registry(&config, store)?;

        let bot = TelegramBot::new(token, registry, &allow_from);

        info!("Telegram bot is running. Press Ctrl+C to stop.");
        bot.run().await;

        Ok(())
    }
}
