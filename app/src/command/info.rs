use std::path::PathBuf;
use tether_config::mask_secret;

/// Strategy for displaying configuration information.
///
/// Secrets are masked; everything else is printed as loaded, after
/// environment fallbacks.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = super::load_config(input.as_ref())?;

        println!("=== tether Configuration ===\n");

        println!("Provider:");
        println!("  API Key: {}", mask_secret(&config.provider.api_key));
        println!("  Base URL: {}", config.provider.base_url);
        println!("  Model: {}", config.provider.model);
        println!("  Timeout: {}s", config.provider.timeout_secs);
        println!("  Max Retries: {}", config.provider.max_retries);
        println!();

        println!("Context:");
        println!("  Window Size: {} exchanges", config.context.window_size);
        println!(
            "  Summary Token Budget: {}",
            config.context.summary_token_budget
        );
        println!("  Turn Token Budget: {}", config.context.turn_token_budget);
        println!(
            "  System Prompt: {}",
            truncate(&config.context.system_prompt, 60)
        );
        println!();

        println!("Review:");
        println!("  Token Budget: {}", config.review.token_budget);
        println!(
            "  Labels: {} / {}",
            config.review.user_label, config.review.assistant_label
        );
        println!();

        println!("Transcripts:");
        println!("  Directory: {}", config.transcript.resolved_dir()?.display());
        println!();

        println!("Telegram:");
        println!("  Token: {}", mask_secret(&config.telegram.token));
        if config.telegram.allow_from.is_empty() {
            println!("  Allow From: (empty - all users allowed)");
        } else {
            let ids: Vec<String> = config
                .telegram
                .allow_from
                .iter()
                .map(ToString::to_string)
                .collect();
            println!("  Allow From: {}", ids.join(", "));
        }

        Ok(())
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("short", 60), "short");
        assert_eq!(truncate("абвгдежз", 6), "абв...");
    }
}
