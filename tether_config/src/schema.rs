use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tether_core::{ContextConfig, ReviewConfig};
use tether_providers::{ProviderSettings, RetryPolicy};
use tracing::debug;

const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";
const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_TOKEN";

/// Pause added per retry attempt: 2s, 4s, ...
const RETRY_STEP: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub transcript: TranscriptConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "ProviderConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "ProviderConfig::default_model")]
    pub model: String,
    #[serde(default = "ProviderConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "ProviderConfig::default_max_retries")]
    pub max_retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::default_base_url(),
            model: Self::default_model(),
            timeout_secs: Self::default_timeout_secs(),
            max_retries: Self::default_max_retries(),
        }
    }
}

impl ProviderConfig {
    fn default_base_url() -> String {
        ProviderSettings::DEFAULT_BASE_URL.to_string()
    }

    fn default_model() -> String {
        ProviderSettings::DEFAULT_MODEL.to_string()
    }

    const fn default_timeout_secs() -> u64 {
        60
    }

    const fn default_max_retries() -> u32 {
        2
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TranscriptConfig {
    /// Defaults to `~/tether/chats`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl TranscriptConfig {
    pub fn resolved_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Config::config_dir()?.join("chats")),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,
    /// Chat ids allowed to talk to the bot; empty allows everyone
    #[serde(default)]
    pub allow_from: Vec<i64>,
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("tether"))
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Read, apply environment fallbacks and validate.
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'tether init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Self = serde_json::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Invalid config file {}: {e}", config_path.display())
        })?;
        debug!("Loaded config from {}", config_path.display());

        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Fill empty secrets from `lookup` (normally the process environment).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.provider.api_key.is_empty() {
            if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
                debug!("Using API key from {API_KEY_ENV}");
                self.provider.api_key = key;
            }
        }
        if self.telegram.token.is_empty() {
            if let Some(token) = lookup(TELEGRAM_TOKEN_ENV).filter(|v| !v.is_empty()) {
                debug!("Using bot token from {TELEGRAM_TOKEN_ENV}");
                self.telegram.token = token;
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.context.window_size == 0 {
            anyhow::bail!("context.window_size must be at least 1");
        }
        for (name, budget) in [
            ("context.summary_token_budget", self.context.summary_token_budget),
            ("context.turn_token_budget", self.context.turn_token_budget),
            ("review.token_budget", self.review.token_budget),
        ] {
            if budget == 0 {
                anyhow::bail!("{name} must be greater than 0");
            }
        }
        if self.provider.base_url.trim().is_empty() {
            anyhow::bail!("provider.base_url must not be empty");
        }
        Ok(())
    }

    /// Completion provider settings; fails without an API key.
    pub fn provider_settings(&self) -> anyhow::Result<ProviderSettings> {
        if self.provider.api_key.is_empty() {
            anyhow::bail!(
                "No API key configured. Set provider.api_key in the config file or {API_KEY_ENV}."
            );
        }
        Ok(ProviderSettings {
            api_key: self.provider.api_key.clone(),
            base_url: self.provider.base_url.clone(),
            model: self.provider.model.clone(),
            timeout: Duration::from_secs(self.provider.timeout_secs),
            retry: RetryPolicy::linear(self.provider.max_retries, RETRY_STEP),
        })
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");
        Self::write_template(&config_path)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your API key (or export {API_KEY_ENV})");
        println!("   2. Run 'tether chat' to talk to the model locally");
        println!("   3. Add a bot token and run 'tether telegram' to serve Telegram");
        println!();
        println!("🔧 Configuration options:");
        println!("   - context.window_size: Exchanges kept verbatim before summarizing");
        println!("   - context.system_prompt: Persona used for new sessions");
        println!("   - telegram.allow_from: Chat ids allowed to use the bot");
        println!();
        Ok(())
    }

    /// Write the starter config, refusing to replace an existing file.
    pub fn write_template(config_path: &Path) -> anyhow::Result<()> {
        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "provider": {
    "api_key": "your-deepseek-api-key-here",
    "base_url": "https://api.deepseek.com",
    "model": "deepseek-chat",
    "timeout_secs": 60,
    "max_retries": 2
  },
  "context": {
    "window_size": 6,
    "summary_token_budget": 120,
    "turn_token_budget": 2000,
    "system_prompt": "You are a helpful AI assistant."
  },
  "review": {
    "token_budget": 3000,
    "user_label": "Trainee",
    "assistant_label": "Client"
  },
  "transcript": {},
  "telegram": {
    "token": "",
    "allow_from": []
  }
}"#;

        std::fs::write(config_path, config_template)?;
        Ok(())
    }
}

/// Keep the first four characters of a secret, hide the rest.
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let visible: String = secret.chars().take(4).collect();
    if visible.len() == secret.len() {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_file_takes_defaults() {
        let config: Config = serde_json::from_str(r#"{"provider": {"api_key": "k"}}"#).unwrap();

        assert_eq!(config.provider.base_url, "https://api.deepseek.com");
        assert_eq!(config.provider.model, "deepseek-chat");
        assert_eq!(config.context.window_size, 6);
        assert_eq!(config.review.token_budget, 3000);
        assert!(config.telegram.allow_from.is_empty());
        assert!(config.transcript.dir.is_none());
    }

    #[test]
    fn template_parses_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        Config::write_template(&path).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.provider.api_key, "your-deepseek-api-key-here");
        assert_eq!(config.review.user_label, "Trainee");
    }

    #[test]
    fn template_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();

        assert!(Config::write_template(&path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("tether init"));
    }

    #[test]
    fn env_fills_only_empty_secrets() {
        let mut config = Config::default();
        config.telegram.token = "from-file".into();

        config.apply_env(|name| Some(format!("env:{name}")));

        assert_eq!(config.provider.api_key, "env:DEEPSEEK_API_KEY");
        assert_eq!(config.telegram.token, "from-file");
    }

    #[test]
    fn zero_window_or_budget_is_rejected() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.context.window_size = 0;
        assert!(config.validate().is_err());

        config.context.window_size = 6;
        config.review.token_budget = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("review.token_budget"));
    }

    #[test]
    fn provider_settings_need_a_key() {
        let mut config = Config::default();
        assert!(config.provider_settings().is_err());

        config.provider.api_key = "sk".into();
        config.provider.max_retries = 3;
        let settings = config.provider_settings().unwrap();
        assert_eq!(settings.retry.delays().len(), 3);
        assert_eq!(settings.timeout, Duration::from_secs(60));
    }

    #[test]
    fn secrets_are_masked() {
        assert_eq!(mask_secret(""), "(not set)");
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret("sk-1234567"), "sk-1****");
    }
}
