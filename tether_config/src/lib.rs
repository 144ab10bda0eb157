mod schema;

pub use schema::{Config, ProviderConfig, TelegramConfig, TranscriptConfig, mask_secret};
