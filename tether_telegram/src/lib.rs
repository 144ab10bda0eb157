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

//! Telegram transport: chat events in, registry operations out.

mod bot;
mod command;
mod error;
mod format;
mod handler;

pub use bot::TelegramBot;
pub use command::Command;
pub use error::{Error, Result};
pub use format::{TELEGRAM_MESSAGE_LIMIT, asterisk_to_quote, split_message};
