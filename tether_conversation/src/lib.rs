#![warn(
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

//! Per-session conversation context.
//!
//! Each session keeps a bounded window of recent exchanges, a running summary
//! of everything evicted from that window, and an append-only transcript.
//!
//! # Key Features
//! - Explicit `start` / `reset` transitions, distinct from lookup
//! - FIFO eviction folded into the summary one message at a time
//! - Gateway and persistence failures degrade the turn instead of aborting it
//! - Supervisor-style review of a full transcript

mod context;
mod error;
mod prompts;
mod registry;
mod review;
mod summarizer;
mod window;

pub use context::{SessionContext, SessionServices};
pub use error::ConversationError;
pub use prompts::{NOTHING_TO_REVIEW, NOTHING_TO_SUMMARIZE, RESET_MARKER, SUMMARY_UNAVAILABLE};
pub use registry::{SessionHandle, SessionRegistry, StartOutcome};
pub use review::Reviewer;
pub use summarizer::Summarizer;
pub use window::{ContextWindow, Exchange};
