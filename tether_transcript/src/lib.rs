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

//! Transcript persistence.
//!
//! Every message of every session is appended to a per-session log that is
//! never rewritten. Resets of the in-memory context do not touch it.

mod file;
mod memory;

pub use file::FileTranscriptStore;
pub use memory::MemoryTranscriptStore;
