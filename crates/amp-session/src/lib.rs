//! `amp-session` — native Rust driver for the `amp` session-executor CLI.
//!
//! The `amp` executor runs one AI session per invocation: it accepts a mount
//! plan (provider model, temperature, system prompt, orchestrator and context
//! modules) plus a prompt, and emits a JSONL message stream terminated by a
//! single `result` message. This crate drives that subprocess protocol as a
//! typed library so pipeline tools never shell out by hand.
//!
//! # Architecture
//!
//! ```text
//! SessionOptions
//!     │
//!     ▼
//! AmpProcess      ← spawns `amp --output-format stream-json …`
//!     │              reads JSONL from stdout
//!     ▼
//! SessionStream   ← implements futures::Stream<Item = Result<Message>>
//!     │              background task + mpsc channel
//!     ▼
//! Message enum    ← fully typed; no Value escape hatches
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use amp_session::runner::{run, RunConfig};
//! use amp_session::SessionOptions;
//!
//! let result = run(RunConfig {
//!     prompt: "Summarize this tutorial.".into(),
//!     opts: SessionOptions {
//!         model: Some("claude-sonnet-4-5".into()),
//!         temperature: Some(0.3),
//!         ..Default::default()
//!     },
//! }).await?;
//! println!("{}", result.result_text);
//! ```

pub mod error;
pub mod runner;
pub mod types;

pub(crate) mod process;
pub mod stream;

pub use error::AmpSessionError;
pub use runner::{run as session_run, RunConfig, SessionResult};
pub use stream::SessionStream;
pub use types::{
    AssistantContent, AssistantMessage, ContentBlock, Message, ResultError, ResultMessage,
    ResultSuccess, SessionOptions, SystemMessage, SystemPayload, TokenUsage,
};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, AmpSessionError>;

/// Drive a single query against the `amp` executor.
///
/// Returns a [`SessionStream`] that yields [`Message`] values as they arrive
/// from the subprocess. The stream terminates after the first
/// [`Message::Result`] or on process exit.
pub fn query(prompt: impl Into<String>, opts: SessionOptions) -> SessionStream {
    SessionStream::new(prompt.into(), opts)
}
