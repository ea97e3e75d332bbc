use futures::StreamExt;

use crate::stream::SessionStream;
use crate::{query, AmpSessionError, Message, Result, SessionOptions};

// ─── RunConfig ────────────────────────────────────────────────────────────

/// Configuration for a single session run.
///
/// Pass to [`run`] to drive a query to completion and receive a
/// [`SessionResult`].
#[derive(Debug)]
pub struct RunConfig {
    /// The prompt the session will act on.
    pub prompt: String,
    /// Session options: model, temperature, orchestrator, etc.
    pub opts: SessionOptions,
}

// ─── SessionResult ────────────────────────────────────────────────────────

/// The terminal result of a completed session run.
#[derive(Debug)]
pub struct SessionResult {
    pub session_id: String,
    /// The final text the session produced (empty string for error subtypes).
    pub result_text: String,
    pub total_cost_usd: f64,
    pub num_turns: u32,
    /// `true` if the run ended with any error subtype.
    pub is_error: bool,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Drive a single `amp` session to completion.
///
/// Starts a [`SessionStream`], consumes all messages, and returns the
/// terminal result message as a [`SessionResult`].
///
/// Returns `Err` if the stream ends without a `Result` message (e.g., the
/// process crashed) or if any message fails to parse.
pub async fn run(config: RunConfig) -> Result<SessionResult> {
    collect(query(config.prompt, config.opts)).await
}

// ─── Internal ─────────────────────────────────────────────────────────────

/// Consume a [`SessionStream`] and extract the terminal [`SessionResult`].
///
/// Exposed as `pub(crate)` so tests can inject mock streams directly without
/// spawning a real subprocess.
pub(crate) async fn collect(stream: SessionStream) -> Result<SessionResult> {
    let mut stream = stream;
    let mut run_result: Option<SessionResult> = None;

    while let Some(msg) = stream.next().await {
        if let Message::Result(r) = msg? {
            run_result = Some(SessionResult {
                session_id: r.session_id().to_string(),
                result_text: r.result_text().unwrap_or("").to_string(),
                total_cost_usd: r.total_cost_usd(),
                num_turns: r.num_turns(),
                is_error: r.is_error(),
            });
            // Result is the terminal message — no need to consume further.
            break;
        }
    }

    run_result
        .ok_or_else(|| AmpSessionError::Process("stream ended without a result message".into()))
}

// ─── Tests ────────────────────────────────────────────────────────────────
