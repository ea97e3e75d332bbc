use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::process::AmpProcess;
use crate::types::{Message, SessionOptions};
use crate::Result;

// ─── SessionStream ────────────────────────────────────────────────────────

/// An async stream of [`Message`]s from an `amp` subprocess.
///
/// Backed by a Tokio mpsc channel. A background task owns [`AmpProcess`]
/// and forwards messages until it receives a terminal `Result` message or
/// the process exits. Dropping `SessionStream` closes the receiver, which
/// causes the background task to exit on the next send attempt.
pub struct SessionStream {
    rx: mpsc::Receiver<Result<Message>>,
}

impl SessionStream {
    pub(crate) fn new(prompt: String, opts: SessionOptions) -> Self {
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let mut process = match AmpProcess::spawn(&prompt, &opts).await {
                Ok(p) => p,
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            };

            let mut got_result = false;
            loop {
                match process.next_message().await {
                    Err(e) => {
                        let _ = tx.send(Err(e)).await;
                        break;
                    }
                    Ok(None) => break, // EOF — process exited
                    Ok(Some(msg)) => {
                        let is_terminal = matches!(msg, Message::Result(_));
                        if is_terminal {
                            got_result = true;
                        }
                        if tx.send(Ok(msg)).await.is_err() {
                            break; // Receiver dropped
                        }
                        if is_terminal {
                            break;
                        }
                    }
                }
            }

            // If the process exited without a Result message, check for a
            // non-zero exit code and surface captured stderr.
            if !got_result {
                if let Some(exit_err) = process.wait_exit_error().await {
                    let _ = tx.send(Err(exit_err)).await;
                }
            }

            process.kill().await;
        });

        SessionStream { rx }
    }

    /// Test-only constructor: wrap a raw mpsc receiver as a `SessionStream`.
    /// Used by `runner` tests to inject pre-built message sequences.
    #[cfg(test)]
    pub(crate) fn from_channel(rx: mpsc::Receiver<Result<Message>>) -> Self {
        Self { rx }
    }
}

impl Stream for SessionStream {
    type Item = Result<Message>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
