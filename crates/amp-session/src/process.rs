use std::process::Stdio;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::types::{Message, SessionOptions};
use crate::{AmpSessionError, Result};

// ─── AmpProcess ───────────────────────────────────────────────────────────

/// A running `amp --output-format stream-json` subprocess.
///
/// The prompt is sent as a JSON user message on stdin, and responses are read
/// as JSONL from stdout. Stderr is captured in a background task and surfaced
/// on process exit errors.
pub(crate) struct AmpProcess {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    stdin: Option<ChildStdin>,
    /// Stderr output collected by a background reader task.
    stderr_buf: Arc<Mutex<String>>,
}

impl AmpProcess {
    /// Spawn the real `amp` binary with the given prompt and options.
    ///
    /// The prompt is sent as a user message on stdin; stdin is then closed
    /// for single-turn operation.
    pub(crate) async fn spawn(prompt: &str, opts: &SessionOptions) -> Result<Self> {
        let mut cmd = build_command(opts);

        for (k, v) in &opts.env {
            cmd.env(k, v);
        }

        let mut process = Self::from_command(cmd)?;

        let user_msg = serde_json::json!({
            "type": "user",
            "message": {
                "role": "user",
                "content": [{"type": "text", "text": prompt}]
            }
        });
        process.send_message(&user_msg).await?;
        process.close_stdin();

        Ok(process)
    }

    /// Spawn an arbitrary command as a mock amp process.
    /// Used in unit tests to inject a command that emits fixed JSON lines.
    #[cfg(test)]
    pub(crate) fn spawn_command(cmd: Command) -> Result<Self> {
        Self::from_command(cmd)
    }

    fn from_command(mut cmd: Command) -> Result<Self> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(AmpSessionError::Io)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AmpSessionError::Process("stdout not captured".into()))?;

        let stdin = child.stdin.take();

        // Drain stderr into a buffer so it can be attached to exit errors.
        let stderr_buf = Arc::new(Mutex::new(String::new()));
        if let Some(stderr) = child.stderr.take() {
            let buf = Arc::clone(&stderr_buf);
            tokio::spawn(async move {
                let mut reader = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    if let Ok(mut b) = buf.lock() {
                        if !b.is_empty() {
                            b.push('\n');
                        }
                        b.push_str(&line);
                    }
                }
            });
        }

        let lines = BufReader::new(stdout).lines();
        Ok(Self {
            child,
            lines,
            stdin,
            stderr_buf,
        })
    }

    /// Write a JSON message to the subprocess stdin.
    pub(crate) async fn send_message(&mut self, msg: &serde_json::Value) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| AmpSessionError::Process("stdin already closed".into()))?;

        let mut buf = serde_json::to_vec(msg).map_err(|e| {
            AmpSessionError::Process(format!("failed to serialize stdin message: {e}"))
        })?;
        buf.push(b'\n');

        stdin.write_all(&buf).await.map_err(AmpSessionError::Io)?;
        stdin.flush().await.map_err(AmpSessionError::Io)?;

        Ok(())
    }

    /// Close stdin, signalling no more input (single-turn mode).
    pub(crate) fn close_stdin(&mut self) {
        self.stdin.take();
    }

    /// Read the next non-empty JSONL line from stdout and deserialize it.
    ///
    /// Unknown message types are silently skipped so executor upgrades that
    /// add new event kinds don't break the stream.
    ///
    /// Returns `Ok(None)` on EOF (process exited normally).
    pub(crate) async fn next_message(&mut self) -> Result<Option<Message>> {
        loop {
            match self.lines.next_line().await {
                Err(e) => return Err(AmpSessionError::Io(e)),
                Ok(None) => return Ok(None),
                Ok(Some(line)) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Message>(trimmed) {
                        Ok(msg) => return Ok(Some(msg)),
                        Err(e) => {
                            if is_unknown_message_type(trimmed) {
                                continue;
                            }
                            return Err(AmpSessionError::Parse {
                                line: trimmed.to_owned(),
                                source: e,
                            });
                        }
                    }
                }
            }
        }
    }

    /// Wait for the child to exit and return an error if the exit code is
    /// non-zero or the process was killed by a signal. Captured stderr is
    /// included in the error message.
    pub(crate) async fn wait_exit_error(&mut self) -> Option<AmpSessionError> {
        let status = match self.child.wait().await {
            Ok(s) => s,
            Err(e) => return Some(AmpSessionError::Io(e)),
        };

        if status.success() {
            return None;
        }

        let stderr = self
            .stderr_buf
            .lock()
            .ok()
            .map(|b| b.clone())
            .unwrap_or_default();

        let msg = if let Some(code) = status.code() {
            if stderr.is_empty() {
                format!("amp process exited with code {code}")
            } else {
                format!("amp process exited with code {code}\nstderr: {stderr}")
            }
        } else if stderr.is_empty() {
            "amp process terminated by signal".to_string()
        } else {
            format!("amp process terminated by signal\nstderr: {stderr}")
        };

        Some(AmpSessionError::Process(msg))
    }

    /// Kill the subprocess (best-effort; errors are silently ignored).
    pub(crate) async fn kill(&mut self) {
        let _ = self.child.kill().await;
    }
}

/// Check if a JSON line has a `"type"` field with a value we don't recognise.
/// If it's valid JSON with a type field, it's an unknown message type and
/// should be skipped. If it's not valid JSON, it's a genuine parse error.
fn is_unknown_message_type(line: &str) -> bool {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(line) {
        v.get("type").is_some()
    } else {
        false
    }
}

// ─── Command builder ──────────────────────────────────────────────────────

fn build_command(opts: &SessionOptions) -> Command {
    let exe = opts.path_to_executable.as_deref().unwrap_or("amp");
    let mut cmd = Command::new(exe);

    cmd.arg("--output-format")
        .arg("stream-json")
        .arg("--input-format")
        .arg("stream-json");

    if let Some(model) = &opts.model {
        cmd.arg("--model").arg(model);
    }

    if let Some(temp) = opts.temperature {
        cmd.arg("--temperature").arg(temp.to_string());
    }

    if let Some(sp) = &opts.system_prompt {
        cmd.arg("--system-prompt").arg(sp);
    }

    if let Some(orchestrator) = &opts.orchestrator {
        cmd.arg("--orchestrator").arg(orchestrator);
    }

    if let Some(context) = &opts.context {
        cmd.arg("--context").arg(context);
    }

    if let Some(max) = opts.max_iterations {
        cmd.arg("--max-iterations").arg(max.to_string());
    }

    if let Some(cwd) = &opts.cwd {
        cmd.current_dir(cwd);
    }

    // NOTE: prompt is NOT a positional arg — it's sent via stdin

    cmd
}
