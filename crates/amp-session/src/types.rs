use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

// ─── Outer Message enum ───────────────────────────────────────────────────

/// Every message emitted by `amp --output-format stream-json`.
/// Discriminated by the JSON `"type"` field.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    System(SystemMessage),
    Assistant(AssistantMessage),
    Result(ResultMessage),
}

impl Message {
    pub fn session_id(&self) -> &str {
        match self {
            Message::System(m) => &m.session_id,
            Message::Assistant(m) => &m.session_id,
            Message::Result(m) => m.session_id(),
        }
    }

    /// Returns `Some(&ResultMessage)` if this is the terminal result message.
    pub fn as_result(&self) -> Option<&ResultMessage> {
        if let Message::Result(r) = self {
            Some(r)
        } else {
            None
        }
    }
}

// ─── System messages ──────────────────────────────────────────────────────

/// `type = "system"` — further distinguished by `subtype`.
///
/// Uses `#[serde(flatten)]` so the inner `SystemPayload` enum (tagged by
/// `subtype`) consumes the remaining fields after `session_id`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SystemMessage {
    pub session_id: String,
    #[serde(flatten)]
    pub payload: SystemPayload,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "subtype", rename_all = "snake_case")]
pub enum SystemPayload {
    /// First message — echoes the mounted session configuration.
    Init(SystemInit),
    /// Status update during the session.
    Status(SystemStatus),
    /// Any future/unknown system subtype — safe to ignore.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SystemInit {
    pub model: String,
    pub orchestrator: String,
    pub context: String,
    pub provider: String,
    pub cwd: String,
    #[serde(default)]
    pub amp_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SystemStatus {
    pub status: String,
}

// ─── Assistant messages ───────────────────────────────────────────────────

/// `type = "assistant"` — intermediate model output, including content blocks.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantMessage {
    pub message: AssistantContent,
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantContent {
    pub role: String,
    pub content: Vec<ContentBlock>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Thinking { thinking: String },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// ─── Result messages ──────────────────────────────────────────────────────

/// `type = "result"` — the terminal message in every session stream.
///
/// `subtype` distinguishes success from the error conditions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "subtype", rename_all = "snake_case")]
pub enum ResultMessage {
    Success(ResultSuccess),
    ErrorDuringExecution(ResultError),
    ErrorMaxIterations(ResultError),
}

impl ResultMessage {
    pub fn session_id(&self) -> &str {
        match self {
            ResultMessage::Success(r) => &r.session_id,
            ResultMessage::ErrorDuringExecution(r) | ResultMessage::ErrorMaxIterations(r) => {
                &r.session_id
            }
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, ResultMessage::Success(_))
    }

    /// The final result text. `None` for error subtypes.
    pub fn result_text(&self) -> Option<&str> {
        if let ResultMessage::Success(r) = self {
            Some(&r.result)
        } else {
            None
        }
    }

    pub fn total_cost_usd(&self) -> f64 {
        match self {
            ResultMessage::Success(r) => r.total_cost_usd,
            ResultMessage::ErrorDuringExecution(r) | ResultMessage::ErrorMaxIterations(r) => {
                r.total_cost_usd
            }
        }
    }

    pub fn num_turns(&self) -> u32 {
        match self {
            ResultMessage::Success(r) => r.num_turns,
            ResultMessage::ErrorDuringExecution(r) | ResultMessage::ErrorMaxIterations(r) => {
                r.num_turns
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResultSuccess {
    pub session_id: String,
    pub result: String,
    pub duration_ms: u64,
    pub is_error: bool,
    pub num_turns: u32,
    pub total_cost_usd: f64,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResultError {
    pub session_id: String,
    pub duration_ms: u64,
    pub is_error: bool,
    pub num_turns: u32,
    pub total_cost_usd: f64,
    pub usage: TokenUsage,
    #[serde(default)]
    pub errors: Vec<String>,
}

// ─── SessionOptions ───────────────────────────────────────────────────────

/// Options for driving an `amp` subprocess session.
///
/// Maps one-to-one onto the mount plan the executor accepts: provider config
/// (model, temperature, system prompt) plus the orchestrator and context
/// modules to mount.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Provider model identifier (e.g. `"claude-sonnet-4-5"`).
    pub model: Option<String>,
    /// Sampling temperature for the provider.
    pub temperature: Option<f32>,
    /// System prompt for the provider.
    pub system_prompt: Option<String>,
    /// Orchestrator module (e.g. `"loop-basic"`, `"loop-streaming"`).
    pub orchestrator: Option<String>,
    /// Context module (e.g. `"context-simple"`).
    pub context: Option<String>,
    /// Maximum orchestrator iterations before `error_max_iterations`.
    pub max_iterations: Option<u32>,
    /// Working directory for the subprocess (default: current dir).
    pub cwd: Option<PathBuf>,
    /// Additional environment variables for the subprocess.
    pub env: HashMap<String, String>,
    /// Custom path to the `amp` binary (default: `"amp"`).
    pub path_to_executable: Option<String>,
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_system_init() {
        let line = r#"{"type":"system","subtype":"init","session_id":"s1","model":"claude-sonnet-4-5","orchestrator":"loop-basic","context":"context-simple","provider":"provider-anthropic","cwd":"/tmp"}"#;
        let msg: Message = serde_json::from_str(line).unwrap();
        assert_eq!(msg.session_id(), "s1");
        match msg {
            Message::System(m) => match m.payload {
                SystemPayload::Init(init) => {
                    assert_eq!(init.orchestrator, "loop-basic");
                    assert_eq!(init.model, "claude-sonnet-4-5");
                }
                other => panic!("expected init, got {other:?}"),
            },
            other => panic!("expected system, got {other:?}"),
        }
    }

    #[test]
    fn parses_unknown_system_subtype() {
        let line = r#"{"type":"system","subtype":"compaction","session_id":"s1","detail":"x"}"#;
        let msg: Message = serde_json::from_str(line).unwrap();
        assert!(matches!(
            msg,
            Message::System(SystemMessage {
                payload: SystemPayload::Unknown,
                ..
            })
        ));
    }

    #[test]
    fn parses_result_success() {
        let line = r#"{"type":"result","subtype":"success","session_id":"s1","result":"done","duration_ms":5,"is_error":false,"num_turns":1,"total_cost_usd":0.01,"usage":{"input_tokens":10,"output_tokens":5}}"#;
        let msg: Message = serde_json::from_str(line).unwrap();
        let result = msg.as_result().unwrap();
        assert!(!result.is_error());
        assert_eq!(result.result_text(), Some("done"));
        assert_eq!(result.num_turns(), 1);
    }

    #[test]
    fn parses_result_error_subtypes() {
        let line = r#"{"type":"result","subtype":"error_max_iterations","session_id":"s2","duration_ms":5,"is_error":true,"num_turns":12,"total_cost_usd":0.2,"usage":{"input_tokens":10,"output_tokens":5},"errors":["iteration cap hit"]}"#;
        let msg: Message = serde_json::from_str(line).unwrap();
        let result = msg.as_result().unwrap();
        assert!(result.is_error());
        assert_eq!(result.result_text(), None);
        assert_eq!(result.session_id(), "s2");
    }

    #[test]
    fn result_error_errors_field_defaults_empty() {
        let line = r#"{"type":"result","subtype":"error_during_execution","session_id":"s3","duration_ms":5,"is_error":true,"num_turns":2,"total_cost_usd":0.0,"usage":{"input_tokens":1,"output_tokens":1}}"#;
        let msg: Message = serde_json::from_str(line).unwrap();
        match msg {
            Message::Result(ResultMessage::ErrorDuringExecution(e)) => {
                assert!(e.errors.is_empty())
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
