use async_trait::async_trait;

use crate::error::Result;

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Orchestrator module mounted for a stage's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orchestrator {
    /// Single-shot request/response loop. The default for analytical and
    /// evaluative stages.
    #[default]
    LoopBasic,
    /// Streaming loop for long-form generation stages.
    LoopStreaming,
}

impl Orchestrator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orchestrator::LoopBasic => "loop-basic",
            Orchestrator::LoopStreaming => "loop-streaming",
        }
    }
}

// ---------------------------------------------------------------------------
// StageConfig
// ---------------------------------------------------------------------------

/// Immutable session configuration for one cognitive stage.
///
/// Each stage owns one of these as a constant: the model, the sampling
/// temperature tuned to the stage's cognitive role (analytical ≈ 0.2–0.3,
/// creative ≈ 0.5–0.7), the orchestrator mode, and the system prompt.
/// Configs are policy decided by the tool author; they are never mutated at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageConfig {
    pub model: &'static str,
    pub temperature: f32,
    pub orchestrator: Orchestrator,
    pub system_prompt: &'static str,
}

// ---------------------------------------------------------------------------
// StageRunner
// ---------------------------------------------------------------------------

/// The seam between stage functions and the external session executor.
///
/// One call to [`execute`](StageRunner::execute) performs exactly one
/// external session — stage functions never retry internally; retries are
/// the orchestration layer's decision. The CLI implements this over the
/// `amp` subprocess driver; tests use scripted runners.
#[async_trait]
pub trait StageRunner: Send + Sync {
    /// Run one session with the given stage configuration and prompt,
    /// returning the session's final text.
    async fn execute(&self, config: &StageConfig, prompt: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orchestrator_wire_names() {
        assert_eq!(Orchestrator::LoopBasic.as_str(), "loop-basic");
        assert_eq!(Orchestrator::LoopStreaming.as_str(), "loop-streaming");
    }

    #[test]
    fn default_orchestrator_is_basic() {
        assert_eq!(Orchestrator::default(), Orchestrator::LoopBasic);
    }
}
