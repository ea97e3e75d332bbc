//! The six cognitive stages of the analysis pipeline.
//!
//! Each stage is self-contained: it owns its immutable [`StageConfig`],
//! builds its prompt from prior-stage results, performs exactly one session
//! via the supplied [`StageRunner`], and parses the response into a JSON
//! object. Stages never touch the state store and never retry; checkpointing
//! and retries belong to the orchestration layer.
//!
//! [`StageConfig`]: crate::session::StageConfig
//! [`StageRunner`]: crate::session::StageRunner

pub mod analyzer;
pub mod critic;
pub mod diagnostician;
pub mod improver;
pub mod learner;
pub mod synthesizer;

/// Stage keys as they appear in the checkpoint document, in pipeline order.
pub const ANALYSIS: &str = "analysis";
pub const LEARNER_EXPERIENCE: &str = "learner_experience";
pub const DIAGNOSIS: &str = "diagnosis";
pub const IMPROVEMENTS: &str = "improvements";
pub const HUMAN_APPROVAL: &str = "human_approval";
pub const CRITIQUE: &str = "critique";
pub const SYNTHESIS: &str = "synthesis";

/// Stages the quality loop clears when it schedules a regeneration. The
/// upstream stages (analysis, learner experience, diagnosis) are kept; only
/// the generate-and-evaluate tail is redone.
pub const REGENERATED: &[&str] = &[IMPROVEMENTS, HUMAN_APPROVAL, CRITIQUE, SYNTHESIS];

#[cfg(test)]
pub(crate) mod testing {
    use crate::error::{RecipeError, Result};
    use crate::session::{StageConfig, StageRunner};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted runner: pops responses front-to-back and records every
    /// config/prompt pair it saw.
    pub struct ScriptedRunner {
        responses: Mutex<Vec<String>>,
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedRunner {
        pub fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl StageRunner for ScriptedRunner {
        async fn execute(&self, config: &StageConfig, prompt: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((config.model.to_string(), prompt.to_string()));
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(RecipeError::Stage {
                    stage: "scripted".into(),
                    message: "no scripted response left".into(),
                });
            }
            Ok(responses.remove(0))
        }
    }
}
