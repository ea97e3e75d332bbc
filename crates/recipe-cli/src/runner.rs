//! Stage execution over the `amp` subprocess driver.

use amp_session::{session_run, RunConfig, SessionOptions};
use async_trait::async_trait;
use recipe_core::error::{RecipeError, Result};
use recipe_core::session::{StageConfig, StageRunner};

/// Runs each stage as one `amp` session, mapping the stage's immutable
/// config onto the executor's mount plan.
pub struct AmpRunner {
    amp_bin: Option<String>,
    model_override: Option<String>,
}

impl AmpRunner {
    pub fn new(amp_bin: Option<String>, model_override: Option<String>) -> Self {
        Self {
            amp_bin,
            model_override,
        }
    }
}

#[async_trait]
impl StageRunner for AmpRunner {
    async fn execute(&self, config: &StageConfig, prompt: &str) -> Result<String> {
        let model = self
            .model_override
            .clone()
            .unwrap_or_else(|| config.model.to_string());
        let opts = SessionOptions {
            model: Some(model),
            temperature: Some(config.temperature),
            system_prompt: Some(config.system_prompt.to_string()),
            orchestrator: Some(config.orchestrator.as_str().to_string()),
            context: Some("context-simple".to_string()),
            path_to_executable: self.amp_bin.clone(),
            ..Default::default()
        };

        let result = session_run(RunConfig {
            prompt: prompt.to_string(),
            opts,
        })
        .await
        .map_err(|e| RecipeError::Stage {
            stage: "session".to_string(),
            message: e.to_string(),
        })?;

        if result.is_error {
            return Err(RecipeError::Stage {
                stage: "session".to_string(),
                message: format!(
                    "session {} ended with an error after {} turn(s)",
                    result.session_id, result.num_turns
                ),
            });
        }

        tracing::debug!(
            session_id = %result.session_id,
            cost_usd = result.total_cost_usd,
            turns = result.num_turns,
            "session complete"
        );
        Ok(result.result_text)
    }
}
