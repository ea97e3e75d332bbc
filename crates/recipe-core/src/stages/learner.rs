//! Stage 2: learner experience simulation (empathetic thinking).
//!
//! Input: tutorial content plus the stage-1 analysis. Output object keys:
//! `confusion_points`, `clarity_issues`, `missing_context`, `suggestions`.

use serde_json::Value;

use crate::error::Result;
use crate::extract::extract_object;
use crate::session::{Orchestrator, StageConfig, StageRunner};

/// Empathetic simulation: mid temperature, streaming loop.
pub const LEARNER_CONFIG: StageConfig = StageConfig {
    model: "claude-opus-4-1",
    temperature: 0.5,
    orchestrator: Orchestrator::LoopStreaming,
    system_prompt: "\
You are a learner encountering this tutorial for the first time.

Simulate the learning experience:
- Where do you get confused?
- What assumptions does the tutorial make?
- What context is missing?
- Which transitions are unclear?
- What examples would help?

Return JSON with keys: confusion_points, clarity_issues, missing_context, suggestions
",
};

/// Simulate a first-time learner working through the tutorial.
pub async fn simulate_learner(
    runner: &dyn StageRunner,
    content: &str,
    analysis: &Value,
) -> Result<Value> {
    let analysis_text = serde_json::to_string_pretty(analysis)?;
    let prompt = format!(
        "\
Simulate learning from this tutorial:

TUTORIAL:
{content}

ANALYSIS:
{analysis_text}

As a learner encountering this for the first time, report:
- confusion_points: Where did you get stuck or confused?
- clarity_issues: What was hard to understand?
- missing_context: What background knowledge was assumed?
- suggestions: What would have helped?

Return as JSON.
"
    );

    let response = runner.execute(&LEARNER_CONFIG, &prompt).await?;
    Ok(Value::Object(extract_object(&response)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testing::ScriptedRunner;
    use serde_json::json;

    #[tokio::test]
    async fn feeds_analysis_into_prompt() {
        let runner = ScriptedRunner::new(&["{\"confusion_points\": []}"]);
        let analysis = json!({"complexity": "advanced-marker"});
        simulate_learner(&runner, "content", &analysis).await.unwrap();
        let calls = runner.calls.lock().unwrap();
        assert!(calls[0].1.contains("advanced-marker"));
        assert_eq!(calls[0].0, "claude-opus-4-1");
    }
}
