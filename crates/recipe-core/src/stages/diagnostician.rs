//! Stage 3: issue diagnosis (precision thinking).
//!
//! Input: learner experience plus analysis. Output object keys: `issues`,
//! `severity`, `root_causes`, `priority`.

use serde_json::Value;

use crate::error::Result;
use crate::extract::extract_object;
use crate::session::{Orchestrator, StageConfig, StageRunner};

/// Diagnostic precision: lowest temperature in the pipeline.
pub const DIAGNOSTICIAN_CONFIG: StageConfig = StageConfig {
    model: "claude-sonnet-4-5",
    temperature: 0.1,
    orchestrator: Orchestrator::LoopBasic,
    system_prompt: "\
You are a pedagogy expert identifying tutorial issues.

Diagnose pedagogical problems:
- What are the root causes of confusion?
- Which issues are most critical?
- What patterns of problems exist?
- How do issues cascade?

Return JSON with keys: issues, severity, root_causes, priority
",
};

/// Diagnose pedagogical issues from the learner's perspective.
pub async fn diagnose_issues(
    runner: &dyn StageRunner,
    learner_experience: &Value,
    analysis: &Value,
) -> Result<Value> {
    let experience_text = serde_json::to_string_pretty(learner_experience)?;
    let analysis_text = serde_json::to_string_pretty(analysis)?;
    let prompt = format!(
        "\
Diagnose pedagogical issues:

LEARNER EXPERIENCE:
{experience_text}

TUTORIAL ANALYSIS:
{analysis_text}

Identify:
- issues: Specific pedagogical problems
- severity: How critical each issue is (critical/major/minor)
- root_causes: Why these issues exist
- priority: Recommended fix order

Return as JSON with arrays of issue objects.
"
    );

    let response = runner.execute(&DIAGNOSTICIAN_CONFIG, &prompt).await?;
    Ok(Value::Object(extract_object(&response)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testing::ScriptedRunner;
    use serde_json::json;

    #[tokio::test]
    async fn combines_both_inputs() {
        let runner = ScriptedRunner::new(&["{\"issues\": [\"missing prereqs\"]}"]);
        let experience = json!({"confusion_points": ["step-3-marker"]});
        let analysis = json!({"structure": "structure-marker"});
        let diagnosis = diagnose_issues(&runner, &experience, &analysis)
            .await
            .unwrap();
        assert_eq!(diagnosis["issues"][0], "missing prereqs");
        let calls = runner.calls.lock().unwrap();
        assert!(calls[0].1.contains("step-3-marker"));
        assert!(calls[0].1.contains("structure-marker"));
    }
}
