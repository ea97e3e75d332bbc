//! Stage 5: improvement evaluation (evaluative thinking).
//!
//! Input: improvements plus the diagnosis they respond to. Output object
//! keys: `scores`, `strengths`, `weaknesses`, `overall_quality`. The
//! `overall_quality` number drives the quality loop.

use serde_json::Value;

use crate::error::Result;
use crate::extract::extract_object;
use crate::session::{Orchestrator, StageConfig, StageRunner};

/// Evaluative consistency: low temperature keeps scores comparable across
/// iterations.
pub const CRITIC_CONFIG: StageConfig = StageConfig {
    model: "claude-sonnet-4-5",
    temperature: 0.2,
    orchestrator: Orchestrator::LoopBasic,
    system_prompt: "\
You are a quality evaluator for tutorial improvements.

Evaluate improvements objectively:
- Are suggestions specific and actionable?
- Do they address root causes?
- Are examples clear and helpful?
- Is the rationale sound?

Return JSON with keys: scores, strengths, weaknesses, overall_quality
",
};

/// Evaluate the quality of improvement suggestions.
pub async fn evaluate_improvements(
    runner: &dyn StageRunner,
    improvements: &Value,
    diagnosis: &Value,
) -> Result<Value> {
    let improvements_text = serde_json::to_string_pretty(improvements)?;
    let diagnosis_text = serde_json::to_string_pretty(diagnosis)?;
    let prompt = format!(
        "\
Evaluate these improvement suggestions:

IMPROVEMENTS:
{improvements_text}

ORIGINAL DIAGNOSIS:
{diagnosis_text}

Return EXACTLY this JSON structure:

{{
  \"scores\": {{\"specificity\": 0.8, \"actionability\": 0.9, \"impact\": 0.7}},
  \"strengths\": \"What makes these improvements strong\",
  \"weaknesses\": \"What could be improved\",
  \"overall_quality\": 0.8
}}

Provide honest, specific evaluation. Score from 0.0 to 1.0.
"
    );

    let response = runner.execute(&CRITIC_CONFIG, &prompt).await?;
    Ok(Value::Object(extract_object(&response)?))
}

/// Read `overall_quality` from a critique, defaulting to 0.0 when the field
/// is absent or not a number. A missing score must count as a failed
/// evaluation, never as a pass.
pub fn overall_quality(critique: &Value) -> f64 {
    critique
        .get("overall_quality")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// Weaknesses text used as regeneration feedback.
pub fn weaknesses(critique: &Value) -> Option<&str> {
    critique.get("weaknesses").and_then(Value::as_str)
}
