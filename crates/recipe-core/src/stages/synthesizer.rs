//! Stage 6: final synthesis (analytical thinking).
//!
//! Input: critique, improvements, and diagnosis. Output object keys:
//! `recommendations`, `implementation_order`, `quality_score`.

use serde_json::Value;

use crate::error::Result;
use crate::extract::extract_object;
use crate::session::{Orchestrator, StageConfig, StageRunner};

pub const SYNTHESIZER_CONFIG: StageConfig = StageConfig {
    model: "claude-sonnet-4-5",
    temperature: 0.3,
    orchestrator: Orchestrator::LoopBasic,
    system_prompt: "\
You are a synthesis expert creating final recommendations.

Synthesize all information into actionable plan:
- Prioritize improvements by impact
- Recommend implementation order
- Provide clear, structured guidance
- Include quality assessment

Return JSON with keys: recommendations, implementation_order, quality_score
",
};

/// Synthesize the final recommendation plan from all prior stages.
pub async fn synthesize_recommendations(
    runner: &dyn StageRunner,
    critique: &Value,
    improvements: &Value,
    diagnosis: &Value,
) -> Result<Value> {
    let critique_text = serde_json::to_string_pretty(critique)?;
    let improvements_text = serde_json::to_string_pretty(improvements)?;
    let diagnosis_text = serde_json::to_string_pretty(diagnosis)?;
    let prompt = format!(
        "\
Synthesize final recommendations:

CRITIQUE:
{critique_text}

IMPROVEMENTS:
{improvements_text}

ORIGINAL DIAGNOSIS:
{diagnosis_text}

Return EXACTLY this JSON structure:

{{
  \"recommendations\": [\"First action to take\", \"Second action\", \"Third action\"],
  \"implementation_order\": [1, 2, 3],
  \"quality_score\": 0.85
}}

Provide clear, prioritized recommendations. Quality score from 0.0 to 1.0.
"
    );

    let response = runner.execute(&SYNTHESIZER_CONFIG, &prompt).await?;
    Ok(Value::Object(extract_object(&response)?))
}
