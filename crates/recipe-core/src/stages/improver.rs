//! Stage 4: improvement generation (creative thinking).
//!
//! Input: diagnosis, optional focus areas, and any feedback accumulated from
//! earlier quality-loop iterations. Output object keys: `suggestions`,
//! `rationale`, `examples`.

use serde_json::Value;

use crate::error::Result;
use crate::extract::extract_object;
use crate::session::{Orchestrator, StageConfig, StageRunner};

/// Creative exploration: highest temperature, streaming loop.
pub const IMPROVER_CONFIG: StageConfig = StageConfig {
    model: "claude-opus-4-1",
    temperature: 0.7,
    orchestrator: Orchestrator::LoopStreaming,
    system_prompt: "\
You are a creative tutorial improvement expert.

Generate specific, actionable improvements:
- Clear, concrete suggestions
- Examples of how to implement
- Rationale for each improvement
- Consider pedagogical best practices

Return JSON with keys: suggestions, rationale, examples
",
};

/// Generate improvement suggestions from the diagnosis.
///
/// `feedback` carries the critique of previous attempts; appending it to the
/// prompt is what makes each quality-loop iteration different from the last.
pub async fn generate_improvements(
    runner: &dyn StageRunner,
    diagnosis: &Value,
    focus_areas: &[String],
    feedback: Option<&str>,
) -> Result<Value> {
    let diagnosis_text = serde_json::to_string_pretty(diagnosis)?;
    let focus_text = if focus_areas.is_empty() {
        String::new()
    } else {
        format!("\nFocus areas: {}", focus_areas.join(", "))
    };
    let feedback_text = match feedback {
        Some(f) if !f.trim().is_empty() => {
            format!("\nFeedback on previous attempts, address all of it:\n{f}\n")
        }
        _ => String::new(),
    };

    let prompt = format!(
        "\
Generate improvements for this tutorial:

DIAGNOSIS:
{diagnosis_text}
{focus_text}{feedback_text}
CRITICAL: Return EXACTLY this JSON structure with AT LEAST 5-8 different improvements:

{{
  \"suggestions\": [
    {{
      \"title\": \"First Improvement\",
      \"description\": \"Detailed description\",
      \"location\": \"Section/location\"
    }},
    {{
      \"title\": \"Second Improvement\",
      \"description\": \"Another improvement\",
      \"location\": \"Where to add this\"
    }},
    {{
      \"title\": \"Third Improvement\",
      \"description\": \"Keep adding more\",
      \"location\": \"Location\"
    }}
  ],
  \"rationale\": \"Why these improvements help learners\",
  \"examples\": \"Implementation examples\"
}}

IMPORTANT: The \"suggestions\" field MUST be an ARRAY of at least 5-8 improvement objects.
Generate specific, actionable, pedagogically-focused improvements.
"
    );

    let response = runner.execute(&IMPROVER_CONFIG, &prompt).await?;
    Ok(Value::Object(extract_object(&response)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testing::ScriptedRunner;
    use serde_json::json;

    #[tokio::test]
    async fn focus_areas_appear_in_prompt() {
        let runner = ScriptedRunner::new(&["{\"suggestions\": []}"]);
        let diagnosis = json!({"issues": []});
        generate_improvements(
            &runner,
            &diagnosis,
            &["clarity".into(), "examples".into()],
            None,
        )
        .await
        .unwrap();
        let calls = runner.calls.lock().unwrap();
        assert!(calls[0].1.contains("Focus areas: clarity, examples"));
    }

    #[tokio::test]
    async fn feedback_appears_in_prompt() {
        let runner = ScriptedRunner::new(&["{\"suggestions\": []}"]);
        generate_improvements(
            &runner,
            &json!({}),
            &[],
            Some("suggestions were too vague"),
        )
        .await
        .unwrap();
        let calls = runner.calls.lock().unwrap();
        assert!(calls[0].1.contains("suggestions were too vague"));
    }

    #[tokio::test]
    async fn blank_feedback_is_omitted() {
        let runner = ScriptedRunner::new(&["{\"suggestions\": []}"]);
        generate_improvements(&runner, &json!({}), &[], Some("   "))
            .await
            .unwrap();
        let calls = runner.calls.lock().unwrap();
        assert!(!calls[0].1.contains("previous attempts"));
    }
}
