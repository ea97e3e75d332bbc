//! Stage 1: content analysis (analytical thinking).
//!
//! Input: raw tutorial markdown. Output object keys: `structure`, `sections`,
//! `concepts`, `complexity`, `examples`.

use serde_json::Value;

use crate::error::Result;
use crate::extract::extract_object;
use crate::session::{Orchestrator, StageConfig, StageRunner};

/// Analytical precision: low temperature, single-shot loop.
pub const ANALYZER_CONFIG: StageConfig = StageConfig {
    model: "claude-sonnet-4-5",
    temperature: 0.3,
    orchestrator: Orchestrator::LoopBasic,
    system_prompt: "\
You are an expert tutorial content analyzer.

Extract:
- Overall structure (sections, flow)
- Learning concepts introduced
- Prerequisites assumed
- Complexity level
- Code examples present

Return JSON with keys: structure, sections, concepts, complexity, examples
",
};

/// Analyze tutorial structure and content.
pub async fn analyze(runner: &dyn StageRunner, content: &str) -> Result<Value> {
    let prompt = format!(
        "\
Analyze this tutorial:

{content}

Return JSON with:
- structure: Overall organization
- sections: List of sections with titles
- concepts: Key concepts introduced
- complexity: Level (beginner/intermediate/advanced)
- examples: Code examples present (boolean)
"
    );

    let response = runner.execute(&ANALYZER_CONFIG, &prompt).await?;
    Ok(Value::Object(extract_object(&response)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testing::ScriptedRunner;

    #[tokio::test]
    async fn parses_fenced_response() {
        let runner = ScriptedRunner::new(&[
            "Here you go:\n```json\n{\"structure\": \"linear\", \"complexity\": \"beginner\"}\n```",
        ]);
        let analysis = analyze(&runner, "# Intro\nSome content").await.unwrap();
        assert_eq!(analysis["complexity"], "beginner");
        assert_eq!(runner.call_count(), 1);
    }

    #[tokio::test]
    async fn prompt_contains_content() {
        let runner = ScriptedRunner::new(&["{\"structure\": \"x\"}"]);
        analyze(&runner, "UNIQUE-MARKER").await.unwrap();
        let calls = runner.calls.lock().unwrap();
        assert!(calls[0].1.contains("UNIQUE-MARKER"));
    }
}
