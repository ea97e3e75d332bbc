//! Markdown report rendered from a completed state document.
//!
//! Stage outputs are loosely shaped JSON, so every section degrades
//! gracefully when a key is absent or differently typed. The report is
//! plain markdown with no schema beyond that.

use serde_json::Value;

use crate::stages;
use crate::state::StateDoc;

/// Render the analysis report for a completed (or best-effort) run.
pub fn render(state: &StateDoc, tutorial_identifier: &str) -> String {
    let mut out = String::new();

    out.push_str("# Tutorial Analysis Report\n\n");
    out.push_str(&format!("**Tutorial:** `{tutorial_identifier}`\n\n"));
    out.push_str(&format!(
        "**Analyzed:** {}\n\n",
        chrono::Utc::now().format("%Y-%m-%d")
    ));
    let score = state
        .get(stages::SYNTHESIS)
        .and_then(|s| s.get("quality_score"))
        .and_then(Value::as_f64);
    match score {
        Some(s) => out.push_str(&format!("**Quality Score:** {s}\n")),
        None => out.push_str("**Quality Score:** N/A\n"),
    }
    out.push_str("\n---\n\n");

    if let Some(diagnosis) = state.get(stages::DIAGNOSIS) {
        out.push_str("## Diagnosis Summary\n\n");
        if let Some(summary) = diagnosis.get("summary") {
            let primary = summary
                .get("primary_pedagogical_failure")
                .and_then(Value::as_str)
                .unwrap_or("N/A");
            out.push_str(&format!("**Primary Issue:** {primary}\n\n"));
            out.push_str(&format!(
                "**Issues Found:** {} critical, {} major, {} minor\n\n",
                count(summary, "critical_issues"),
                count(summary, "major_issues"),
                count(summary, "minor_issues"),
            ));
        }
        if let Some(issues) = diagnosis.get("issues").and_then(Value::as_array) {
            out.push_str("### Identified Issues\n\n");
            for issue in issues {
                match issue {
                    Value::Object(obj) => {
                        let severity = obj
                            .get("severity")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown")
                            .to_uppercase();
                        let text = obj
                            .get("issue")
                            .and_then(Value::as_str)
                            .unwrap_or("Unknown issue");
                        out.push_str(&format!("- **[{severity}]** {text}\n"));
                    }
                    Value::String(text) => out.push_str(&format!("- {text}\n")),
                    _ => {}
                }
            }
            out.push('\n');
        }
    }

    if let Some(experience) = state.get(stages::LEARNER_EXPERIENCE) {
        out.push_str("## From Learner Perspective\n\n");
        if let Some(issue) = experience.get("issue").and_then(Value::as_str) {
            out.push_str(&format!("**Confusion Point:** {issue}\n\n"));
        }
        if let Some(location) = experience.get("location").and_then(Value::as_str) {
            out.push_str(&format!("**Location:** {location}\n\n"));
        }
        if let Some(points) = experience.get("confusion_points").and_then(Value::as_array) {
            for point in points.iter().filter_map(|p| p.as_str()) {
                out.push_str(&format!("- {point}\n"));
            }
            out.push('\n');
        }
    }

    if let Some(improvements) = state.get(stages::IMPROVEMENTS) {
        out.push_str("## Recommended Improvements\n\n");
        for (i, suggestion) in suggestions(improvements).iter().enumerate() {
            let n = i + 1;
            match suggestion {
                Value::Object(obj) => {
                    let title = obj.get("title").and_then(Value::as_str).unwrap_or("Untitled");
                    let description = obj
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or("No description");
                    out.push_str(&format!("### {n}. {title}\n\n{description}\n\n"));
                    if let Some(location) = obj.get("location").and_then(Value::as_str) {
                        out.push_str(&format!("**Location:** {location}\n\n"));
                    }
                }
                other => out.push_str(&format!("### {n}. {other}\n\n")),
            }
        }
    }

    if let Some(synthesis) = state.get(stages::SYNTHESIS) {
        out.push_str("## Implementation Priority\n\n");
        if let Some(recommendations) = synthesis.get("recommendations").and_then(Value::as_array) {
            for (i, rec) in recommendations.iter().enumerate() {
                let text = rec.as_str().map(str::to_owned).unwrap_or_else(|| rec.to_string());
                out.push_str(&format!("{}. {text}\n", i + 1));
            }
        }
        out.push('\n');
    }

    out.push_str("---\n\n");
    out.push_str("*Generated by recipe-analyze using the multi-config metacognitive recipe pattern*\n");

    out
}

/// Improvements may be a single suggestion object, a `suggestions` array, or
/// a legacy `improvements` array.
fn suggestions(improvements: &Value) -> Vec<Value> {
    if improvements.get("title").is_some() && improvements.get("description").is_some() {
        return vec![improvements.clone()];
    }
    improvements
        .get("suggestions")
        .or_else(|| improvements.get("improvements"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn count(summary: &Value, key: &str) -> u64 {
    summary.get(key).and_then(Value::as_u64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages;
    use serde_json::json;

    fn full_state() -> StateDoc {
        let mut doc = StateDoc::new();
        doc.set(
            stages::DIAGNOSIS,
            json!({
                "summary": {
                    "primary_pedagogical_failure": "missing prerequisites",
                    "critical_issues": 1,
                    "major_issues": 2,
                    "minor_issues": 3
                },
                "issues": [
                    {"severity": "critical", "issue": "no setup section"},
                    "unstructured note"
                ]
            }),
        );
        doc.set(
            stages::LEARNER_EXPERIENCE,
            json!({"confusion_points": ["what is a handle?"]}),
        );
        doc.set(
            stages::IMPROVEMENTS,
            json!({
                "suggestions": [
                    {"title": "Add prerequisites", "description": "List required tools", "location": "top"}
                ]
            }),
        );
        doc.set(
            stages::SYNTHESIS,
            json!({
                "quality_score": 0.85,
                "recommendations": ["Add prerequisites section", "Expand examples"]
            }),
        );
        doc
    }

    #[test]
    fn renders_all_sections() {
        let report = render(&full_state(), "intro.md");
        assert!(report.contains("# Tutorial Analysis Report"));
        assert!(report.contains("**Tutorial:** `intro.md`"));
        assert!(report.contains("**Analyzed:**"));
        assert!(report.contains("**Quality Score:** 0.85"));
        assert!(report.contains("## Diagnosis Summary"));
        assert!(report.contains("**[CRITICAL]** no setup section"));
        assert!(report.contains("1 critical, 2 major, 3 minor"));
        assert!(report.contains("### 1. Add prerequisites"));
        assert!(report.contains("**Location:** top"));
        assert!(report.contains("1. Add prerequisites section"));
        assert!(report.contains("2. Expand examples"));
    }

    #[test]
    fn empty_state_still_renders_header() {
        let report = render(&StateDoc::new(), "x.md");
        assert!(report.contains("**Quality Score:** N/A"));
        assert!(!report.contains("## Diagnosis Summary"));
    }

    #[test]
    fn single_improvement_object_is_treated_as_one_suggestion() {
        let mut doc = StateDoc::new();
        doc.set(
            stages::IMPROVEMENTS,
            json!({"title": "Only one", "description": "d"}),
        );
        let report = render(&doc, "x.md");
        assert!(report.contains("### 1. Only one"));
    }

    #[test]
    fn legacy_improvements_key_is_accepted() {
        let mut doc = StateDoc::new();
        doc.set(
            stages::IMPROVEMENTS,
            json!({"improvements": [{"title": "Legacy", "description": "d"}]}),
        );
        let report = render(&doc, "x.md");
        assert!(report.contains("### 1. Legacy"));
    }
}
