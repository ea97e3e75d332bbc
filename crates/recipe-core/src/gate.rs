//! Human approval gate.
//!
//! The pipeline blocks at one strategic decision point before the expensive
//! evaluation tail. The operator can approve, reject, or approve with
//! modification text that is attached to the artifact's context. Rejection
//! is a clean pipeline outcome, never an error.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{RecipeError, Result};

/// What the gate presents to the operator.
#[derive(Debug, Clone)]
pub struct ApprovalRequest {
    pub improvements: Value,
    pub diagnosis: Value,
}

/// Operator decision at the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Approve,
    Reject,
    /// Approve, with operator-supplied modification notes to carry forward.
    Modify(String),
}

/// Parse a console answer into a decision kind. `Modify` still needs the
/// follow-up text, which the console gate collects separately.
pub fn parse_answer(answer: &str) -> Result<Answer> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok(Answer::Yes),
        "n" | "no" => Ok(Answer::No),
        "m" | "modify" => Ok(Answer::Modify),
        other => Err(RecipeError::InvalidGateResponse(other.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Modify,
}

/// The seam between the pipeline and whatever UI collects the decision.
/// The CLI implements this over stdin; tests use scripted handlers.
#[async_trait]
pub trait ApprovalHandler: Send + Sync {
    async fn request(&self, request: &ApprovalRequest) -> Result<GateDecision>;
}

/// Handler for unattended runs: approves everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

#[async_trait]
impl ApprovalHandler for AutoApprove {
    async fn request(&self, _request: &ApprovalRequest) -> Result<GateDecision> {
        Ok(GateDecision::Approve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_accepted_answers() {
        assert_eq!(parse_answer("y").unwrap(), Answer::Yes);
        assert_eq!(parse_answer(" YES ").unwrap(), Answer::Yes);
        assert_eq!(parse_answer("n").unwrap(), Answer::No);
        assert_eq!(parse_answer("no").unwrap(), Answer::No);
        assert_eq!(parse_answer("m").unwrap(), Answer::Modify);
        assert_eq!(parse_answer("Modify").unwrap(), Answer::Modify);
    }

    #[test]
    fn rejects_anything_else() {
        assert!(matches!(
            parse_answer("maybe"),
            Err(RecipeError::InvalidGateResponse(_))
        ));
        assert!(matches!(
            parse_answer(""),
            Err(RecipeError::InvalidGateResponse(_))
        ));
    }

    #[tokio::test]
    async fn auto_approve_always_approves() {
        let request = ApprovalRequest {
            improvements: json!({}),
            diagnosis: json!({}),
        };
        let decision = AutoApprove.request(&request).await.unwrap();
        assert_eq!(decision, GateDecision::Approve);
    }
}
