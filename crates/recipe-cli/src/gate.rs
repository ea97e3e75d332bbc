//! Console implementation of the approval gate.

use async_trait::async_trait;
use recipe_core::error::{RecipeError, Result};
use recipe_core::gate::{parse_answer, Answer, ApprovalHandler, ApprovalRequest, GateDecision};
use std::io::{BufRead, Write};

/// Blocking stdin gate. Shows the proposed improvements, then reads
/// `[y]es / [n]o / [m]odify` from the terminal, re-prompting on anything
/// else. On `modify` it collects one line of notes.
pub struct ConsoleGate;

impl ConsoleGate {
    fn read_line(prompt: &str) -> Result<String> {
        let mut stderr = std::io::stderr();
        write!(stderr, "{prompt}")?;
        stderr.flush()?;

        let mut line = String::new();
        let n = std::io::stdin().lock().read_line(&mut line)?;
        if n == 0 {
            return Err(RecipeError::InvalidGateResponse(
                "end of input at approval gate".to_string(),
            ));
        }
        Ok(line.trim().to_string())
    }
}

#[async_trait]
impl ApprovalHandler for ConsoleGate {
    async fn request(&self, request: &ApprovalRequest) -> Result<GateDecision> {
        eprintln!("\nProposed improvements:");
        eprintln!("{}", serde_json::to_string_pretty(&request.improvements)?);

        loop {
            let answer = Self::read_line("Apply these improvements? [y]es / [n]o / [m]odify: ")?;
            match parse_answer(&answer) {
                Ok(Answer::Yes) => return Ok(GateDecision::Approve),
                Ok(Answer::No) => return Ok(GateDecision::Reject),
                Ok(Answer::Modify) => {
                    let notes = Self::read_line("Describe the modifications: ")?;
                    return Ok(GateDecision::Modify(notes));
                }
                Err(_) => {
                    eprintln!("Please answer y, n, or m.");
                }
            }
        }
    }
}
