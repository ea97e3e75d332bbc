//! Bounded generate-evaluate-retry loop.
//!
//! The loop is the only place in the pipeline with a nontrivial termination
//! edge case: it must finish in at most `max_iterations` generate+evaluate
//! pairs regardless of the scores evaluation returns, including all-zero
//! scores. The cap is structurally enforced by the loop construct itself,
//! not by convention. On cap exhaustion the last artifact is returned with
//! `accepted = false`; callers must treat it as provisional, best effort,
//! not guaranteed quality.

use async_trait::async_trait;

use crate::error::Result;

/// Default acceptance threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.8;
/// Default iteration cap.
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Transient evaluation result: a score in 0.0..=1.0 and free-text issues.
/// Consumed by the threshold check and folded into regeneration feedback;
/// only the final artifact is retained by callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub score: f64,
    pub issues: Vec<String>,
}

impl Evaluation {
    /// Feedback text appended to the next generation prompt.
    pub fn feedback_text(&self) -> String {
        if self.issues.is_empty() {
            format!("quality score {:.2} was below the acceptance threshold", self.score)
        } else {
            self.issues.join("\n")
        }
    }
}

/// What `generate` produced: an artifact, or a request to halt the loop
/// cleanly (an operator rejecting at a gate inside generation).
#[derive(Debug)]
pub enum Generated<A> {
    Artifact(A),
    Halt(String),
}

/// One party's generate/evaluate pair, driven by [`QualityLoop`].
///
/// `generate` receives the feedback accumulated from all prior failed
/// iterations. `on_retry` fires after a failed evaluation and before the
/// next `generate`; drivers use it to checkpoint state and clear cached
/// results that must be regenerated.
#[async_trait]
pub trait QualityDriver: Send {
    type Artifact: Send + Sync;

    async fn generate(&mut self, feedback: Option<&str>) -> Result<Generated<Self::Artifact>>;

    async fn evaluate(&mut self, artifact: &Self::Artifact) -> Result<Evaluation>;

    fn on_retry(&mut self, evaluation: &Evaluation) -> Result<()> {
        let _ = evaluation;
        Ok(())
    }
}

/// Loop result: finished (accepted or cap-exhausted) or halted mid-generate.
#[derive(Debug)]
pub enum LoopResult<A> {
    Finished(QualityOutcome<A>),
    Halted(String),
}

#[derive(Debug)]
pub struct QualityOutcome<A> {
    pub artifact: A,
    pub evaluation: Evaluation,
    /// Total completed generate+evaluate pairs, including any counted in
    /// `start_iteration`.
    pub iterations: u32,
    /// Whether the final evaluation met the threshold.
    pub accepted: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct QualityLoop {
    pub threshold: f64,
    pub max_iterations: u32,
}

impl Default for QualityLoop {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl QualityLoop {
    /// Run the loop until acceptance or cap exhaustion.
    ///
    /// `start_iteration` carries the pair count from a resumed run so a
    /// restart cannot exceed the cap. `initial_feedback` likewise reseeds
    /// feedback accumulated before the restart.
    pub async fn run<D: QualityDriver>(
        &self,
        driver: &mut D,
        start_iteration: u32,
        initial_feedback: Option<String>,
    ) -> Result<LoopResult<D::Artifact>> {
        let mut iteration = start_iteration;
        let mut feedback = initial_feedback;

        loop {
            let artifact = match driver.generate(feedback.as_deref()).await? {
                Generated::Artifact(a) => a,
                Generated::Halt(reason) => return Ok(LoopResult::Halted(reason)),
            };
            let evaluation = driver.evaluate(&artifact).await?;
            iteration += 1;

            if evaluation.score >= self.threshold {
                return Ok(LoopResult::Finished(QualityOutcome {
                    artifact,
                    evaluation,
                    iterations: iteration,
                    accepted: true,
                }));
            }
            if iteration >= self.max_iterations {
                return Ok(LoopResult::Finished(QualityOutcome {
                    artifact,
                    evaluation,
                    iterations: iteration,
                    accepted: false,
                }));
            }

            let text = evaluation.feedback_text();
            feedback = Some(match feedback.take() {
                Some(prev) => format!("{prev}\n\n{text}"),
                None => text,
            });
            driver.on_retry(&evaluation)?;
        }
    }
}
