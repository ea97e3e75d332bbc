//! Pipeline orchestrator.
//!
//! Sequences the six stages in fixed order, checking the checkpoint document
//! before each to skip already-completed stages and saving it after each
//! completion. Re-running on a document that already holds the first *k*
//! stage keys performs zero external calls for those stages and resumes at
//! stage *k+1*.
//!
//! The tail (improvements, gate, critique, synthesis) runs under the
//! [`QualityLoop`]: when the synthesized quality score misses the threshold,
//! the tail stages are cleared from the document and regenerated with the
//! critique's feedback folded into the next improvement prompt, up to the
//! iteration cap.

use serde_json::Value;

use crate::error::{RecipeError, Result};
use crate::gate::{ApprovalHandler, ApprovalRequest, GateDecision};
use crate::quality::{Evaluation, Generated, LoopResult, QualityDriver, QualityLoop};
use crate::session::StageRunner;
use crate::stages::{self, analyzer, critic, diagnostician, improver, learner, synthesizer};
use crate::state::{StateDoc, StateStore};
use async_trait::async_trait;

/// Progress callback. The CLI prints these; tests capture them.
pub type ProgressFn<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Final pipeline result. Rejection at the human gate is an outcome, not an
/// error: the pipeline halts cleanly and reports it upward.
#[derive(Debug)]
pub enum PipelineOutcome {
    Complete {
        state: StateDoc,
        quality_score: f64,
        iterations: u32,
        /// False when the iteration cap was exhausted below the threshold;
        /// the result is then best effort and callers must treat it as
        /// provisional.
        accepted: bool,
    },
    Rejected {
        reason: String,
    },
}

pub struct Pipeline<'a> {
    runner: &'a dyn StageRunner,
    approval: &'a dyn ApprovalHandler,
    store: &'a StateStore,
    quality: QualityLoop,
    progress: Option<ProgressFn<'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        runner: &'a dyn StageRunner,
        approval: &'a dyn ApprovalHandler,
        store: &'a StateStore,
    ) -> Self {
        Self {
            runner,
            approval,
            store,
            quality: QualityLoop::default(),
            progress: None,
        }
    }

    pub fn with_quality(mut self, quality: QualityLoop) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    fn emit(&self, message: &str) {
        if let Some(f) = self.progress {
            f(message);
        }
    }

    /// Run the pipeline to completion, resuming from whatever the state
    /// store already holds.
    pub async fn run(&self, content: &str, focus_areas: &[String]) -> Result<PipelineOutcome> {
        let mut doc = self.store.load()?;

        if !focus_areas.is_empty() {
            doc.set_focus_areas(focus_areas);
            self.store.save(&doc)?;
        }

        if !doc.contains(stages::ANALYSIS) {
            self.emit("Stage 1/7: Analyzing tutorial structure...");
            let analysis = analyzer::analyze(self.runner, content)
                .await
                .map_err(|e| stage_error(stages::ANALYSIS, e))?;
            doc.set(stages::ANALYSIS, analysis);
            self.store.save(&doc)?;
            self.emit("✓ Analysis complete");
        }

        if !doc.contains(stages::LEARNER_EXPERIENCE) {
            self.emit("Stage 2/7: Simulating learner experience...");
            let analysis = cached(&doc, stages::ANALYSIS);
            let experience = learner::simulate_learner(self.runner, content, &analysis)
                .await
                .map_err(|e| stage_error(stages::LEARNER_EXPERIENCE, e))?;
            doc.set(stages::LEARNER_EXPERIENCE, experience);
            self.store.save(&doc)?;
            self.emit("✓ Simulation complete");
        }

        if !doc.contains(stages::DIAGNOSIS) {
            self.emit("Stage 3/7: Diagnosing pedagogical issues...");
            let experience = cached(&doc, stages::LEARNER_EXPERIENCE);
            let analysis = cached(&doc, stages::ANALYSIS);
            let diagnosis = diagnostician::diagnose_issues(self.runner, &experience, &analysis)
                .await
                .map_err(|e| stage_error(stages::DIAGNOSIS, e))?;
            doc.set(stages::DIAGNOSIS, diagnosis);
            self.store.save(&doc)?;
            self.emit("✓ Diagnosis complete");
        }

        let start_iteration = doc.iterations();
        let initial_feedback = doc.quality_feedback().map(str::to_owned);
        let diagnosis = cached(&doc, stages::DIAGNOSIS);

        let result = {
            let mut driver = TailDriver {
                runner: self.runner,
                approval: self.approval,
                store: self.store,
                progress: self.progress,
                max_iterations: self.quality.max_iterations,
                diagnosis,
                doc: &mut doc,
            };
            self.quality
                .run(&mut driver, start_iteration, initial_feedback)
                .await?
        };

        match result {
            LoopResult::Halted(reason) => Ok(PipelineOutcome::Rejected { reason }),
            LoopResult::Finished(outcome) => {
                self.emit(&format!("Quality Score: {}", outcome.evaluation.score));
                Ok(PipelineOutcome::Complete {
                    state: doc,
                    quality_score: outcome.evaluation.score,
                    iterations: outcome.iterations,
                    accepted: outcome.accepted,
                })
            }
        }
    }
}

/// The pipeline tail as a quality-loop driver: improvements and the human
/// gate form the generate half; critique and synthesis form the evaluate
/// half. Each sub-step is skip-if-cached, so a run interrupted mid-tail
/// resumes without redundant external calls.
struct TailDriver<'a> {
    runner: &'a dyn StageRunner,
    approval: &'a dyn ApprovalHandler,
    store: &'a StateStore,
    progress: Option<ProgressFn<'a>>,
    max_iterations: u32,
    diagnosis: Value,
    doc: &'a mut StateDoc,
}

impl TailDriver<'_> {
    fn emit(&self, message: &str) {
        if let Some(f) = self.progress {
            f(message);
        }
    }
}

#[async_trait]
impl QualityDriver for TailDriver<'_> {
    type Artifact = Value;

    async fn generate(&mut self, feedback: Option<&str>) -> Result<Generated<Value>> {
        if !self.doc.contains(stages::IMPROVEMENTS) {
            self.emit("Stage 4/7: Generating improvement suggestions...");
            let focus = self.doc.focus_areas();
            let improvements =
                improver::generate_improvements(self.runner, &self.diagnosis, &focus, feedback)
                    .await
                    .map_err(|e| stage_error(stages::IMPROVEMENTS, e))?;
            self.doc.set(stages::IMPROVEMENTS, improvements);
            self.store.save(self.doc)?;
            self.emit("✓ Improvements generated");
        }

        match self.doc.get(stages::HUMAN_APPROVAL) {
            Some(decision) if decision == "no" => {
                return Ok(Generated::Halt("user rejected improvements".into()));
            }
            Some(_) => {}
            None => {
                let request = ApprovalRequest {
                    improvements: cached(self.doc, stages::IMPROVEMENTS),
                    diagnosis: self.diagnosis.clone(),
                };
                match self.approval.request(&request).await? {
                    GateDecision::Approve => {
                        self.doc.set(stages::HUMAN_APPROVAL, Value::from("yes"));
                        self.store.save(self.doc)?;
                    }
                    GateDecision::Modify(notes) => {
                        if let Some(obj) = self
                            .doc
                            .get_mut(stages::IMPROVEMENTS)
                            .and_then(Value::as_object_mut)
                        {
                            obj.insert("modifications".into(), Value::String(notes));
                        }
                        self.doc.set(stages::HUMAN_APPROVAL, Value::from("yes"));
                        self.store.save(self.doc)?;
                    }
                    GateDecision::Reject => {
                        self.doc.set(stages::HUMAN_APPROVAL, Value::from("no"));
                        self.store.save(self.doc)?;
                        return Ok(Generated::Halt("user rejected improvements".into()));
                    }
                }
            }
        }

        Ok(Generated::Artifact(cached(self.doc, stages::IMPROVEMENTS)))
    }

    async fn evaluate(&mut self, artifact: &Value) -> Result<Evaluation> {
        if !self.doc.contains(stages::CRITIQUE) {
            self.emit("Stage 5/7: Evaluating improvement quality...");
            let critique = critic::evaluate_improvements(self.runner, artifact, &self.diagnosis)
                .await
                .map_err(|e| stage_error(stages::CRITIQUE, e))?;
            self.doc.set(stages::CRITIQUE, critique);
            self.store.save(self.doc)?;
            self.emit("✓ Evaluation complete");
        }

        if !self.doc.contains(stages::SYNTHESIS) {
            self.emit("Stage 6/7: Synthesizing final recommendations...");
            let critique = cached(self.doc, stages::CRITIQUE);
            let synthesis = synthesizer::synthesize_recommendations(
                self.runner,
                &critique,
                artifact,
                &self.diagnosis,
            )
            .await
            .map_err(|e| stage_error(stages::SYNTHESIS, e))?;
            self.doc.set(stages::SYNTHESIS, synthesis);
            self.store.save(self.doc)?;
            self.emit("✓ Synthesis complete");
        }

        let synthesis = cached(self.doc, stages::SYNTHESIS);
        let score = synthesis
            .get("quality_score")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let critique = cached(self.doc, stages::CRITIQUE);
        let issues = critic::weaknesses(&critique)
            .map(|w| vec![w.to_string()])
            .unwrap_or_default();
        Ok(Evaluation { score, issues })
    }

    fn on_retry(&mut self, evaluation: &Evaluation) -> Result<()> {
        let next = self.doc.iterations() + 1;
        self.emit(&format!(
            "Score below threshold. Iterating... (attempt {next}/{})",
            self.max_iterations
        ));
        self.doc.set_iterations(next);
        self.doc.push_quality_feedback(&evaluation.feedback_text());
        self.doc.clear_stages(stages::REGENERATED);
        self.store.save(self.doc)
    }
}

fn cached(doc: &StateDoc, stage: &str) -> Value {
    doc.get(stage).cloned().unwrap_or(Value::Null)
}

fn stage_error(stage: &str, err: RecipeError) -> RecipeError {
    match err {
        e @ RecipeError::Stage { .. } => e,
        e => RecipeError::Stage {
            stage: stage.to_string(),
            message: e.to_string(),
        },
    }
}
