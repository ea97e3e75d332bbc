use crate::gate::ConsoleGate;
use crate::output::print_json;
use crate::runner::AmpRunner;
use anyhow::{bail, Context};
use recipe_core::config::RecipeConfig;
use recipe_core::gate::{ApprovalHandler, AutoApprove};
use recipe_core::io::discover_files;
use recipe_core::paths;
use recipe_core::pipeline::{Pipeline, PipelineOutcome};
use recipe_core::progress::{log_stage, ProgressReporter};
use recipe_core::quality::QualityLoop;
use recipe_core::report;
use recipe_core::state::StateStore;
use recipe_core::validation::{validate_input_path, validate_minimum_files, validate_output_path};
use serde_json::json;
use std::path::{Path, PathBuf};

pub struct AnalyzeArgs {
    pub input: PathBuf,
    pub focus_areas: Vec<String>,
    pub output: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub auto_approve: bool,
    pub reset: bool,
    pub amp_bin: Option<String>,
    pub model: Option<String>,
    pub json: bool,
}

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    // Validation happens before any state file is touched.
    validate_input_path(&args.input)?;
    let files = discover_files(&args.input, "md", None)?;
    validate_minimum_files(&files, 1)?;

    let batch = files.len() > 1;
    if batch && (args.state_file.is_some() || args.output.is_some()) {
        bail!("--state-file and --output apply to single-file input only");
    }

    let config = RecipeConfig::load(Path::new(".")).context("failed to load .recipe config")?;
    let runner = AmpRunner::new(
        args.amp_bin.clone().or_else(|| config.amp_bin.clone()),
        args.model.clone(),
    );
    let quality = QualityLoop {
        threshold: config.quality_threshold,
        max_iterations: config.max_iterations,
    };

    let console = ConsoleGate;
    let auto = AutoApprove;
    let approval: &dyn ApprovalHandler = if args.auto_approve { &auto } else { &console };

    let progress = |message: &str| tracing::info!("{message}");
    let rt = tokio::runtime::Runtime::new()?;

    let mut reporter = ProgressReporter::new(files.len(), "Analyzing tutorials").with_log_interval(1);
    let mut results = Vec::new();
    let mut successes = 0usize;
    let mut failures = 0usize;
    let mut rejections = 0usize;

    for file in &files {
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("tutorial");
        log_stage(&format!("Analyzing {}", file.display()));

        let store = StateStore::new(
            args.state_file
                .clone()
                .unwrap_or_else(|| paths::state_path_for(file)),
        );
        if args.reset {
            store.clear()?;
        }

        let content = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let pipeline = Pipeline::new(&runner, approval, &store)
            .with_quality(quality)
            .with_progress(&progress);
        let outcome = rt.block_on(pipeline.run(&content, &args.focus_areas));

        match outcome {
            Ok(PipelineOutcome::Complete {
                state,
                quality_score,
                iterations,
                accepted,
            }) => {
                let report_path = args
                    .output
                    .clone()
                    .unwrap_or_else(|| paths::report_path_for(file));
                validate_output_path(&report_path)?;
                let markdown = report::render(&state, name);
                recipe_core::io::atomic_write(&report_path, markdown.as_bytes())?;

                if !accepted {
                    tracing::warn!(
                        "quality threshold not met after {iterations} iteration(s); report is best effort"
                    );
                }
                tracing::info!("report written to {}", report_path.display());
                successes += 1;
                results.push(json!({
                    "status": "complete",
                    "input": file,
                    "report": report_path,
                    "quality_score": quality_score,
                    "iterations": iterations,
                    "accepted": accepted,
                }));
            }
            Ok(PipelineOutcome::Rejected { reason }) => {
                tracing::warn!("analysis halted: {reason}");
                rejections += 1;
                results.push(json!({
                    "status": "rejected",
                    "input": file,
                    "reason": reason,
                }));
            }
            // Batch runs isolate per-file failures and keep going; a
            // single-file run fails fast.
            Err(e) if batch => {
                tracing::error!("{}: {e}", file.display());
                failures += 1;
                results.push(json!({
                    "status": "error",
                    "input": file,
                    "error": e.to_string(),
                }));
            }
            Err(e) => {
                return Err(e).with_context(|| format!("analysis of {} failed", file.display()))
            }
        }

        reporter.update(Some(name));
    }

    if batch {
        reporter.complete();
        reporter.log_summary(successes, failures);
    }

    if args.json {
        if batch {
            print_json(&results)?;
        } else {
            print_json(&results[0])?;
        }
    }

    if failures > 0 {
        bail!("{failures} of {} tutorial(s) failed", files.len());
    }
    if rejections > 0 {
        bail!("analysis rejected at the approval gate");
    }
    Ok(())
}
