mod cmd;
mod gate;
mod output;
mod runner;

use clap::{Parser, Subcommand};
use cmd::state::StateSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "recipe",
    about = "Checkpointed multi-stage tutorial analysis driven by the amp session executor",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a tutorial file (or every .md file in a directory)
    Analyze {
        /// Tutorial markdown file or a directory of tutorials
        input: PathBuf,

        /// Focus areas for improvement generation (repeatable)
        #[arg(long = "focus")]
        focus_areas: Vec<String>,

        /// Report output path (single-file input only; default: <input>-analysis.md)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Checkpoint file path (single-file input only; default derived from input name)
        #[arg(long, env = "RECIPE_STATE_FILE")]
        state_file: Option<PathBuf>,

        /// Skip the human approval gate
        #[arg(long)]
        auto_approve: bool,

        /// Discard any existing checkpoint and start fresh
        #[arg(long)]
        reset: bool,

        /// Override the amp executor binary
        #[arg(long, env = "RECIPE_AMP_BIN")]
        amp_bin: Option<String>,

        /// Override the model for every stage
        #[arg(long)]
        model: Option<String>,
    },

    /// Inspect or clear analysis checkpoints
    State {
        #[command(subcommand)]
        subcommand: StateSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Analyze {
            input,
            focus_areas,
            output,
            state_file,
            auto_approve,
            reset,
            amp_bin,
            model,
        } => cmd::analyze::run(cmd::analyze::AnalyzeArgs {
            input,
            focus_areas,
            output,
            state_file,
            auto_approve,
            reset,
            amp_bin,
            model,
            json: cli.json,
        }),
        Commands::State { subcommand } => cmd::state::run(subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
