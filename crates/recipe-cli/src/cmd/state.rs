use crate::output::print_json;
use anyhow::Context;
use recipe_core::paths;
use recipe_core::state::StateStore;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(clap::Subcommand)]
pub enum StateSubcommand {
    /// Show the checkpoint for a tutorial
    Show {
        /// Tutorial file the checkpoint belongs to
        input: Option<PathBuf>,

        /// Explicit checkpoint path (overrides derivation from input)
        #[arg(long)]
        state_file: Option<PathBuf>,
    },

    /// Delete the checkpoint for a tutorial
    Clear {
        /// Tutorial file the checkpoint belongs to
        input: Option<PathBuf>,

        /// Explicit checkpoint path (overrides derivation from input)
        #[arg(long)]
        state_file: Option<PathBuf>,
    },
}

fn resolve(input: Option<PathBuf>, state_file: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    state_file
        .or_else(|| input.map(|i| paths::state_path_for(&i)))
        .context("provide a tutorial path or --state-file")
}

pub fn run(subcommand: StateSubcommand, json: bool) -> anyhow::Result<()> {
    match subcommand {
        StateSubcommand::Show { input, state_file } => {
            let store = StateStore::new(resolve(input, state_file)?);
            let doc = store.load()?;

            if json {
                print_json(&json!({
                    "path": store.path(),
                    "stages": Value::from(&doc),
                }))?;
                return Ok(());
            }

            if doc.is_empty() {
                println!("no checkpoint at {}", store.path().display());
                return Ok(());
            }
            println!("checkpoint: {}", store.path().display());
            println!("iterations: {}", doc.iterations());
            println!("completed keys:");
            for key in doc.keys() {
                println!("  {key}");
            }
            Ok(())
        }
        StateSubcommand::Clear { input, state_file } => {
            let store = StateStore::new(resolve(input, state_file)?);
            store.clear()?;
            if json {
                print_json(&json!({"cleared": store.path()}))?;
            } else {
                println!("cleared {}", store.path().display());
            }
            Ok(())
        }
    }
}
