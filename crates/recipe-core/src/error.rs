use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("input path does not exist: {0}")]
    InputNotFound(PathBuf),

    #[error("input is empty: {0}")]
    EmptyInput(PathBuf),

    #[error("need at least {minimum} file(s), found {found}")]
    TooFewFiles { minimum: usize, found: usize },

    #[error("path is neither file nor directory: {0}")]
    InvalidPath(PathBuf),

    #[error("cannot write output to {path}: {reason}")]
    InvalidOutput { path: PathBuf, reason: String },

    #[error("state file is corrupt: {path}, delete it to start fresh ({source})")]
    StateCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    #[error("could not extract JSON from response: {0}")]
    Extract(String),

    #[error("invalid gate response: {0}")]
    InvalidGateResponse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, RecipeError>;
