use crate::error::{RecipeError, Result};
use crate::io::atomic_write;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// StateDoc
// ---------------------------------------------------------------------------

/// The checkpoint document: a flat mapping from stage name to that stage's
/// result value, plus bookkeeping fields.
///
/// Stage keys are added monotonically as stages complete and are only removed
/// by an explicit reset or by the quality loop when it schedules a
/// regeneration. Bookkeeping keys:
///
/// - `iterations` — quality-loop iteration counter
/// - `quality_feedback` — accumulated evaluation feedback text
/// - `focus_areas` — operator-supplied focus hints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDoc {
    map: Map<String, Value>,
}

pub const ITERATIONS_KEY: &str = "iterations";
pub const QUALITY_FEEDBACK_KEY: &str = "quality_feedback";
pub const FOCUS_AREAS_KEY: &str = "focus_areas";

impl StateDoc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, stage: &str) -> bool {
        self.map.contains_key(stage)
    }

    pub fn get(&self, stage: &str) -> Option<&Value> {
        self.map.get(stage)
    }

    pub fn get_mut(&mut self, stage: &str) -> Option<&mut Value> {
        self.map.get_mut(stage)
    }

    pub fn set(&mut self, stage: impl Into<String>, value: Value) {
        self.map.insert(stage.into(), value);
    }

    pub fn remove(&mut self, stage: &str) -> Option<Value> {
        self.map.remove(stage)
    }

    /// Remove several stage keys at once (quality-loop regeneration).
    pub fn clear_stages(&mut self, stages: &[&str]) {
        for stage in stages {
            self.map.remove(*stage);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.map.keys()
    }

    // -----------------------------------------------------------------------
    // Bookkeeping accessors
    // -----------------------------------------------------------------------

    pub fn iterations(&self) -> u32 {
        self.map
            .get(ITERATIONS_KEY)
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32
    }

    pub fn set_iterations(&mut self, n: u32) {
        self.map.insert(ITERATIONS_KEY.into(), Value::from(n));
    }

    pub fn quality_feedback(&self) -> Option<&str> {
        self.map.get(QUALITY_FEEDBACK_KEY).and_then(Value::as_str)
    }

    /// Append feedback text, separated from any existing feedback by a blank
    /// line. Feedback accumulates across quality-loop iterations.
    pub fn push_quality_feedback(&mut self, feedback: &str) {
        let merged = match self.quality_feedback() {
            Some(existing) => format!("{existing}\n\n{feedback}"),
            None => feedback.to_string(),
        };
        self.map
            .insert(QUALITY_FEEDBACK_KEY.into(), Value::String(merged));
    }

    pub fn focus_areas(&self) -> Vec<String> {
        self.map
            .get(FOCUS_AREAS_KEY)
            .and_then(Value::as_array)
            .map(|a| {
                a.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_focus_areas(&mut self, areas: &[String]) {
        if areas.is_empty() {
            return;
        }
        self.map.insert(
            FOCUS_AREAS_KEY.into(),
            Value::Array(areas.iter().map(|a| Value::String(a.clone())).collect()),
        );
    }
}

impl From<Map<String, Value>> for StateDoc {
    fn from(map: Map<String, Value>) -> Self {
        Self { map }
    }
}

impl From<&StateDoc> for Value {
    fn from(doc: &StateDoc) -> Self {
        Value::Object(doc.map.clone())
    }
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// File-backed store for a [`StateDoc`].
///
/// The path is an explicit handle passed by the caller — no fixed global
/// filename — so tests and concurrent tools can each point at their own
/// file. Single writer, single reader, no locking: running two processes
/// against the same state file is not supported.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the checkpoint document. An absent file yields an empty document;
    /// a malformed file is an error instructing the user to delete it — there
    /// is no automatic corruption recovery.
    pub fn load(&self) -> Result<StateDoc> {
        if !self.path.exists() {
            return Ok(StateDoc::new());
        }
        let data = std::fs::read_to_string(&self.path)?;
        let map: Map<String, Value> =
            serde_json::from_str(&data).map_err(|source| RecipeError::StateCorrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(StateDoc::from(map))
    }

    /// Persist the document, overwriting atomically. Called synchronously
    /// after every stage completion (checkpoint).
    pub fn save(&self, doc: &StateDoc) -> Result<()> {
        let value = Value::from(doc);
        let mut data = serde_json::to_string_pretty(&value)?;
        data.push('\n');
        atomic_write(&self.path, data.as_bytes())
    }

    /// Delete the backing file (fresh run). No-op if absent.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
