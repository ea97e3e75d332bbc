use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// RecipeConfig
// ---------------------------------------------------------------------------

/// Optional operator configuration, loaded from `.recipe/config.yaml` under
/// the working directory. Every field has a default; an absent file means
/// defaults across the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeConfig {
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Override for the session executor binary. `None` means `amp` from
    /// `PATH`.
    #[serde(default)]
    pub amp_bin: Option<String>,
}

fn default_quality_threshold() -> f64 {
    0.8
}

fn default_max_iterations() -> u32 {
    3
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            quality_threshold: default_quality_threshold(),
            max_iterations: default_max_iterations(),
            amp_bin: None,
        }
    }
}

impl RecipeConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: RecipeConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn absent_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = RecipeConfig::load(dir.path()).unwrap();
        assert_eq!(cfg.quality_threshold, 0.8);
        assert_eq!(cfg.max_iterations, 3);
        assert!(cfg.amp_bin.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(paths::RECIPE_DIR)).unwrap();
        std::fs::write(
            dir.path().join(paths::CONFIG_FILE),
            "quality_threshold: 0.9\n",
        )
        .unwrap();
        let cfg = RecipeConfig::load(dir.path()).unwrap();
        assert_eq!(cfg.quality_threshold, 0.9);
        assert_eq!(cfg.max_iterations, 3);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(paths::RECIPE_DIR)).unwrap();
        std::fs::write(dir.path().join(paths::CONFIG_FILE), "max_iterations: [").unwrap();
        assert!(RecipeConfig::load(dir.path()).is_err());
    }
}
