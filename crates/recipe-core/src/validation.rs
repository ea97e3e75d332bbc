use crate::error::{RecipeError, Result};
use std::path::Path;

/// Validate that the primary input exists and is non-empty.
///
/// Runs before any state-store access or external call — a bad input must
/// fail fast with nothing written to disk.
pub fn validate_input_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(RecipeError::InputNotFound(path.to_path_buf()));
    }
    if path.is_file() {
        let len = std::fs::metadata(path)?.len();
        if len == 0 {
            return Err(RecipeError::EmptyInput(path.to_path_buf()));
        }
    }
    Ok(())
}

/// Validate that at least `minimum` files were discovered.
pub fn validate_minimum_files(files: &[std::path::PathBuf], minimum: usize) -> Result<()> {
    if files.len() < minimum {
        return Err(RecipeError::TooFewFiles {
            minimum,
            found: files.len(),
        });
    }
    Ok(())
}

/// Validate that `path` is usable as an output destination: its parent must
/// exist or be creatable, and the path must not be an existing directory.
pub fn validate_output_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(RecipeError::InvalidOutput {
            path: path.to_path_buf(),
            reason: "path is a directory".into(),
        });
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| RecipeError::InvalidOutput {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn input_must_exist() {
        let err = validate_input_path(Path::new("/nonexistent/input.md"));
        assert!(matches!(err, Err(RecipeError::InputNotFound(_))));
    }

    #[test]
    fn input_must_be_nonempty() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("empty.md");
        std::fs::write(&file, "").unwrap();
        assert!(matches!(
            validate_input_path(&file),
            Err(RecipeError::EmptyInput(_))
        ));
    }

    #[test]
    fn valid_input_passes() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("tutorial.md");
        std::fs::write(&file, "# Title").unwrap();
        validate_input_path(&file).unwrap();
    }

    #[test]
    fn directory_input_passes() {
        let dir = TempDir::new().unwrap();
        validate_input_path(dir.path()).unwrap();
    }

    #[test]
    fn minimum_files_enforced() {
        let files = vec![PathBuf::from("a.md")];
        assert!(validate_minimum_files(&files, 1).is_ok());
        let err = validate_minimum_files(&files, 3);
        match err {
            Err(RecipeError::TooFewFiles { minimum, found }) => {
                assert_eq!(minimum, 3);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn output_rejects_directory() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            validate_output_path(dir.path()),
            Err(RecipeError::InvalidOutput { .. })
        ));
    }

    #[test]
    fn output_creates_missing_parent() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("reports/analysis.md");
        validate_output_path(&out).unwrap();
        assert!(out.parent().unwrap().exists());
    }
}
