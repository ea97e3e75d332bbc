use crate::error::{RecipeError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting state files.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Discover files under `path` with the given extension (no leading dot).
///
/// A file path is returned as-is (single-item vec, extension ignored). A
/// directory is walked recursively and matching files are returned sorted,
/// truncated to `max_items` when given. Anything else is an error.
pub fn discover_files(
    path: &Path,
    extension: &str,
    max_items: Option<usize>,
) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(RecipeError::InvalidPath(path.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(extension))
        .collect();
    files.sort();

    if let Some(max) = max_items {
        files.truncate(max);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.json");
        atomic_write(&path, b"{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c/test.json");
        atomic_write(&path, b"data").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn atomic_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.json");
        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn discover_single_file_passthrough() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("tutorial.md");
        std::fs::write(&file, "content").unwrap();

        let found = discover_files(&file, "md", None).unwrap();
        assert_eq!(found, vec![file]);
    }

    #[test]
    fn discover_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.md"), "b").unwrap();
        std::fs::write(dir.path().join("a.md"), "a").unwrap();
        std::fs::write(dir.path().join("nested/c.md"), "c").unwrap();
        std::fs::write(dir.path().join("skip.txt"), "x").unwrap();

        let found = discover_files(dir.path(), "md", None).unwrap();
        assert_eq!(found.len(), 3);
        let mut sorted = found.clone();
        sorted.sort();
        assert_eq!(found, sorted);
    }

    #[test]
    fn discover_respects_max_items() {
        let dir = TempDir::new().unwrap();
        for name in ["a.md", "b.md", "c.md"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        let found = discover_files(dir.path(), "md", Some(2)).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn discover_nonexistent_path_is_error() {
        let err = discover_files(Path::new("/nonexistent/nowhere"), "md", None);
        assert!(matches!(err, Err(RecipeError::InvalidPath(_))));
    }
}
