use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File name constants
// ---------------------------------------------------------------------------

pub const RECIPE_DIR: &str = ".recipe";
pub const CONFIG_FILE: &str = ".recipe/config.yaml";

pub const STATE_PREFIX: &str = ".recipe_state";
pub const REPORT_SUFFIX: &str = "-analysis.md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Default checkpoint path for an input file: `.recipe_state.<stem>.json` in
/// the working directory. Deriving from the stem keeps concurrent analyses
/// of different tutorials from clobbering each other's checkpoints.
pub fn state_path_for(input: &Path) -> PathBuf {
    PathBuf::from(format!("{STATE_PREFIX}.{}.json", stem(input)))
}

/// Default report path: `<stem>-analysis.md` next to the input file.
pub fn report_path_for(input: &Path) -> PathBuf {
    let file = format!("{}{REPORT_SUFFIX}", stem(input));
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(file),
        _ => PathBuf::from(file),
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("tutorial")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_path_uses_stem() {
        assert_eq!(
            state_path_for(Path::new("docs/intro.md")),
            PathBuf::from(".recipe_state.intro.json")
        );
    }

    #[test]
    fn report_path_is_sibling_of_input() {
        assert_eq!(
            report_path_for(Path::new("docs/intro.md")),
            PathBuf::from("docs/intro-analysis.md")
        );
        assert_eq!(
            report_path_for(Path::new("intro.md")),
            PathBuf::from("intro-analysis.md")
        );
    }

    #[test]
    fn config_path_under_root() {
        assert_eq!(
            config_path(Path::new("/proj")),
            PathBuf::from("/proj/.recipe/config.yaml")
        );
    }
}
