use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn recipe(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("recipe").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

// ---------------------------------------------------------------------------
// recipe analyze: input validation
// ---------------------------------------------------------------------------

#[test]
fn analyze_missing_input_fails_before_writing_state() {
    let dir = TempDir::new().unwrap();
    recipe(&dir)
        .args(["analyze", "missing.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    // Nothing checkpointed.
    assert!(!dir.path().join(".recipe_state.missing.json").exists());
}

#[test]
fn analyze_empty_input_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("empty.md"), "").unwrap();
    recipe(&dir)
        .args(["analyze", "empty.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
    assert!(!dir.path().join(".recipe_state.empty.json").exists());
}

#[test]
fn analyze_directory_without_tutorials_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    recipe(&dir)
        .args(["analyze", "docs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least"));
}

#[test]
fn analyze_batch_rejects_single_file_flags() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.md"), "# A").unwrap();
    std::fs::write(dir.path().join("b.md"), "# B").unwrap();
    recipe(&dir)
        .args(["analyze", ".", "--output", "out.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("single-file"));
}

#[test]
fn analyze_with_unreachable_executor_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("t.md"), "# Tutorial\ncontent").unwrap();
    recipe(&dir)
        .args([
            "analyze",
            "t.md",
            "--auto-approve",
            "--amp-bin",
            "/nonexistent/amp",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("analysis"));

    // The failed first stage checkpointed nothing.
    assert!(!dir.path().join(".recipe_state.t.json").exists());
}

// ---------------------------------------------------------------------------
// recipe state
// ---------------------------------------------------------------------------

#[test]
fn state_show_reports_absent_checkpoint() {
    let dir = TempDir::new().unwrap();
    recipe(&dir)
        .args(["state", "show", "t.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no checkpoint"));
}

#[test]
fn state_show_lists_completed_stages() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".recipe_state.t.json"),
        r#"{"analysis": {"structure": "linear"}, "iterations": 1}"#,
    )
    .unwrap();
    recipe(&dir)
        .args(["state", "show", "t.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("analysis"))
        .stdout(predicate::str::contains("iterations: 1"));
}

#[test]
fn state_show_json_emits_document() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".recipe_state.t.json"),
        r#"{"analysis": {"structure": "linear"}}"#,
    )
    .unwrap();
    recipe(&dir)
        .args(["--json", "state", "show", "t.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"structure\": \"linear\""));
}

#[test]
fn state_clear_removes_checkpoint_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".recipe_state.t.json"), "{}").unwrap();
    recipe(&dir)
        .args(["state", "clear", "t.md"])
        .assert()
        .success();
    assert!(!dir.path().join(".recipe_state.t.json").exists());

    recipe(&dir)
        .args(["state", "clear", "t.md"])
        .assert()
        .success();
}

#[test]
fn state_requires_input_or_state_file() {
    let dir = TempDir::new().unwrap();
    recipe(&dir)
        .args(["state", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--state-file"));
}

#[test]
fn state_show_corrupt_checkpoint_instructs_deletion() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".recipe_state.t.json"), "{not json").unwrap();
    recipe(&dir)
        .args(["state", "show", "t.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("delete it"));
}
