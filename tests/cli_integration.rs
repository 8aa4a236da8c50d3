//! Integration tests for the CLI: plan and apply against real files.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_openapi-patcher"))
}

/// Copy a fixture pair into a scratch directory.
fn setup_workspace() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();

    let document = dir.path().join("petstore.json");
    fs::copy("tests/fixtures/petstore.json.input", &document).unwrap();

    let fix = dir.path().join("fix.json");
    fs::copy("tests/fixtures/fix-add-servers.json", &fix).unwrap();

    (dir, document, fix)
}

#[test]
fn plan_prints_span_and_text() {
    let (_dir, document, fix) = setup_workspace();

    let output = binary()
        .args([
            "plan",
            document.to_str().unwrap(),
            "--fix",
            fix.to_str().unwrap(),
        ])
        .output()
        .expect("run plan");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("span:"), "stdout: {stdout}");
    assert!(stdout.contains("servers"), "stdout: {stdout}");
}

#[test]
fn apply_writes_the_expected_document() {
    let (_dir, document, fix) = setup_workspace();

    let output = binary()
        .args([
            "apply",
            document.to_str().unwrap(),
            "--fix",
            fix.to_str().unwrap(),
        ])
        .output()
        .expect("run apply");

    assert!(output.status.success(), "{output:?}");
    let expected = fs::read_to_string("tests/fixtures/petstore.json.expected").unwrap();
    let written = fs::read_to_string(&document).unwrap();
    assert_eq!(written, expected);
}

#[test]
fn dry_run_leaves_the_document_untouched() {
    let (_dir, document, fix) = setup_workspace();
    let before = fs::read_to_string(&document).unwrap();

    let output = binary()
        .args([
            "apply",
            document.to_str().unwrap(),
            "--fix",
            fix.to_str().unwrap(),
            "--dry-run",
            "--diff",
        ])
        .output()
        .expect("run apply --dry-run");

    assert!(output.status.success(), "{output:?}");
    let after = fs::read_to_string(&document).unwrap();
    assert_eq!(before, after);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains('+'), "stdout: {stdout}");
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let document = dir.path().join("petstore.txt");
    fs::write(&document, "{}").unwrap();
    let fix = dir.path().join("fix.json");
    fs::copy("tests/fixtures/fix-add-servers.json", &fix).unwrap();

    let output = binary()
        .args([
            "plan",
            document.to_str().unwrap(),
            "--fix",
            fix.to_str().unwrap(),
        ])
        .output()
        .expect("run plan");

    assert!(!output.status.success());
}
