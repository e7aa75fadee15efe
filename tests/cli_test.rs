//! CLI integration tests
//!
//! End-to-end tests for the doc4md command-line interface.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

mod common;
use common::{minimal_command_page, TestCorpus};

/// Get a Command for the doc4md binary
fn doc4md() -> Command {
    Command::cargo_bin("doc4md").expect("Failed to find doc4md binary")
}

#[test]
fn test_help_output() {
    doc4md()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("4D reference-manual HTML corpus"));
}

#[test]
fn test_version_output() {
    doc4md()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("doc4md"));
}

#[test]
fn test_check_reports_command_page() {
    let corpus = TestCorpus::new();
    corpus.write_page("BEEP.301-100.en.html", &minimal_command_page());

    doc4md()
        .arg("check")
        .arg(corpus.root().join("BEEP.301-100.en.html"))
        .assert()
        .success()
        .stdout(predicate::str::contains("command page:"))
        .stdout(predicate::str::contains("language track:"));
}

#[test]
fn test_check_rejects_overview_page() {
    let corpus = TestCorpus::new();
    corpus.write_page("OVERVIEW.301-1.en.html", "<html><body>nothing</body></html>");

    doc4md()
        .arg("check")
        .arg(corpus.root().join("OVERVIEW.301-1.en.html"))
        .assert()
        .code(3);
}

#[test]
fn test_page_prints_markdown_to_stdout() {
    let corpus = TestCorpus::new();
    corpus.write_page("BEEP.301-100.en.html", &minimal_command_page());

    doc4md()
        .arg("page")
        .arg(corpus.root().join("BEEP.301-100.en.html"))
        .assert()
        .success()
        .stdout(predicate::str::contains("id: beep"))
        .stdout(predicate::str::contains("displayed_sidebar: docs"));
}

#[test]
fn test_convert_writes_output_tree() {
    let corpus = TestCorpus::new();
    corpus.write_page("BEEP.301-100.en.html", &minimal_command_page());
    let out = TempDir::new().unwrap();

    doc4md()
        .arg("convert")
        .arg(corpus.root())
        .arg("--output")
        .arg(out.path())
        .assert()
        .success();

    assert!(out.path().join("en/commands-legacy/beep.md").exists());
    assert!(out.path().join("command-index.md").exists());
    assert!(out.path().join("themes.json").exists());
}

#[test]
fn test_verbose_raises_log_level() {
    let corpus = TestCorpus::new();
    corpus.write_page("BEEP.301-100.en.html", &minimal_command_page());
    let out = TempDir::new().unwrap();

    // Per-page info events only reach stderr when --verbose raises the
    // default filter.
    doc4md()
        .env_remove("RUST_LOG")
        .arg("--verbose")
        .arg("convert")
        .arg(corpus.root())
        .arg("--output")
        .arg(out.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("converted"));

    let out = TempDir::new().unwrap();
    doc4md()
        .env_remove("RUST_LOG")
        .arg("convert")
        .arg(corpus.root())
        .arg("--output")
        .arg(out.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("converted").not());
}

#[test]
fn test_convert_dry_run_writes_nothing() {
    let corpus = TestCorpus::new();
    corpus.write_page("BEEP.301-100.en.html", &minimal_command_page());
    let out = TempDir::new().unwrap();

    doc4md()
        .arg("convert")
        .arg(corpus.root())
        .arg("--output")
        .arg(out.path().join("docs"))
        .arg("--dry-run")
        .assert()
        .success();

    assert!(!out.path().join("docs").join("command-index.md").exists());
}

#[test]
fn test_convert_refuses_output_over_source() {
    let corpus = TestCorpus::new();
    corpus.write_page("BEEP.301-100.en.html", &minimal_command_page());

    doc4md()
        .arg("convert")
        .arg(corpus.root())
        .arg("--output")
        .arg(corpus.root())
        .assert()
        .failure();
}

#[test]
fn test_convert_empty_folder_exits_no_pages() {
    let corpus = TestCorpus::new();
    let out = TempDir::new().unwrap();

    doc4md()
        .arg("convert")
        .arg(corpus.root())
        .arg("--output")
        .arg(out.path())
        .assert()
        .code(2)
        .stdout(predicate::str::contains("No command pages"));
}
