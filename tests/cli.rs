//! End-to-end runs of the `rec-view` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn spec(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("specs").join(name)
}

fn rec_view() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rec-view"))
}

#[test]
fn test_schema_prints_default_layout() {
    let out = rec_view().arg("schema").output().unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    let schema = recview::Schema::parse(&text).unwrap();
    assert_eq!(schema, recview::Schema::default_layout());
}

#[test]
fn test_filter_to_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("nested").join("view.data");

    let status = rec_view()
        .arg("filter")
        .arg(spec("records.data"))
        .args(["--select", "Prefix=REC02", "-o"])
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(text.lines().all(|l| l.starts_with("REC02")));
}

#[test]
fn test_filter_with_prune() {
    let out = rec_view()
        .arg("filter")
        .arg(spec("records.data"))
        .args(["--select", "ID=10000002", "--prune", "Operation", "--prune", "Type"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn test_domains_single_field() {
    let out = rec_view()
        .arg("domains")
        .arg(spec("records.data"))
        .args(["--field", "Prefix"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert_eq!(text.lines().collect::<Vec<_>>(), vec!["REC01", "REC02", "REC03"]);
}

#[test]
fn test_run_script_with_schema() {
    let out = rec_view()
        .arg("run")
        .arg(spec("accounts.rview"))
        .arg(spec("records.data"))
        .arg("--schema")
        .arg(spec("layout-accounts.json"))
        .output()
        .unwrap();
    assert!(out.status.success());
    let expected = fs::read_to_string(spec("accounts.expected")).unwrap();
    let text = String::from_utf8(out.stdout).unwrap();
    assert_eq!(
        text.lines().collect::<Vec<_>>(),
        expected.lines().collect::<Vec<_>>()
    );
}

#[test]
fn test_unknown_field_fails() {
    let out = rec_view()
        .arg("filter")
        .arg(spec("records.data"))
        .args(["--select", "Nope=1"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let err = String::from_utf8(out.stderr).unwrap();
    assert!(err.contains("No field named 'Nope'"));
}

#[test]
fn test_bad_schema_fails() {
    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("bad.json");
    fs::write(&schema, r#"{"filters": ["A"]}"#).unwrap();

    let out = rec_view()
        .arg("domains")
        .arg(spec("records.data"))
        .arg("--schema")
        .arg(&schema)
        .output()
        .unwrap();
    assert!(!out.status.success());
    let err = String::from_utf8(out.stderr).unwrap();
    assert!(err.contains("definition"));
}
