//! File load and export through the engine.

use recview::{
    ActiveFields, EngineError, FilterSelection, PruneMode, RecordFilterEngine,
};
use std::fs;
use tempfile::TempDir;

const DATA: &str = concat!(
    "REC0110000001INSRTKONTO/4711        A01Mueller GmbH\n",
    "REC0210000002DELETKONTO/0815        B01\n",
    "\n",
    "REC0110000003INSRTDEPOT/0001        A01Weber KG   \n",
);

#[test]
fn test_export_then_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.data");
    let output = dir.path().join("out.data");
    fs::write(&input, DATA).unwrap();

    let mut engine = RecordFilterEngine::new();
    assert_eq!(engine.load_file(&input).unwrap(), 4);
    engine.export_to(&output).unwrap();

    let mut reloaded = RecordFilterEngine::new();
    reloaded.load_file(&output).unwrap();
    assert_eq!(reloaded.records(), engine.records());
    // Trailing blanks on the last record survive.
    assert!(reloaded.records()[3].as_str().ends_with("Weber KG   "));
    assert_eq!(reloaded.records()[2].as_str(), "");
}

#[test]
fn test_export_after_prune() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.data");
    let output = dir.path().join("out.data");
    fs::write(&input, DATA).unwrap();

    let mut engine = RecordFilterEngine::new();
    engine.load_file(&input).unwrap();
    let kind = engine.field_index("Type").unwrap();
    engine
        .filter_by_table(FilterSelection::new().with(kind, "A01"))
        .unwrap();
    let active: ActiveFields = [kind].into_iter().collect();
    assert_eq!(engine.filter_by_input(&active, PruneMode::AllFields).unwrap(), 2);
    engine.export_to(&output).unwrap();

    let mut reloaded = RecordFilterEngine::new();
    assert_eq!(reloaded.load_file(&output).unwrap(), 2);
    assert!(reloaded.records().iter().all(|r| r.as_str().contains("A01")));
}

#[test]
fn test_export_to_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("no-such-dir").join("out.data");

    let mut engine = RecordFilterEngine::new();
    engine.load_lines("abc\n");
    let err = engine.export_to(&output).unwrap_err();
    match err {
        EngineError::Io { path, .. } => assert_eq!(path, output),
        other => panic!("Expected Io error, got {other:?}"),
    }
    // Engine still usable
    assert_eq!(engine.records().len(), 1);
}

#[test]
fn test_load_empty_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("empty.data");
    fs::write(&input, "").unwrap();

    let mut engine = RecordFilterEngine::new();
    assert_eq!(engine.load_file(&input).unwrap(), 0);
    assert_eq!(engine.export_all(), "");
    assert!(engine.domains().iter().all(|d| d.is_empty()));
}

#[test]
fn test_schema_file_then_load() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.data");
    fs::write(&input, DATA).unwrap();

    let mut engine = RecordFilterEngine::new();
    engine
        .set_schema(r#"{"definition": [{"name": "Account", "start": 19, "end": 36}]}"#)
        .unwrap();
    engine.load_file(&input).unwrap();

    let accounts: Vec<&String> = engine.domain(0).unwrap().iter().collect();
    assert_eq!(accounts, vec!["DEPOT/0001", "KONTO/0815", "KONTO/4711"]);
}
