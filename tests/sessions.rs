//! Replays the session scripts in `specs/` and compares against the
//! `.expected` output next to each script.

use recview::{RecordFilterEngine, parse_script, run_script};
use std::fs;
use std::path::{Path, PathBuf};

fn spec_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("specs")
}

fn run_session(script_name: &str, schema: Option<&str>) -> Vec<String> {
    let dir = spec_dir();
    let mut engine = RecordFilterEngine::new();
    if let Some(schema_name) = schema {
        let json = fs::read_to_string(dir.join(schema_name)).unwrap();
        engine.set_schema(&json).unwrap();
    }
    engine.load_file(dir.join("records.data")).unwrap();

    let script = fs::read_to_string(dir.join(script_name)).unwrap();
    let commands = parse_script(&script).unwrap();
    run_script(&mut engine, &commands).unwrap().lines
}

fn assert_session(script_name: &str, schema: Option<&str>) {
    let expected_name = script_name.replace(".rview", ".expected");
    let expected = fs::read_to_string(spec_dir().join(&expected_name)).unwrap();
    let expected: Vec<&str> = expected.lines().collect();

    let actual = run_session(script_name, schema);
    assert_eq!(actual, expected, "output differs for {script_name}");
}

macro_rules! session_test {
    ($name:ident, $file:expr) => {
        #[test]
        fn $name() {
            assert_session($file, None);
        }
    };
    ($name:ident, $file:expr, $schema:expr) => {
        #[test]
        fn $name() {
            assert_session($file, Some($schema));
        }
    };
}

session_test!(session_insert_accounts, "insert-accounts.rview");
session_test!(session_type_domain, "type-domain.rview");
session_test!(session_prune_any, "prune-any.rview");
session_test!(session_prune_all, "prune-all.rview");
session_test!(session_accounts, "accounts.rview", "layout-accounts.json");

#[test]
fn test_every_script_has_expected_output() {
    for entry in fs::read_dir(spec_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().is_some_and(|e| e == "rview") {
            assert!(
                path.with_extension("expected").exists(),
                "missing expected output for {}",
                path.display()
            );
        }
    }
}

#[test]
fn test_scripts_do_not_touch_input_file() {
    let dir = spec_dir();
    let before = fs::read_to_string(dir.join("records.data")).unwrap();
    run_session("prune-any.rview", None);
    let after = fs::read_to_string(dir.join("records.data")).unwrap();
    assert_eq!(before, after);
}
