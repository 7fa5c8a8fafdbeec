use std::io::Write;
use sylva::grammar::{GrammarTable, LoadError};
use sylva::{Language, Parser};
use tempfile::NamedTempFile;

use crate::helpers::source_fixtures::*;
use crate::helpers::tree_assertions::sexp;

#[test]
fn test_load_table_from_file() {
    let json = STATEMENTS.table().to_json().unwrap();
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let table = GrammarTable::from_json_file(file.path()).unwrap();
    let language = Language::new(table);
    let outcome = Parser::new(language).parse(STRAY_BYTE);
    assert_eq!(outcome.tree.to_sexp(), sexp(&STATEMENTS, STRAY_BYTE));
}

#[test]
fn test_load_rejects_malformed_json() {
    assert!(matches!(GrammarTable::from_json("{"), Err(LoadError::Json(_))));
}

#[test]
fn test_load_rejects_invalid_table() {
    let mut data = SUM.table().data().clone();
    data.states.clear();
    let json = serde_json::to_string(&data).unwrap();
    assert!(matches!(GrammarTable::from_json(&json), Err(LoadError::Table(_))));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = GrammarTable::from_json_file(dir.path().join("missing.json"));
    assert!(matches!(result, Err(LoadError::Io(_))));
}
