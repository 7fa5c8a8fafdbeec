use sylva::{ParseOptions, ParseStatus, Parser, parse_batch};

use crate::helpers::source_fixtures::*;

#[test]
fn test_batch_matches_sequential() {
    let sources: Vec<String> = (0..64)
        .map(|i| match i % 4 {
            0 => many_statements(i),
            1 => MISSING_SEMICOLON.to_string(),
            2 => STRAY_BYTE.to_string(),
            _ => KEYWORD_AS_NAME.to_string(),
        })
        .collect();
    let outcomes = parse_batch(&STATEMENTS, &sources, &ParseOptions::default());

    let mut parser = Parser::new(STATEMENTS.clone());
    for (source, outcome) in sources.iter().zip(&outcomes) {
        let sequential = parser.parse(source);
        assert_eq!(outcome.tree.to_sexp(), sequential.tree.to_sexp());
        assert_eq!(outcome.status, ParseStatus::Complete);
    }
}

#[test]
fn test_batch_with_external_scanner() {
    let sources = [NESTED_COMMENT, UNTERMINATED_COMMENT, "a b c", ""];
    let outcomes = parse_batch(&NESTED_COMMENTS, &sources, &ParseOptions::default());
    assert_eq!(outcomes.len(), 4);
    assert!(!outcomes[0].tree.has_error());
    assert!(outcomes[1].tree.has_error());
    assert!(!outcomes[2].tree.has_error());
    assert!(outcomes[3].tree.is_empty());
}

#[test]
fn test_empty_batch() {
    let sources: [&str; 0] = [];
    assert!(parse_batch(&SUM, &sources, &ParseOptions::default()).is_empty());
}
