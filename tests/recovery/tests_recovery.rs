use rstest::rstest;
use sylva::tree::{ErrorCode, Severity};
use sylva::{ParseOptions, ParseStatus, TextRange, TextSize, parse_batch};
use tokio_util::sync::CancellationToken;

use crate::helpers::source_fixtures::*;
use crate::helpers::tree_assertions::{assert_well_formed, parse};

#[rstest]
#[case::missing_semicolon(MISSING_SEMICOLON, ErrorCode::E0201)]
#[case::stray_byte(STRAY_BYTE, ErrorCode::E0101)]
#[case::missing_name(MISSING_NAME, ErrorCode::E0201)]
#[case::only_garbage(ONLY_GARBAGE, ErrorCode::E0202)]
fn test_first_error_code(#[case] source: &str, #[case] code: ErrorCode) {
    let outcome = parse(&STATEMENTS, source);
    assert_eq!(outcome.status, ParseStatus::Complete);
    assert!(outcome.tree.has_error());
    assert_well_formed(&outcome.tree);

    let errors = outcome.tree.errors();
    assert_eq!(errors[0].code, code, "errors: {:?}", errors);
    assert!(errors.iter().all(|error| error.severity == Severity::Error));
}

#[test]
fn test_missing_name_is_synthesized() {
    let outcome = parse(&STATEMENTS, MISSING_NAME);
    let errors = outcome.tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "missing identifier");
    assert!(errors[0].range.is_empty());
    assert!((3..=4).contains(&u32::from(errors[0].range.start())));
    // named tokens carry no insertion hint
    assert_eq!(errors[0].hint, None);

    // the statement after the error parses normally
    let statement = outcome
        .tree
        .preorder()
        .filter(|node| node.kind() == "let_statement")
        .last()
        .unwrap();
    assert!(!statement.has_error());
    assert_eq!(statement.child_by_field_name("name").and_then(|name| name.text()), Some("y"));
}

#[test]
fn test_stray_byte_is_isolated() {
    let outcome = parse(&STATEMENTS, STRAY_BYTE);
    let errors = outcome.tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].range, TextRange::new(6.into(), 7.into()));
    assert_eq!(errors[0].message, "unrecognized input `?`");
    let statements = outcome
        .tree
        .preorder()
        .filter(|node| node.kind() == "let_statement")
        .count();
    assert_eq!(statements, 2);
}

#[test]
fn test_garbage_becomes_one_region() {
    let outcome = parse(&STATEMENTS, ONLY_GARBAGE);
    let errors = outcome.tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].range, TextRange::up_to(TextSize::from(ONLY_GARBAGE.len() as u32)));
}

#[rstest]
#[case("let")]
#[case("let x")]
#[case(";")]
#[case("let ;;;; let")]
#[case("\u{0}\u{1}\u{2}")]
#[case("let x; \u{7f} let y; ?")]
fn test_tree_covers_malformed_input(#[case] source: &str) {
    let outcome = parse(&STATEMENTS, source);
    assert!(outcome.tree.has_error());
    assert_well_formed(&outcome.tree);
    assert_eq!(outcome.tree.root().bytes(), source.as_bytes());
}

#[rstest]
#[case("1+")]
#[case("+")]
#[case("1 2 3")]
#[case("1++2")]
#[case("1+2+")]
fn test_sum_recovers(#[case] source: &str) {
    let outcome = parse(&SUM, source);
    assert!(outcome.tree.has_error());
    assert_well_formed(&outcome.tree);
    assert!(outcome.stats.recoveries >= 1);
}

#[test]
fn test_errors_in_source_order() {
    let source = "let a ? ; let ; let c";
    let outcome = parse(&STATEMENTS, source);
    let starts: Vec<u32> = outcome
        .tree
        .errors()
        .iter()
        .map(|error| u32::from(error.range.start()))
        .collect();
    assert!(starts.len() >= 2, "errors at {:?}", starts);
    assert!(starts.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn test_cancelled_batch() {
    let token = CancellationToken::new();
    token.cancel();
    let options = ParseOptions::default().with_cancellation(token);
    let sources = [THREE_STATEMENTS, MISSING_SEMICOLON];
    for (source, outcome) in sources.iter().zip(parse_batch(&STATEMENTS, &sources, &options)) {
        assert_eq!(outcome.status, ParseStatus::Cancelled);
        assert!(outcome.is_partial());
        assert_eq!(outcome.tree.len(), TextSize::from(source.len() as u32));
        assert_eq!(outcome.diagnostics().last().map(|error| error.code), Some(ErrorCode::E0302));
    }
}
