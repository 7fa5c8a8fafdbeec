use rstest::rstest;
use sylva::{LanguageRegistry, ParseStatus, Parser, SyntaxNode};

use crate::helpers::source_fixtures::*;
use crate::helpers::tree_assertions::{assert_well_formed, parse, sexp};

fn count_kind(node: SyntaxNode<'_>, kind: &str) -> usize {
    node.tree().preorder().filter(|n| n.kind() == kind).count()
}

#[rstest]
#[case::single(SINGLE_STATEMENT, 1)]
#[case::three(THREE_STATEMENTS, 3)]
#[case::indented(INDENTED_PROGRAM, 3)]
#[case::keyword_as_name(KEYWORD_AS_NAME, 2)]
fn test_well_formed_programs(#[case] source: &str, #[case] statements: usize) {
    let outcome = parse(&STATEMENTS, source);
    assert!(!outcome.tree.has_error(), "unexpected errors: {:?}", outcome.tree.errors());
    assert_eq!(outcome.status, ParseStatus::Complete);
    assert_eq!(count_kind(outcome.tree.root(), "let_statement"), statements);
    assert_well_formed(&outcome.tree);
}

#[test]
fn test_statement_names() {
    let outcome = parse(&STATEMENTS, THREE_STATEMENTS);
    let names: Vec<_> = outcome
        .tree
        .preorder()
        .filter(|node| node.kind() == "let_statement")
        .filter_map(|node| node.child_by_field_name("name"))
        .filter_map(|name| name.text())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_many_statements() {
    let source = many_statements(500);
    let outcome = parse(&STATEMENTS, &source);
    assert!(!outcome.tree.has_error());
    assert_eq!(count_kind(outcome.tree.root(), "let_statement"), 500);
    assert_eq!(outcome.tree.root().end_point().row, 500);
}

#[test]
fn test_deep_left_recursion() {
    let source = long_sum(5_000);
    let outcome = parse(&SUM, &source);
    assert!(!outcome.tree.has_error());
    assert_eq!(count_kind(outcome.tree.root(), "number"), 5_000);
    // dropping a deep tree must not overflow the stack
    drop(outcome);
}

#[test]
fn test_long_sum_tokens() {
    let outcome = parse(&SUM, LONG_SUM);
    let numbers: Vec<_> = outcome
        .tree
        .preorder()
        .filter(|node| node.kind() == "number")
        .filter_map(|node| node.text())
        .collect();
    assert_eq!(numbers, vec!["1", "22", "333", "4444", "55555"]);
}

fn evaluate(node: SyntaxNode<'_>) -> i64 {
    match (node.child_by_field_name("left"), node.child_by_field_name("right")) {
        (Some(left), Some(right)) => {
            let operator = node.child_by_field_name("operator").and_then(|op| op.text());
            match operator {
                Some("+") => evaluate(left) + evaluate(right),
                Some("*") => evaluate(left) * evaluate(right),
                other => panic!("unexpected operator {:?}", other),
            }
        }
        _ => node
            .text()
            .and_then(|text| text.trim().parse().ok())
            .unwrap_or_else(|| panic!("not a number: {:?}", node)),
    }
}

#[rstest]
#[case("1+2*3", 7)]
#[case("2*3+4", 10)]
#[case(MIXED_OPERATORS, 127)]
#[case("1*2*3*4", 24)]
fn test_precedence_evaluates(#[case] source: &str, #[case] expected: i64) {
    let outcome = parse(&ARITHMETIC, source);
    assert!(!outcome.tree.has_error());
    assert_eq!(evaluate(outcome.tree.root()), expected);
}

#[test]
fn test_nested_comment() {
    let outcome = parse(&NESTED_COMMENTS, NESTED_COMMENT);
    assert!(!outcome.tree.has_error());
    let comments: Vec<_> = outcome
        .tree
        .preorder()
        .filter(|node| node.kind() == "comment")
        .collect();
    assert_eq!(comments.len(), 1);
    assert!(comments[0].is_extra());
    assert_eq!(comments[0].text(), Some("/* outer /* inner */ still outer */"));
}

#[test]
fn test_unterminated_comment() {
    let outcome = parse(&NESTED_COMMENTS, UNTERMINATED_COMMENT);
    assert!(outcome.tree.has_error());
    assert_well_formed(&outcome.tree);
}

#[test]
fn test_language_shared_across_threads() {
    let expected = sexp(&STATEMENTS, THREE_STATEMENTS);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let mut parser = Parser::new(STATEMENTS.clone());
                    parser.parse(THREE_STATEMENTS).tree.to_sexp()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_registry_lookup() {
    let registry = LanguageRegistry::new();
    registry.register(SUM.clone());
    registry.register(STATEMENTS.clone());

    let language = registry.get("statements").unwrap();
    assert!(language.ptr_eq(&STATEMENTS));
    let outcome = Parser::new(language).parse(SINGLE_STATEMENT);
    assert!(!outcome.tree.has_error());
    assert!(registry.get("python").is_none());
}
