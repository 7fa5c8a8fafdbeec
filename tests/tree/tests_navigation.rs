use rowan::Language as _;
use sylva::tree::TableLanguage;
use sylva::{Edit, Point, SyntaxNode, SyntaxTree, TextRange, TextSize};

use crate::helpers::source_fixtures::*;
use crate::helpers::tree_assertions::parse;

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

/// Depth-first walk with a cursor, recording each node once
fn walk_all(tree: &SyntaxTree) -> Vec<SyntaxNode<'_>> {
    let mut cursor = tree.walk();
    let mut visited = Vec::new();
    'walk: loop {
        visited.push(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
    visited
}

#[test]
fn test_cursor_walk_matches_preorder() {
    let outcome = parse(&STATEMENTS, STRAY_BYTE);
    let walked = walk_all(&outcome.tree);
    let preorder: Vec<_> = outcome.tree.preorder().collect();
    assert_eq!(walked, preorder);
}

#[test]
fn test_cursor_backwards() {
    let outcome = parse(&STATEMENTS, THREE_STATEMENTS);
    let mut cursor = outcome.tree.walk();
    // the trailing newline belongs to the root
    assert!(cursor.goto_last_child());
    assert_eq!(cursor.node().kind(), "whitespace");
    assert_eq!(cursor.depth(), 1);

    let mut kinds = vec![cursor.node().kind()];
    while cursor.goto_prev_sibling() {
        kinds.push(cursor.node().kind());
    }
    assert_eq!(kinds, vec!["whitespace", "let_statement", "whitespace", "program"]);
    assert!(cursor.goto_parent());
    assert!(!cursor.goto_parent());
}

#[test]
fn test_cursor_fields() {
    let outcome = parse(&STATEMENTS, SINGLE_STATEMENT);
    let statement = outcome
        .tree
        .preorder()
        .find(|node| node.kind() == "let_statement")
        .unwrap();
    let mut cursor = statement.walk();
    assert!(cursor.goto_first_child());
    let mut fields = vec![(cursor.node().kind(), cursor.field_name())];
    while cursor.goto_next_sibling() {
        fields.push((cursor.node().kind(), cursor.field_name()));
    }
    assert_eq!(
        fields,
        vec![
            ("let", None),
            ("whitespace", None),
            ("identifier", Some("name")),
            (";", None),
        ]
    );
}

#[test]
fn test_cursor_offset_descent() {
    let outcome = parse(&STATEMENTS, THREE_STATEMENTS);
    let mut cursor = outcome.tree.walk();
    while cursor.goto_first_child_for_offset(TextSize::from(18)).is_some() {}
    assert_eq!(cursor.node().kind(), "identifier");
    assert_eq!(cursor.node().text(), Some("c"));
}

#[test]
fn test_node_at_and_parents() {
    let outcome = parse(&STATEMENTS, THREE_STATEMENTS);
    let node = outcome.tree.node_at(TextSize::from(11));
    assert_eq!(node.kind(), "identifier");
    assert_eq!(node.text(), Some("b"));
    assert_eq!(node.start_point(), Point::new(1, 4));

    let mut ancestors = Vec::new();
    let mut current = node.parent();
    while let Some(parent) = current {
        ancestors.push(parent.kind());
        current = parent.parent();
    }
    assert_eq!(ancestors, vec!["let_statement", "program", "program"]);
}

#[test]
fn test_siblings() {
    let outcome = parse(&STATEMENTS, SINGLE_STATEMENT);
    let name = outcome.tree.node_at(TextSize::from(4));
    assert_eq!(name.prev_sibling().map(|node| node.kind()), Some("whitespace"));
    assert_eq!(name.next_sibling().map(|node| node.kind()), Some(";"));
    assert!(outcome.tree.root().next_sibling().is_none());
}

#[test]
fn test_changed_ranges_after_rename() {
    let old = parse(&STATEMENTS, THREE_STATEMENTS);
    let (edit, source) = Edit::replace(old.tree.source(), range(18, 19), b"cat");
    let new = parse(&STATEMENTS, std::str::from_utf8(&source).unwrap());
    assert_eq!(old.tree.changed_ranges(&new.tree, &edit), vec![range(18, 21)]);
}

#[test]
fn test_rowan_export_is_lossless() {
    let outcome = parse(&STATEMENTS, STRAY_BYTE);
    let root = outcome.tree.to_rowan().unwrap();
    assert_eq!(root.text().to_string(), STRAY_BYTE);
    assert_eq!(root.kind(), STATEMENTS.table().start_symbol());

    let statement = STATEMENTS.table().symbol_for_name("let_statement", true).unwrap();
    let statements = root
        .descendants()
        .filter(|node| node.kind() == statement)
        .count();
    assert_eq!(statements, 2);
    assert_eq!(
        TableLanguage::kind_from_raw(TableLanguage::kind_to_raw(statement)),
        statement
    );
}
