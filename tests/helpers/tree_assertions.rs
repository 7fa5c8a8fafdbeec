//! Assertion helpers for parse results.

use sylva::{Edit, Language, ParseOutcome, Parser, SyntaxTree, TextRange, TextSize};

/// Parse `source` with a fresh parser.
pub fn parse(language: &Language, source: &str) -> ParseOutcome {
    Parser::new(language.clone()).parse(source)
}

pub fn sexp(language: &Language, source: &str) -> String {
    parse(language, source).tree.to_sexp()
}

/// Assert the tree spans the whole source and every node lies inside its
/// parent, with children tiling the parent exactly.
pub fn assert_well_formed(tree: &SyntaxTree) {
    assert_eq!(tree.root().range(), TextRange::up_to(TextSize::from(tree.source().len() as u32)));
    for node in tree.preorder() {
        let mut offset = node.start();
        for child in node.children() {
            assert_eq!(
                child.start(),
                offset,
                "child {:?} of {:?} does not start where its previous sibling ended",
                child,
                node
            );
            offset = child.end();
        }
        if node.child_count() > 0 {
            assert_eq!(offset, node.end(), "children of {:?} do not reach its end", node);
        }
    }
}

/// Apply `replacement` over `range` of `old_source`, reparse incrementally,
/// and assert the result matches a fresh parse. Returns the new outcome.
pub fn assert_reparse_matches_fresh(
    language: &Language,
    old: &ParseOutcome,
    range: TextRange,
    replacement: &str,
) -> ParseOutcome {
    let (edit, new_source) = Edit::replace(old.tree.source(), range, replacement.as_bytes());
    let mut parser = Parser::new(language.clone());
    let reparsed = parser
        .reparse(&old.tree, &edit, &new_source)
        .expect("edit produced by Edit::replace should be valid");
    let fresh = parser.parse(&new_source);
    assert_eq!(
        reparsed.tree.to_sexp(),
        fresh.tree.to_sexp(),
        "incremental result differs from fresh parse of {:?}",
        String::from_utf8_lossy(&new_source)
    );
    assert!(reparsed.tree.structurally_eq(&fresh.tree));
    assert_well_formed(&reparsed.tree);
    reparsed
}
