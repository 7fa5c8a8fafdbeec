use rstest::rstest;
use sylva::{Edit, Parser, TextRange, TextSize};

use crate::helpers::source_fixtures::*;
use crate::helpers::tree_assertions::{assert_reparse_matches_fresh, parse};

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

#[rstest]
#[case::insert_statement(THREE_STATEMENTS, 7, 7, "let new;\n")]
#[case::rename(THREE_STATEMENTS, 4, 5, "renamed")]
#[case::delete_line(THREE_STATEMENTS, 7, 14, "")]
#[case::drop_semicolon(THREE_STATEMENTS, 12, 13, "")]
#[case::restore_semicolon(MISSING_SEMICOLON, 5, 5, ";")]
#[case::remove_stray_byte(STRAY_BYTE, 6, 8, "")]
#[case::insert_garbage(SINGLE_STATEMENT, 5, 5, " $$ ")]
#[case::keyword_becomes_name(SINGLE_STATEMENT, 4, 5, "let")]
#[case::replace_everything(THREE_STATEMENTS, 0, 21, "let z;")]
#[case::leading_space(SINGLE_STATEMENT, 0, 0, " ")]
fn test_statement_edits(#[case] source: &str, #[case] start: u32, #[case] end: u32, #[case] text: &str) {
    let old = parse(&STATEMENTS, source);
    assert_reparse_matches_fresh(&STATEMENTS, &old, range(start, end), text);
}

#[rstest]
#[case::grow_number("1+2+3", 2, 3, "22")]
#[case::append_term("1+2", 3, 3, "+3")]
#[case::remove_operator("1+2+3", 1, 2, "")]
#[case::prepend(LONG_SUM, 0, 0, "9 + ")]
fn test_sum_edits(#[case] source: &str, #[case] start: u32, #[case] end: u32, #[case] text: &str) {
    let old = parse(&SUM, source);
    assert_reparse_matches_fresh(&SUM, &old, range(start, end), text);
}

#[rstest]
#[case::change_operator("1+2*3", 1, 2, "*")]
#[case::extend("1+2", 3, 3, "*4+5")]
#[case::shorten(MIXED_OPERATORS, 9, 21, "")]
fn test_ambiguous_edits(#[case] source: &str, #[case] start: u32, #[case] end: u32, #[case] text: &str) {
    let old = parse(&ARITHMETIC, source);
    assert_reparse_matches_fresh(&ARITHMETIC, &old, range(start, end), text);
}

#[rstest]
#[case::edit_inside_comment(NESTED_COMMENT, 14, 19, "deeper")]
#[case::close_comment(UNTERMINATED_COMMENT, 19, 19, " */ c")]
#[case::open_comment("a b c", 2, 2, "/* ")]
#[case::leading_space("w", 0, 0, " ")]
fn test_comment_edits(#[case] source: &str, #[case] start: u32, #[case] end: u32, #[case] text: &str) {
    let old = parse(&NESTED_COMMENTS, source);
    assert_reparse_matches_fresh(&NESTED_COMMENTS, &old, range(start, end), text);
}

#[test]
fn test_append_reuses_prefix() {
    let source = many_statements(100);
    let old = parse(&STATEMENTS, &source);
    let end = source.len() as u32;
    let new = assert_reparse_matches_fresh(&STATEMENTS, &old, range(end, end), "let z;\n");

    assert!(new.stats.tokens_lexed < 20, "lexed {} tokens", new.stats.tokens_lexed);
    assert!(new.stats.subtrees_reused > 0);
    let fresh = parse(&STATEMENTS, std::str::from_utf8(new.tree.source()).unwrap());
    assert!(fresh.stats.tokens_lexed > 400);
}

#[test]
fn test_edit_chain() {
    let mut parser = Parser::new(STATEMENTS.clone());
    let mut source = SINGLE_STATEMENT.as_bytes().to_vec();
    let mut tree = parser.parse(&source).tree;

    let steps: [(u32, u32, &str); 5] = [
        (6, 6, " let y;"),
        (4, 5, "xx"),
        (7, 7, " let"),
        (11, 11, " z;"),
        (0, 0, "let w; "),
    ];
    for (version, (start, end, text)) in steps.into_iter().enumerate() {
        let (edit, new_source) = Edit::replace(&source, range(start, end), text.as_bytes());
        let outcome = parser.reparse(&tree, &edit, &new_source).unwrap();
        assert_eq!(outcome.tree.version(), version as u64 + 1);
        assert_eq!(outcome.tree.to_sexp(), parser.parse(&new_source).tree.to_sexp());
        tree = outcome.tree;
        source = new_source;
    }
    assert_eq!(tree.source(), b"let w; let xx; let z; let y;");
}

#[test]
fn test_composed_edit() {
    let old = parse(&STATEMENTS, THREE_STATEMENTS);
    let (first, middle) = Edit::replace(old.tree.source(), range(4, 5), b"alpha");
    let (second, last) = Edit::replace(&middle, range(15, 16), b"beta");
    let composed = first.compose(&second);
    assert!(composed
        .validate(old.tree.len(), TextSize::from(last.len() as u32))
        .is_ok());

    let mut parser = Parser::new(STATEMENTS.clone());
    let reparsed = parser.reparse(&old.tree, &composed, &last).unwrap();
    assert_eq!(reparsed.tree.to_sexp(), parser.parse(&last).tree.to_sexp());
}

/// Deterministic pseudo-random edits; each reparse must match a fresh parse
#[test]
fn test_generated_edits() {
    const ALPHABET: &[&str] = &["let", " ", ";", "x", "\n", "?", "let q;"];
    let mut seed: u64 = 0x5eed;
    let mut next = move |bound: usize| {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((seed >> 33) as usize) % bound.max(1)
    };

    let mut old = parse(&STATEMENTS, THREE_STATEMENTS);
    for _ in 0..40 {
        let len = old.tree.source().len();
        let start = next(len + 1);
        let end = (start + next(4)).min(len);
        let text = ALPHABET[next(ALPHABET.len())];
        old = assert_reparse_matches_fresh(&STATEMENTS, &old, range(start as u32, end as u32), text);
    }
}
