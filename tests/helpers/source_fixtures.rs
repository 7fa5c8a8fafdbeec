//! Common source fixtures and shared grammars for tests.

use once_cell::sync::Lazy;
use sylva::Language;
use sylva::testing;

pub static SUM: Lazy<Language> = Lazy::new(|| testing::sum().unwrap());
pub static ARITHMETIC: Lazy<Language> = Lazy::new(|| testing::arithmetic().unwrap());
pub static STATEMENTS: Lazy<Language> = Lazy::new(|| testing::statements().unwrap());
pub static NESTED_COMMENTS: Lazy<Language> = Lazy::new(|| testing::nested_comments().unwrap());

// Well-formed programs
pub const SINGLE_STATEMENT: &str = "let x;";
pub const THREE_STATEMENTS: &str = "let a;\nlet b;\nlet c;\n";

pub const INDENTED_PROGRAM: &str = r#"
    let first;
    let second;
        let third;
"#;

pub const KEYWORD_AS_NAME: &str = "let let; let x;";

// Malformed programs
pub const MISSING_SEMICOLON: &str = "let x let y;";
pub const STRAY_BYTE: &str = "let x ? ; let y;";
pub const MISSING_NAME: &str = "let ; let y;";
pub const ONLY_GARBAGE: &str = "; ; ;";

// Expressions
pub const LONG_SUM: &str = "1 + 22 + 333 + 4444 + 55555";
pub const MIXED_OPERATORS: &str = "1 + 2 * 3 + 4 * 5 * 6";

// Comments
pub const NESTED_COMMENT: &str = "a /* outer /* inner */ still outer */ b";
pub const UNTERMINATED_COMMENT: &str = "a b /* never closed";

/// `count` statements, one per line
pub fn many_statements(count: usize) -> String {
    (0..count).map(|i| format!("let v{};\n", i)).collect()
}

/// A sum of `count` numbers
pub fn long_sum(count: usize) -> String {
    (1..=count)
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("+")
}
