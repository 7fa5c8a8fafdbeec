//! Hand-assembled reference grammars.
//!
//! Small enough to check by eye, and each exercises one part of the runtime:
//!
//! - [`sum`]: `sum -> sum "+" num | num`, deterministic LR
//! - [`arithmetic`]: `expr -> expr "+" expr | expr "*" expr | number` with
//!   declared conflicts resolved by precedence
//! - [`statements`]: `program -> stmt*`, `stmt -> "let" identifier ";"` with
//!   keyword extraction and a `name` field
//! - [`nested_comments`]: words separated by nestable `/* */` comments that
//!   only an external scanner can recognise

use crate::grammar::{
    Action, GrammarTableBuilder, Language, LexStateId, Rule, StateId, Symbol, SymbolInfo, SymbolKind,
    TableError,
};
use crate::lexer::{ExternalLexer, ExternalScanner, ValidSymbols};

const WHITESPACE: &[(u8, u8)] = &[(b'\t', b'\n'), (b'\r', b'\r'), (b' ', b' ')];

fn whitespace(builder: &mut GrammarTableBuilder, lex: LexStateId) -> Symbol {
    let symbol = builder.symbol(
        SymbolInfo::new("whitespace", SymbolKind::Terminal)
            .anonymous()
            .extra(),
    );
    builder.lex_repeat(lex, WHITESPACE, symbol);
    symbol
}

/// `sum -> sum "+" num | num`, `num -> number`
pub fn sum() -> Result<Language, TableError> {
    let mut b = GrammarTableBuilder::new("sum");
    let lex = b.lex_state();

    let plus = b.token("+");
    let number = b.terminal("number");
    whitespace(&mut b, lex);
    let sum = b.non_terminal("sum");
    let num = b.non_terminal("num");

    b.lex_literal(lex, b"+", plus);
    b.lex_repeat(lex, &[(b'0', b'9')], number);

    let add = b.rule(Rule::new(sum, 3));
    let single = b.rule(Rule::new(sum, 1));
    let wrap = b.rule(Rule::new(num, 1));

    let s: Vec<StateId> = (0..6).map(|_| b.state(lex)).collect();
    b.shift(s[0], number, s[3]).goto(s[0], sum, s[1]).goto(s[0], num, s[2]);
    b.shift(s[1], plus, s[4]).accept(s[1]);
    b.reduce(s[2], &[plus, Symbol::END], single);
    b.reduce(s[3], &[plus, Symbol::END], wrap);
    b.shift(s[4], number, s[3]).goto(s[4], num, s[5]);
    b.reduce(s[5], &[plus, Symbol::END], add);
    b.start(s[0], sum);

    Ok(Language::new(b.build()?))
}

/// Ambiguous binary expressions whose conflicts are resolved at parse time
pub fn arithmetic() -> Result<Language, TableError> {
    let mut b = GrammarTableBuilder::new("arithmetic");
    let lex = b.lex_state();

    let plus = b.symbol(
        SymbolInfo::new("+", SymbolKind::Terminal)
            .anonymous()
            .with_precedence(1),
    );
    let times = b.symbol(
        SymbolInfo::new("*", SymbolKind::Terminal)
            .anonymous()
            .with_precedence(2),
    );
    let number = b.terminal("number");
    whitespace(&mut b, lex);
    let expr = b.non_terminal("expr");

    b.lex_literal(lex, b"+", plus);
    b.lex_literal(lex, b"*", times);
    b.lex_repeat(lex, &[(b'0', b'9')], number);

    let left = b.field("left");
    let operator = b.field("operator");
    let right = b.field("right");
    let binary = |lhs, precedence| {
        Rule::new(lhs, 3)
            .with_precedence(precedence)
            .left()
            .with_field(0, left)
            .with_field(1, operator)
            .with_field(2, right)
    };
    let add = b.rule(binary(expr, 1));
    let mul = b.rule(binary(expr, 2));
    let literal = b.rule(Rule::new(expr, 1));

    let s: Vec<StateId> = (0..7).map(|_| b.state(lex)).collect();
    b.shift(s[0], number, s[2]).goto(s[0], expr, s[1]);
    b.shift(s[1], plus, s[3]).shift(s[1], times, s[4]).accept(s[1]);
    b.reduce(s[2], &[plus, times, Symbol::END], literal);
    b.shift(s[3], number, s[2]).goto(s[3], expr, s[5]);
    b.shift(s[4], number, s[2]).goto(s[4], expr, s[6]);
    for (state, rule) in [(s[5], add), (s[6], mul)] {
        b.shift(state, plus, s[3])
            .action(state, plus, Action::Reduce(rule))
            .shift(state, times, s[4])
            .action(state, times, Action::Reduce(rule))
            .reduce(state, &[Symbol::END], rule);
    }
    b.start(s[0], expr);

    Ok(Language::new(b.build()?))
}

/// `let` statements with a reserved word that doubles as an identifier
pub fn statements() -> Result<Language, TableError> {
    let mut b = GrammarTableBuilder::new("statements");
    let lex = b.lex_state();
    let keywords = b.lex_state();

    let let_kw = b.token("let");
    let semicolon = b.token(";");
    let identifier = b.terminal("identifier");
    whitespace(&mut b, lex);
    let program = b.non_terminal("program");
    let stmt = b.non_terminal("let_statement");

    b.lex_literal(lex, b";", semicolon);
    let word = b.lex_state();
    for (min, max) in [(b'a', b'z'), (b'A', b'Z'), (b'_', b'_')] {
        b.lex_transition(lex, min, max, word);
    }
    for (min, max) in [(b'0', b'9'), (b'a', b'z'), (b'A', b'Z'), (b'_', b'_')] {
        b.lex_transition(word, min, max, word);
    }
    b.lex_accept(word, identifier);
    b.lex_literal(keywords, b"let", let_kw);
    b.keywords(identifier, keywords).error_lex_state(lex);

    let name = b.field("name");
    let append = b.rule(Rule::new(program, 2));
    let empty = b.rule(Rule::new(program, 0));
    let binding = b.rule(Rule::new(stmt, 3).with_field(1, name));

    let s: Vec<StateId> = (0..6).map(|_| b.state(lex)).collect();
    b.reduce(s[0], &[Symbol::END, let_kw], empty).goto(s[0], program, s[1]);
    b.shift(s[1], let_kw, s[2]).accept(s[1]).goto(s[1], stmt, s[3]);
    b.shift(s[2], identifier, s[4]);
    b.reduce(s[3], &[Symbol::END, let_kw], append);
    b.shift(s[4], semicolon, s[5]);
    b.reduce(s[5], &[Symbol::END, let_kw], binding);
    b.start(s[0], program);

    Ok(Language::new(b.build()?))
}

/// Words separated by whitespace and nestable block comments
pub fn nested_comments() -> Result<Language, TableError> {
    let mut b = GrammarTableBuilder::new("nested_comments");
    let lex = b.lex_state();

    b.symbol(SymbolInfo::new("comment", SymbolKind::External).extra());
    let word = b.terminal("word");
    whitespace(&mut b, lex);
    let document = b.non_terminal("document");

    b.lex_repeat(lex, &[(b'a', b'z')], word);

    let append = b.rule(Rule::new(document, 2));
    let empty = b.rule(Rule::new(document, 0));

    let s: Vec<StateId> = (0..3).map(|_| b.state(lex)).collect();
    b.reduce(s[0], &[Symbol::END, word], empty).goto(s[0], document, s[1]);
    b.shift(s[1], word, s[2]).accept(s[1]);
    b.reduce(s[2], &[Symbol::END, word], append);
    b.start(s[0], document);

    Ok(Language::with_scanner(b.build()?, || {
        Box::new(NestedCommentScanner::default()) as Box<dyn ExternalScanner>
    }))
}

/// Recognises `/* ... */` with arbitrary nesting
///
/// Counts the comments it has produced and carries the count in its
/// serialized state, so state round-trips are observable.
#[derive(Debug, Default)]
pub struct NestedCommentScanner {
    comments: u32,
}

impl NestedCommentScanner {
    /// Symbol id of `comment` in [`nested_comments`]
    pub const COMMENT: Symbol = Symbol::new(1);

    pub fn comments(&self) -> u32 {
        self.comments
    }
}

impl ExternalScanner for NestedCommentScanner {
    fn scan(&mut self, lexer: &mut ExternalLexer<'_>, valid: &ValidSymbols<'_>) -> Option<Symbol> {
        if !valid.contains(Self::COMMENT) || lexer.lookahead() != Some(b'/') {
            return None;
        }
        lexer.advance();
        if lexer.lookahead() != Some(b'*') {
            return None;
        }
        lexer.advance();

        let mut depth = 1u32;
        while depth > 0 {
            match lexer.lookahead()? {
                b'/' => {
                    lexer.advance();
                    if lexer.lookahead() == Some(b'*') {
                        lexer.advance();
                        depth += 1;
                    }
                }
                b'*' => {
                    lexer.advance();
                    if lexer.lookahead() == Some(b'/') {
                        lexer.advance();
                        depth -= 1;
                    }
                }
                _ => lexer.advance(),
            }
        }
        lexer.mark_end();
        self.comments += 1;
        Some(Self::COMMENT)
    }

    fn serialize(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.comments.to_le_bytes());
    }

    fn deserialize(&mut self, state: &[u8]) {
        self.comments = state
            .get(..4)
            .and_then(|bytes| bytes.try_into().ok())
            .map_or(0, u32::from_le_bytes);
    }
}
