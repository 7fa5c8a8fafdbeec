//! Table-driven lexer.
//!
//! Tokens are produced on demand, one per call, in the lex mode of the parse
//! state asking for them. The order of attempts is:
//!
//! 1. the external scanner, when the state accepts any external token
//! 2. the state's DFA, longest match wins
//! 3. the grammar's error lex state, when it differs from the state's mode
//! 4. a one-byte [`Symbol::ERROR`] token, so lexing always makes progress
//!
//! Whitespace and comments are ordinary tokens flagged extra in the grammar;
//! the lexer never skips bytes.

mod external;
mod input;

pub use external::{ExternalLexer, ExternalScanner, ExternalScannerFactory, ScannerState, ValidSymbols};
pub use input::{ChunkedInput, TextInput};
pub(crate) use input::{MAX_SOURCE_LEN, read_all};

use crate::base::{LineIndex, Point, TextRange, TextSize};
use crate::grammar::{GrammarTable, LexStateId, StateId, Symbol};

/// One lexed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: Symbol,
    pub range: TextRange,
    /// Start position
    pub point: Point,
    /// One past the last byte examined to produce this token. End of input
    /// reports the source length plus one.
    pub lookahead_end: TextSize,
    /// Parse state the token was lexed in; [`StateId::RECOVERY`] while
    /// recovering from an error
    pub lex_state: StateId,
    /// Reserved word extracted from the word token
    pub keyword: bool,
    /// Produced by the external scanner
    pub external: bool,
    pub scanner_before: ScannerState,
    pub scanner_after: ScannerState,
}

impl Token {
    pub fn start(&self) -> TextSize {
        self.range.start()
    }

    pub fn end(&self) -> TextSize {
        self.range.end()
    }

    pub fn len(&self) -> TextSize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn is_end(&self) -> bool {
        self.symbol == Symbol::END
    }

    pub fn is_error(&self) -> bool {
        self.symbol.is_error()
    }
}

/// Lexer over one source buffer
pub struct Lexer<'a> {
    table: &'a GrammarTable,
    source: &'a [u8],
    line_index: &'a LineIndex,
    scanner: Option<&'a mut (dyn ExternalScanner + 'static)>,
    buffer: Vec<u8>,
}

impl<'a> Lexer<'a> {
    pub fn new(table: &'a GrammarTable, source: &'a [u8], line_index: &'a LineIndex) -> Self {
        Self {
            table,
            source,
            line_index,
            scanner: None,
            buffer: Vec::new(),
        }
    }

    pub fn with_scanner(mut self, scanner: Option<&'a mut (dyn ExternalScanner + 'static)>) -> Self {
        self.scanner = scanner;
        self
    }

    /// Lex one token at `offset` for parse state `state`.
    ///
    /// `scanner_state` is the external scanner state in effect before the
    /// token. Zero-width external tokens are refused in the recovery state
    /// and whenever `allow_empty_external` is false.
    pub fn lex(
        &mut self,
        offset: TextSize,
        state: StateId,
        scanner_state: &ScannerState,
        allow_empty_external: bool,
    ) -> Token {
        let start = usize::from(offset).min(self.source.len());
        let recovering = state == StateId::RECOVERY;
        let mut examined = start;

        if let Some(token) = self.scan_external(
            start,
            state,
            scanner_state,
            allow_empty_external && !recovering,
            &mut examined,
        ) {
            return token;
        }

        if start >= self.source.len() {
            let end = self.source.len() as u32;
            return Token {
                symbol: Symbol::END,
                range: TextRange::empty(TextSize::from(end)),
                point: self.line_index.point(TextSize::from(end)),
                lookahead_end: TextSize::from(end + 1),
                lex_state: state,
                keyword: false,
                external: false,
                scanner_before: scanner_state.clone(),
                scanner_after: scanner_state.clone(),
            };
        }

        let mode = self.table.lex_mode(state);
        let mut matched = self.longest_match(mode, start, &mut examined);
        if matched.is_none() {
            if let Some(fallback) = self.table.error_lex_state().filter(|id| *id != mode) {
                matched = self.longest_match(fallback, start, &mut examined);
            }
        }

        let (symbol, end, keyword) = match matched {
            Some((symbol, end)) => {
                let (symbol, keyword) = self.extract_keyword(symbol, start, end, state, recovering);
                (symbol, end, keyword)
            }
            None => {
                examined = examined.max(start + 1);
                (Symbol::ERROR, start + 1, false)
            }
        };

        Token {
            symbol,
            range: TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32)),
            point: self.line_index.point(TextSize::from(start as u32)),
            lookahead_end: TextSize::from(examined.max(end) as u32),
            lex_state: state,
            keyword,
            external: false,
            scanner_before: scanner_state.clone(),
            scanner_after: scanner_state.clone(),
        }
    }

    /// Run a DFA from `start`, returning the longest accepted token. States
    /// without transitions stop without looking at the next byte.
    fn longest_match(&self, mode: LexStateId, start: usize, examined: &mut usize) -> Option<(Symbol, usize)> {
        let (matched, furthest) = run_dfa(self.table, mode, &self.source[start..]);
        *examined = (*examined).max(start + furthest);
        matched.map(|(symbol, len)| (symbol, start + len))
    }

    fn extract_keyword(
        &self,
        symbol: Symbol,
        start: usize,
        end: usize,
        state: StateId,
        recovering: bool,
    ) -> (Symbol, bool) {
        let (Some(word), Some(keywords)) = (self.table.word_token(), self.table.keyword_lex_state()) else {
            return (symbol, false);
        };
        if symbol != word {
            return (symbol, false);
        }
        let text = &self.source[start..end];
        let keyword = match run_dfa(self.table, keywords, text) {
            (Some((keyword, len)), _) if len == text.len() => keyword,
            _ => return (symbol, false),
        };
        // A reserved word is still usable as an identifier where only the
        // identifier fits.
        if !recovering
            && !self.table.has_actions(state, keyword)
            && self.table.has_actions(state, word)
        {
            return (word, false);
        }
        (keyword, true)
    }

    fn scan_external(
        &mut self,
        start: usize,
        state: StateId,
        scanner_state: &ScannerState,
        allow_empty: bool,
        examined: &mut usize,
    ) -> Option<Token> {
        let scanner = self.scanner.as_deref_mut()?;
        let valid = self.table.valid_externals(state);
        if valid.is_empty() {
            return None;
        }

        scanner.deserialize(scanner_state.as_bytes());
        let point = self.line_index.point(TextSize::from(start as u32));
        let mut cursor = ExternalLexer::new(self.source, start, point);
        let result = scanner.scan(
            &mut cursor,
            &ValidSymbols::new(valid, state == StateId::RECOVERY),
        );
        *examined = (*examined).max(cursor.examined_end());

        let end = cursor.token_end();
        let accepted = result
            .filter(|symbol| valid.contains(symbol))
            .filter(|_| allow_empty || end > start);
        let Some(symbol) = accepted else {
            scanner.deserialize(scanner_state.as_bytes());
            return None;
        };

        self.buffer.clear();
        scanner.serialize(&mut self.buffer);
        tracing::trace!(
            "[PARSE] external token {} at {}..{} in state {}",
            symbol,
            start,
            end,
            state
        );
        Some(Token {
            symbol,
            range: TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32)),
            point,
            lookahead_end: TextSize::from((*examined).max(end) as u32),
            lex_state: state,
            keyword: false,
            external: true,
            scanner_before: scanner_state.clone(),
            scanner_after: ScannerState::new(&self.buffer),
        })
    }
}

/// Longest match of the DFA starting at `mode` over `text`.
///
/// Returns the accepted symbol and length, plus one past the furthest byte
/// inspected (running off the end counts as inspecting one more byte).
fn run_dfa(table: &GrammarTable, mode: LexStateId, text: &[u8]) -> (Option<(Symbol, usize)>, usize) {
    let mut current = mode;
    let mut position = 0;
    let mut furthest = 0;
    let mut accepted = None;
    loop {
        let state = table.lex_state(current);
        if state.is_final() {
            break;
        }
        furthest = position + 1;
        let Some(next) = text.get(position).and_then(|&byte| state.next(byte)) else {
            break;
        };
        current = next;
        position += 1;
        if let Some(symbol) = table.lex_state(current).accept {
            accepted = Some((symbol, position));
        }
    }
    (accepted, furthest)
}
