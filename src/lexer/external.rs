//! External scanner capability.
//!
//! Some tokens are not regular: nested block comments, significant
//! indentation, heredocs. Grammars declare such symbols as external and a
//! host supplies an [`ExternalScanner`] that recognises them. The scanner
//! only ever sees a byte cursor and the set of external tokens the parser
//! could accept right now.

use crate::base::{Point, TextSize};
use crate::grammar::Symbol;
use std::sync::Arc;

/// Host-implemented recogniser for external tokens
///
/// A scanner may keep state between tokens (an indentation stack, say). The
/// runtime snapshots that state with [`serialize`](Self::serialize) after
/// every external token and restores it with
/// [`deserialize`](Self::deserialize) whenever it rewinds: after a failed
/// scan, when switching between parse versions, and when reusing subtrees
/// from an earlier parse.
pub trait ExternalScanner: Send {
    /// Try to recognise one of `valid` at the cursor.
    ///
    /// Returns the recognised symbol, or `None` for no match. The token ends
    /// at the last [`mark_end`](ExternalLexer::mark_end), or at the cursor if
    /// `mark_end` was never called.
    fn scan(&mut self, lexer: &mut ExternalLexer<'_>, valid: &ValidSymbols<'_>) -> Option<Symbol>;

    /// Append the scanner's state to `buffer`
    fn serialize(&self, buffer: &mut Vec<u8>);

    /// Restore state previously written by `serialize`; empty means initial.
    fn deserialize(&mut self, state: &[u8]);
}

/// Creates one scanner per parser
pub trait ExternalScannerFactory: Send + Sync {
    fn create(&self) -> Box<dyn ExternalScanner>;
}

impl<F> ExternalScannerFactory for F
where
    F: Fn() -> Box<dyn ExternalScanner> + Send + Sync,
{
    fn create(&self) -> Box<dyn ExternalScanner> {
        self()
    }
}

/// Byte cursor handed to [`ExternalScanner::scan`]
#[derive(Debug)]
pub struct ExternalLexer<'a> {
    source: &'a [u8],
    position: usize,
    point: Point,
    marked_end: Option<usize>,
}

impl<'a> ExternalLexer<'a> {
    pub(crate) fn new(source: &'a [u8], position: usize, point: Point) -> Self {
        Self {
            source,
            position,
            point,
            marked_end: None,
        }
    }

    /// Byte under the cursor, `None` at end of input
    pub fn lookahead(&self) -> Option<u8> {
        self.source.get(self.position).copied()
    }

    /// Consume the byte under the cursor
    pub fn advance(&mut self) {
        if let Some(&byte) = self.source.get(self.position) {
            self.point = self.point.advance(&[byte]);
            self.position += 1;
        }
    }

    /// End the token at the cursor; later advances only look ahead.
    pub fn mark_end(&mut self) {
        self.marked_end = Some(self.position);
    }

    pub fn position(&self) -> TextSize {
        TextSize::from(self.position as u32)
    }

    pub fn column(&self) -> u32 {
        self.point.column
    }

    pub fn is_at_eof(&self) -> bool {
        self.position >= self.source.len()
    }

    pub(crate) fn token_end(&self) -> usize {
        self.marked_end.unwrap_or(self.position)
    }

    /// One past the furthest byte the scanner could have inspected
    pub(crate) fn examined_end(&self) -> usize {
        self.position + 1
    }
}

/// External tokens the parser can accept at the cursor
#[derive(Debug, Clone, Copy)]
pub struct ValidSymbols<'a> {
    symbols: &'a [Symbol],
    recovering: bool,
}

impl<'a> ValidSymbols<'a> {
    pub(crate) fn new(symbols: &'a [Symbol], recovering: bool) -> Self {
        Self {
            symbols,
            recovering,
        }
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.symbols.contains(&symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + 'a {
        self.symbols.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The parser is skipping input after a syntax error, so every external
    /// token is offered. Zero-width results are rejected in this mode.
    pub fn is_recovering(&self) -> bool {
        self.recovering
    }
}

/// Serialized external scanner state
///
/// Stored on leaves so a reused subtree can restore the scanner exactly as
/// the original parse left it. The empty state is the scanner's initial one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScannerState(Option<Arc<[u8]>>);

impl ScannerState {
    pub const EMPTY: ScannerState = ScannerState(None);

    pub fn new(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            Self::EMPTY
        } else {
            Self(Some(Arc::from(bytes)))
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_deref().unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}
