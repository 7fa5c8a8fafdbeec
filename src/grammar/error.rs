//! Errors raised while loading grammar tables.
//!
//! A table that fails validation is the output of a broken table compiler,
//! not bad source text, so every variant here is fatal at load time.

use super::action::{RuleId, StateId};
use super::lex_table::LexStateId;
use super::symbol::Symbol;
use thiserror::Error;

/// Oldest table layout this runtime understands
pub const MIN_ABI_VERSION: u32 = 1;
/// Newest table layout this runtime understands
pub const ABI_VERSION: u32 = 1;

/// Structural problems in a grammar table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("unsupported table ABI version {found} (supported {min}..={max})", min = MIN_ABI_VERSION, max = ABI_VERSION)]
    UnsupportedAbi { found: u32 },

    #[error("grammar has no symbols")]
    NoSymbols,

    #[error("symbol {symbol} must be the end-of-input terminal")]
    EndNotFirst { symbol: Symbol },

    #[error("terminal {symbol} is declared after a non-terminal")]
    SymbolOrder { symbol: Symbol },

    #[error("grammar declares {count} symbols, more than the table can address")]
    TooManySymbols { count: usize },

    #[error("symbol {symbol} is marked extra but is not a terminal")]
    NonTerminalExtra { symbol: Symbol },

    #[error("rule {rule:?} has lhs {symbol}, which is not a non-terminal")]
    RuleLhs { rule: RuleId, symbol: Symbol },

    #[error("rule {rule:?} names field {field} for child {child}, but has {len} children")]
    RuleField {
        rule: RuleId,
        child: u16,
        field: u16,
        len: u16,
    },

    #[error("grammar has no parse states")]
    NoStates,

    #[error("state {state} has {found} action cells, expected one per terminal ({expected})")]
    ActionRowWidth {
        state: StateId,
        found: usize,
        expected: usize,
    },

    #[error("state {state} has {found} goto entries, expected one per non-terminal ({expected})")]
    GotoRowWidth {
        state: StateId,
        found: usize,
        expected: usize,
    },

    #[error("state {state} on {symbol} refers to missing state {target}")]
    ShiftTarget {
        state: StateId,
        symbol: Symbol,
        target: StateId,
    },

    #[error("state {state} on {symbol} reduces by missing rule {rule:?}")]
    ReduceRule {
        state: StateId,
        symbol: Symbol,
        rule: RuleId,
    },

    #[error("state {state} accepts on {symbol}; only end of input may accept")]
    AcceptSymbol { state: StateId, symbol: Symbol },

    #[error("state {state} has no action for any terminal")]
    DeadState { state: StateId },

    #[error("state {state} refers to missing lex state {lex_state:?}")]
    LexMode {
        state: StateId,
        lex_state: LexStateId,
    },

    #[error("lex state {lex_state:?} transitions to missing lex state {target:?}")]
    LexTarget {
        lex_state: LexStateId,
        target: LexStateId,
    },

    #[error("lex state {lex_state:?} has overlapping transitions on byte {byte:#04x}")]
    LexOverlap { lex_state: LexStateId, byte: u8 },

    #[error("lex state {lex_state:?} accepts {symbol}, which is not a lexical terminal")]
    LexAccept {
        lex_state: LexStateId,
        symbol: Symbol,
    },

    #[error("lex state {0:?} does not exist")]
    UnknownLexState(LexStateId),

    #[error("start state {0} does not exist")]
    StartState(StateId),

    #[error("start symbol {0} is not a non-terminal")]
    StartSymbol(Symbol),

    #[error("word token {0} is not a lexical terminal")]
    WordToken(Symbol),

    #[error("keyword lex state is set without a word token")]
    KeywordsWithoutWord,
}

/// Errors from reading a serialized grammar table.
#[cfg(feature = "serde")]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid grammar table: {0}")]
    Table(#[from] TableError),
}
