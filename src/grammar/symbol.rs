//! Grammar symbols and their metadata.

use smol_str::SmolStr;
use std::fmt;

/// A grammar symbol id
///
/// Terminals (including external tokens) occupy `0..terminal_count`,
/// non-terminals follow. [`Symbol::END`] is always the first terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Symbol(u16);

impl Symbol {
    /// End of input
    pub const END: Symbol = Symbol(0);
    /// Builtin error symbol. Never part of a grammar table.
    pub const ERROR: Symbol = Symbol(u16::MAX);

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_error(self) -> bool {
        self.0 == u16::MAX
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_error() {
            f.write_str("#error")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Index into the grammar's field name list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FieldId(u16);

impl FieldId {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a symbol comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SymbolKind {
    /// Recognised by the lex table
    Terminal,
    /// Recognised by the external scanner
    External,
    /// Produced by reductions
    NonTerminal,
}

impl SymbolKind {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::NonTerminal)
    }
}

/// Metadata for one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolInfo {
    pub name: SmolStr,
    pub kind: SymbolKind,
    /// Named nodes (`number`, `expr`) versus anonymous ones (`"+"`)
    #[cfg_attr(feature = "serde", serde(default))]
    pub named: bool,
    /// May appear between any two tokens (whitespace, comments)
    #[cfg_attr(feature = "serde", serde(default))]
    pub extra: bool,
    /// Terminal precedence used when ranking shift/reduce conflicts
    #[cfg_attr(feature = "serde", serde(default))]
    pub precedence: i32,
}

impl SymbolInfo {
    pub fn new(name: impl Into<SmolStr>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            named: true,
            extra: false,
            precedence: 0,
        }
    }

    pub fn anonymous(mut self) -> Self {
        self.named = false;
        self
    }

    pub fn extra(mut self) -> Self {
        self.extra = true;
        self
    }

    pub fn with_precedence(mut self, precedence: i32) -> Self {
        self.precedence = precedence;
        self
    }
}
