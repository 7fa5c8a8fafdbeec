//! Grammar tables: symbols, the parse and lex tables, and language handles.
//!
//! Tables are produced offline by a table compiler and validated once at
//! load. Everything downstream (lexer, parser, tree views) reads them
//! through a shared [`Language`] handle and never mutates them.

mod action;
mod builder;
mod error;
mod language;
mod lex_table;
#[cfg(feature = "serde")]
mod serial;
mod symbol;
mod table;

pub use action::{Action, Associativity, Rule, RuleId, StateId};
pub use builder::GrammarTableBuilder;
#[cfg(feature = "serde")]
pub use error::LoadError;
pub use error::{ABI_VERSION, MIN_ABI_VERSION, TableError};
pub use language::{Language, LanguageRegistry};
pub use lex_table::{LexState, LexStateId, LexTransition};
pub use symbol::{FieldId, Symbol, SymbolInfo, SymbolKind};
pub use table::{GrammarTable, StateData, TableData};

#[cfg(test)]
mod tests;
