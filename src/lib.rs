//! # sylva-base
//!
//! Core library for table-driven, incremental, error-tolerant parsing.
//!
//! A grammar compiler produces parse and lex tables offline; this crate loads
//! them as a [`Language`] and turns source bytes into concrete syntax trees.
//! Ambiguous grammars are handled by generalized (GLR) parsing, malformed
//! input by error recovery, and edits by reusing unchanged subtrees.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! parser    → GLR automaton, error recovery, incremental reuse
//!   ↓
//! tree      → Subtree storage, SyntaxTree/SyntaxNode views, edits, diagnostics
//!   ↓
//! lexer     → DFA lexing, keyword extraction, external scanners
//!   ↓
//! grammar   → Symbols, parse/lex tables, Language handles
//!   ↓
//! base      → Primitives (TextRange, Point, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → grammar → lexer → tree → parser)
// ============================================================================

/// Foundation types: TextRange, Point, LineIndex
pub mod base;

/// Grammar tables: symbols, actions, lex states, Language handles
pub mod grammar;

/// Lexer: DFA longest match, keywords, external scanners
pub mod lexer;

/// Syntax trees: shared subtrees, positioned views, edits, diagnostics
pub mod tree;

/// Parser: GLR automaton, error recovery, incremental reparse
pub mod parser;

/// Reference grammars for tests and examples
pub mod testing;

// Re-export commonly needed items
pub use grammar::{GrammarTable, GrammarTableBuilder, Language, LanguageRegistry, Symbol, TableError};
pub use parser::{ConflictPolicy, ParseError, ParseOptions, ParseOutcome, ParseStats, ParseStatus, Parser, parse_batch};
pub use tree::{Edit, SyntaxError, SyntaxNode, SyntaxTree, TreeCursor};

// Re-export foundation types
pub use base::{LineIndex, Point, TextRange, TextSize};
