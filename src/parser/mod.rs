//! Parsing.
//!
//! [`Parser`] turns source bytes into a [`SyntaxTree`] for one [`Language`]:
//! - `automaton` - the GLR driver: lockstep versions, forking and merging
//! - `stack` - parse stack versions and reductions
//! - `ranking` - which version wins when interpretations compete
//! - `recovery` - missing-token insertion, resynchronization, skipping
//! - `reuse` - subtree reuse when reparsing after an edit
//!
//! Malformed input is never an error: every parse returns a tree covering
//! the whole input, with error and missing nodes where needed.
//!
//! ```ignore
//! let mut parser = Parser::new(language);
//! let outcome = parser.parse(b"1+2");
//! let (edit, new_source) = Edit::replace(b"1+2", TextRange::new(2.into(), 3.into()), b"22");
//! let outcome = parser.reparse(&outcome.tree, &edit, &new_source)?;
//! ```

mod automaton;
mod batch;
mod options;
mod ranking;
mod recovery;
mod reuse;
mod stack;

pub use batch::parse_batch;
pub use options::{ConflictPolicy, ParseOptions};

use crate::base::{LineIndex, TextRange, TextSize};
use crate::grammar::Language;
use crate::lexer::{ExternalScanner, MAX_SOURCE_LEN, TextInput, read_all};
use crate::tree::{Edit, EditError, ErrorCode, Severity, Subtree, SyntaxError, SyntaxTree};
use automaton::ParseRun;
use reuse::ReusableNodes;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// How a parse ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseStatus {
    Complete,
    /// Ambiguity exceeded `max_forks`; the worst interpretations were dropped
    ForksPruned { limit: usize },
    /// The cancellation token fired; the tree ends in an error leaf
    Cancelled,
    /// The time budget ran out; the tree ends in an error leaf
    TimedOut,
    /// Input past `limit` bytes was dropped before parsing
    Truncated { limit: usize },
}

impl ParseStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Counters collected during one parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Lexer invocations, including those made while recovering
    pub tokens_lexed: usize,
    /// Old subtrees (tokens and non-terminals) taken over by reference
    pub subtrees_reused: usize,
    pub forks_created: usize,
    pub versions_merged: usize,
    pub versions_pruned: usize,
    /// Error regions entered; one region may involve several repairs
    pub recoveries: usize,
}

/// Result of [`Parser::parse`] and friends
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub tree: SyntaxTree,
    pub status: ParseStatus,
    pub stats: ParseStats,
}

impl ParseOutcome {
    /// Stopped before parsing all input
    pub fn is_partial(&self) -> bool {
        matches!(
            self.status,
            ParseStatus::Cancelled | ParseStatus::TimedOut | ParseStatus::Truncated { .. }
        )
    }

    /// Syntax errors in the tree, followed by one resource diagnostic when
    /// the parse did not complete normally
    pub fn diagnostics(&self) -> Vec<SyntaxError> {
        let mut errors = self.tree.errors();
        let whole = TextRange::up_to(self.tree.len());
        match self.status {
            ParseStatus::Complete => {}
            ParseStatus::ForksPruned { limit } => errors.push(
                SyntaxError::new(
                    format!("input too ambiguous; interpretations beyond {} were dropped", limit),
                    whole,
                    ErrorCode::E0301,
                )
                .with_severity(Severity::Warning),
            ),
            ParseStatus::Cancelled => {
                errors.push(SyntaxError::new("parse cancelled", whole, ErrorCode::E0302))
            }
            ParseStatus::TimedOut => errors.push(SyntaxError::new(
                "parse exceeded its time budget",
                whole,
                ErrorCode::E0303,
            )),
            ParseStatus::Truncated { limit } => errors.push(SyntaxError::new(
                format!("input longer than {} bytes; the rest was not parsed", limit),
                whole,
                ErrorCode::E0304,
            )),
        }
        errors
    }
}

/// Invalid reparse requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid edit: {0}")]
    InvalidEdit(#[from] EditError),

    #[error("tree was parsed as `{tree}` but the parser is for `{parser}`")]
    LanguageMismatch { tree: String, parser: String },
}

/// Parses sources for one language
///
/// A parser owns its external scanner instance, so it parses one source at
/// a time; use one parser per thread (see [`parse_batch`]).
pub struct Parser {
    language: Language,
    options: ParseOptions,
    scanner: Option<Box<dyn ExternalScanner>>,
}

impl Parser {
    pub fn new(language: Language) -> Self {
        let scanner = language.create_scanner();
        Self {
            language,
            options: ParseOptions::default(),
            scanner,
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ParseOptions) {
        self.options = options;
    }

    /// Parse `source` from scratch.
    ///
    /// Trees address at most `u32::MAX - 1` bytes. Longer sources are cut
    /// there and the outcome reports [`ParseStatus::Truncated`].
    pub fn parse(&mut self, source: impl AsRef<[u8]>) -> ParseOutcome {
        let (source, truncated) = shared_source(source.as_ref(), MAX_SOURCE_LEN);
        self.run(source, None, 0, truncated.then_some(MAX_SOURCE_LEN))
    }

    /// Parse everything `input` yields, up to the same cap as [`Parser::parse`]
    pub fn parse_input(&mut self, input: &mut dyn TextInput) -> ParseOutcome {
        let (source, truncated) = read_all(input, MAX_SOURCE_LEN);
        self.run(source.into(), None, 0, truncated.then_some(MAX_SOURCE_LEN))
    }

    /// Parse `new_source`, reusing the parts of `old` that `edit` left
    /// intact. The result is the tree a fresh parse of `new_source` gives.
    pub fn reparse(&mut self, old: &SyntaxTree, edit: &Edit, new_source: impl AsRef<[u8]>) -> Result<ParseOutcome, ParseError> {
        if !old.language().ptr_eq(&self.language) {
            return Err(ParseError::LanguageMismatch {
                tree: old.language().name().to_string(),
                parser: self.language.name().to_string(),
            });
        }
        let (source, truncated) = shared_source(new_source.as_ref(), MAX_SOURCE_LEN);
        edit.validate(old.len(), TextSize::from(source.len() as u32))?;
        Ok(self.run(
            source,
            Some((old.root_subtree(), *edit)),
            old.version() + 1,
            truncated.then_some(MAX_SOURCE_LEN),
        ))
    }

    /// `truncated_at` is the cap the source was cut at, if it was
    fn run(
        &mut self,
        source: Arc<[u8]>,
        old: Option<(&Subtree, Edit)>,
        version: u64,
        truncated_at: Option<usize>,
    ) -> ParseOutcome {
        let language = self.language.clone();
        let line_index = LineIndex::new(&source);
        let reuse = old.map(|(root, edit)| ReusableNodes::new(root, edit));
        let output = ParseRun::new(
            language.table(),
            &source,
            &line_index,
            self.scanner.as_deref_mut(),
            &self.options,
            reuse,
        )
        .run();
        // Interruption already marks the tree partial; otherwise the cut wins
        let status = match (truncated_at, output.status) {
            (_, status @ (ParseStatus::Cancelled | ParseStatus::TimedOut)) | (None, status) => status,
            (Some(limit), _) => ParseStatus::Truncated { limit },
        };
        ParseOutcome {
            tree: SyntaxTree::new(output.root, source, language, version),
            status,
            stats: output.stats,
        }
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("language", &self.language.name())
            .field("options", &self.options)
            .field("has_scanner", &self.scanner.is_some())
            .finish()
    }
}

/// Copy `source` into a shared buffer of at most `limit` bytes. The flag is
/// set when bytes were dropped.
fn shared_source(source: &[u8], limit: usize) -> (Arc<[u8]>, bool) {
    if source.len() > limit {
        tracing::warn!("[PARSE] source of {} bytes truncated to {}", source.len(), limit);
        return (Arc::from(&source[..limit]), true);
    }
    (Arc::from(source), false)
}
