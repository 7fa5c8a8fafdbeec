//! Diagnostics for error-marked regions
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (bytes no token matches)
//! - E02xx: Syntactic errors (missing and unexpected tokens)
//! - E03xx: Resource errors (fork limits, cancellation, timeouts)

use crate::base::TextRange;
use std::fmt;

/// Error codes for parser diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors
    // =========================================================================
    /// Input that no token of the grammar matches
    E0101,

    // =========================================================================
    // E02xx: Syntactic errors
    // =========================================================================
    /// Token synthesized by error recovery
    E0201,
    /// Tokens skipped by error recovery
    E0202,
    /// Input left unparsed when recovery found no way to continue
    E0203,

    // =========================================================================
    // E03xx: Resource errors
    // =========================================================================
    /// Ambiguity exceeded the fork limit; some interpretations were dropped
    E0301,
    /// Parse cancelled by the caller
    E0302,
    /// Parse exceeded its time budget
    E0303,
    /// Input longer than a tree can address; the excess was not parsed
    E0304,
}

impl ErrorCode {
    /// Get the string representation of the error code (e.g., "E0201")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0301 => "E0301",
            Self::E0302 => "E0302",
            Self::E0303 => "E0303",
            Self::E0304 => "E0304",
        }
    }

    /// Get a short description of the error category
    pub fn category_description(&self) -> &'static str {
        match self {
            Self::E0101 => "lexical error",
            Self::E0201 | Self::E0202 | Self::E0203 => "syntax error",
            Self::E0301 | Self::E0302 | Self::E0303 | Self::E0304 => "resource error",
        }
    }

    /// Resource errors describe the parse, not the text
    pub fn is_resource(&self) -> bool {
        matches!(self, Self::E0301 | Self::E0302 | Self::E0303 | Self::E0304)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Hint,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Hint => "hint",
        }
    }
}

/// Related location information for an error
///
/// Points at the construct the error was found in, e.g. "in this
/// let_statement".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub message: String,
    pub range: TextRange,
}

impl RelatedInfo {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// A syntax error located in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Human-readable error message
    pub message: String,
    pub range: TextRange,
    pub code: ErrorCode,
    pub severity: Severity,
    /// Optional suggestion for fixing the error
    pub hint: Option<String>,
    pub related: Vec<RelatedInfo>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            range,
            code,
            severity: Severity::Error,
            hint: None,
            related: vec![],
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Format the error for display
    pub fn format(&self) -> String {
        let mut result = format!("{}: {}", self.code, self.message);
        if let Some(hint) = &self.hint {
            result.push_str(&format!("\n  hint: {}", hint));
        }
        result
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] at {:?}: {}",
            self.severity.as_str(),
            self.code,
            self.range,
            self.message
        )
    }
}

impl std::error::Error for SyntaxError {}
