//! Parse errors for markup text.

use std::path::PathBuf;

use thiserror::Error;

use crate::Operator;

/// Errors produced while tokenizing or parsing markup.
///
/// Every text-level error carries the 1-based line it was detected on.
/// Whole-file parses wrap them in [`ParseError::File`] so the path travels
/// with the cause.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: invalid escape sequence '\\{character}'")]
    InvalidEscape { line: usize, character: char },

    #[error("line {line}: quoted string is not terminated")]
    UnterminatedQuote { line: usize },

    #[error("line {line}: '}}' does not close any open scope")]
    UnexpectedClosingBrace { line: usize },

    #[error("line {line}: scope '{tag}' is never closed")]
    UnclosedScope { line: usize, tag: String },

    #[error("line {line}: unknown operator '{operator}' after key '{key}'")]
    UnknownOperator {
        line: usize,
        key: String,
        operator: String,
    },

    #[error("line {line}: scope '{tag}' cannot be opened with operator '{operator}'")]
    InvalidScopeOperator {
        line: usize,
        tag: String,
        operator: Operator,
    },

    #[error("line {line}: '{key} {operator}' has no value")]
    MissingValue {
        line: usize,
        key: String,
        operator: Operator,
    },

    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Line the error was detected on, looking through file wrappers.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidEscape { line, .. }
            | Self::UnterminatedQuote { line }
            | Self::UnexpectedClosingBrace { line }
            | Self::UnclosedScope { line, .. }
            | Self::UnknownOperator { line, .. }
            | Self::InvalidScopeOperator { line, .. }
            | Self::MissingValue { line, .. } => Some(*line),
            Self::File { source, .. } => source.line(),
            Self::FileNotFound { .. } | Self::Io { .. } => None,
        }
    }

    /// Stable identifier for tooling and logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEscape { .. } => "MARKUP_INVALID_ESCAPE",
            Self::UnterminatedQuote { .. } => "MARKUP_UNTERMINATED_QUOTE",
            Self::UnexpectedClosingBrace { .. } => "MARKUP_UNEXPECTED_CLOSING_BRACE",
            Self::UnclosedScope { .. } => "MARKUP_UNCLOSED_SCOPE",
            Self::UnknownOperator { .. } => "MARKUP_UNKNOWN_OPERATOR",
            Self::InvalidScopeOperator { .. } => "MARKUP_INVALID_SCOPE_OPERATOR",
            Self::MissingValue { .. } => "MARKUP_MISSING_VALUE",
            Self::FileNotFound { .. } => "MARKUP_FILE_NOT_FOUND",
            Self::Io { .. } => "MARKUP_IO",
            Self::File { source, .. } => source.error_code(),
        }
    }

    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            source: Box::new(self),
        }
    }
}
