use std::io;
use thiserror::Error;

/// Error type shared by all alignment report parsers.
///
/// A clean end of the input stream is never an error: the parsers simply
/// stop iterating. Every variant below aborts the parse session; no
/// resynchronization is attempted and no partial record is yielded.
#[derive(Error, Debug)]
pub enum ParserError {
    /// Input ended while a specific construct was still expected.
    #[error("{context} at line {line}")]
    UnexpectedEof { line: u64, context: String },

    /// A line does not match the grammar expected at the current state.
    #[error("{message} at line {line}")]
    Syntax { line: u64, message: String },

    /// A line parses but violates a semantic invariant (ADB format only).
    #[error("{message} at line {line}")]
    Validation { line: u64, message: String },

    /// The input contradicts the documented behavior of the producing tool
    /// itself. Reported with both conflicting values; not an ordinary
    /// malformed-input error.
    #[error("{message} at line {line}")]
    FormatViolation { line: u64, message: String },

    /// IO error while reading the underlying stream.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ParserError {
    pub(crate) fn syntax(line: u64, message: impl Into<String>) -> Self {
        ParserError::Syntax {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn validation(line: u64, message: impl Into<String>) -> Self {
        ParserError::Validation {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn format_violation(line: u64, message: impl Into<String>) -> Self {
        ParserError::FormatViolation {
            line,
            message: message.into(),
        }
    }

    /// The 1-based line number the error was raised at, if any.
    pub fn line(&self) -> Option<u64> {
        match self {
            ParserError::UnexpectedEof { line, .. }
            | ParserError::Syntax { line, .. }
            | ParserError::Validation { line, .. }
            | ParserError::FormatViolation { line, .. } => Some(*line),
            ParserError::Io(_) => None,
        }
    }
}

/// Result type alias for alnkit-io operations.
pub type Result<T> = std::result::Result<T, ParserError>;
