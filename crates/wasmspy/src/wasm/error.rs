//! Parse-time error taxonomy.
//!
//! Every error produced while decoding the binary format carries the
//! absolute file offset of the byte where the failing read started, so a
//! consumer can point at the exact position in a hex view.

use thiserror::Error;

/// What went wrong, independent of where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidMagic,
    InvalidVersion,
    Truncated,
    InvalidLeb128,
    InvalidOpcode,
    InvalidSection,
    InvalidIndex,
    SectionOverflow,
}

/// A positioned parse error, optionally chained to the lower-level error
/// that triggered it.
#[derive(Debug, Error)]
#[error("{message} at offset 0x{offset:x}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub offset: u64,
    #[source]
    pub cause: Option<Box<ParseError>>,
}

impl ParseError {
    pub fn new(kind: ErrorKind, offset: u64, message: impl Into<String>) -> ParseError {
        ParseError {
            kind,
            message: message.into(),
            offset,
            cause: None,
        }
    }

    pub fn with_cause(
        kind: ErrorKind,
        offset: u64,
        message: impl Into<String>,
        cause: ParseError,
    ) -> ParseError {
        ParseError {
            kind,
            message: message.into(),
            offset,
            cause: Some(Box::new(cause)),
        }
    }

    /// Wrap this error with a section-level message, keeping the original
    /// as the cause. The outer offset points at the failing byte, not the
    /// section start, so hex-view navigation stays precise.
    pub fn in_section(self, kind: ErrorKind, message: impl Into<String>) -> ParseError {
        let offset = self.offset;
        ParseError::with_cause(kind, offset, message, self)
    }
}
