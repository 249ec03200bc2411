/*!
Error types shared by every decoding front end.

A decode either succeeds completely or yields exactly one [`Error`]: the
[`ErrorKind`] that stopped it and the byte offset where it was detected.
*/

use super::*;
use thiserror::Error;

/// The reason a decode failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("Not enough data for encoded value")]
    UnexpectedEndOfInput,

    #[error("Reserved additional information value {0}")]
    ReservedAdditionalInfo(u8),

    #[error("Integer outside the representable range")]
    IntegerOverflow,

    #[error("Text string is not valid UTF-8")]
    InvalidUtf8,

    #[error("Indefinite-length map has a key with no value")]
    TruncatedMapPair,

    #[error("Unsupported simple value {0}")]
    UnsupportedSimpleValue(u8),

    #[error("Nesting exceeds the maximum depth of {0}")]
    NestingTooDeep(usize),

    #[error("Break marker outside an indefinite-length item")]
    UnexpectedBreak,

    #[error("Trailing data cannot start a CBOR item")]
    TrailingGarbage,

    #[error("Chunked string contains an invalid chunk")]
    InvalidChunk,

    #[error("Indefinite-length items are not allowed")]
    IndefiniteLength,

    #[error("String length {0} exceeds the configured maximum")]
    StringTooLong(u64),

    #[error("Container length {0} exceeds the configured maximum")]
    TooManyItems(u64),

    #[error("Map contains a duplicate key")]
    DuplicateKey,
}

/// A decoding failure, annotated with the byte offset where it was detected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at offset {offset}")]
pub struct Error {
    pub kind: ErrorKind,
    pub offset: usize,
}

impl Error {
    pub fn new(kind: ErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Returned by [`decode_all`](crate::decode_all) when a sequence stops early.
///
/// `decoded` holds every top-level item that was complete before the
/// failing one, in input order.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error} after {} complete items", .decoded.len())]
pub struct SequenceError {
    pub decoded: Vec<Item>,
    #[source]
    pub error: Error,
}

impl SequenceError {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind
    }
}
