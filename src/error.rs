//! Error types for compression and decompression.
//!
//! Every failure is fatal to the operation in progress; nothing here is
//! retryable.

use std::io;

use thiserror::Error;

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, HuffmanError>;

#[derive(Error, Debug)]
pub enum HuffmanError {
    /// Reading the input or writing the output failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// The header of a compressed stream is malformed.
    #[error("malformed header: {0}")]
    Format(#[from] FormatError),

    /// The payload of a compressed stream could not be decoded.
    #[error("corrupt payload: {0}")]
    Decode(#[from] DecodeError),

    /// A byte to encode has no code, e.g. the source changed between passes.
    #[error("byte {0:#04x} has no code in the table")]
    UnknownSymbol(u8),

    /// A tree produced a code wider than the 64-bit code register.
    #[error("code length {length} exceeds the supported maximum of {max}")]
    CodeTooLong { length: usize, max: u8 },
}

/// Problems with the symbol table at the start of a compressed stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("stream ended inside the header")]
    UnexpectedEnd,

    #[error("header declares {0} entries")]
    BadEntryCount(usize),

    #[error("symbol {symbol} has code length {length}")]
    BadLength { symbol: u8, length: u8 },

    #[error("symbol {0} listed more than once")]
    DuplicateSymbol(u8),

    #[error("entries are not in ascending (length, symbol) order")]
    OutOfOrder,

    #[error("end-of-stream entry carries symbol {0}, expected 0")]
    BadEofMarker(u8),

    #[error("too many codes of length {length} for a prefix-free code")]
    OverSubscribed { length: u8 },
}

/// Problems found while matching payload bits against the code table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The bit stream ran out before the end-of-stream code was seen.
    #[error("stream truncated after {decoded} decoded bytes")]
    Truncated { decoded: usize },

    /// No code matches the pending bits.
    #[error("no code matches the bits ending at offset {bit_offset}")]
    InvalidCode { bit_offset: usize },
}

impl HuffmanError {
    /// True for errors caused by the compressed data rather than the environment.
    pub fn is_corrupt_input(&self) -> bool {
        matches!(self, HuffmanError::Format(_) | HuffmanError::Decode(_))
    }
}
