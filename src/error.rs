use nom::error::{ErrorKind, ParseError};
use std::fmt;
use std::io;

/// Errors raised while reading a log or decoding a payload
///
/// Content problems inside a log (truncated blocks, unknown lines, missing counterparts)
/// are never errors: they become omitted records or unmatched entries instead.
#[derive(Debug)]
pub enum LogError {
    /// No more lines are available
    Eof,
    /// More data is needed to complete the current line
    Incomplete(usize),
    /// A single line does not fit in the buffer, even after growing it
    BufferTooSmall,
    /// The input could not be opened or read
    Io(io::Error),
    /// A payload contains a non-hex character or an odd number of digits.
    /// The value is the offset of the offending character, or the length for odd input.
    InvalidHex(usize),

    NomError(ErrorKind),
}

impl LogError {
    /// Returns true if the error only signals a condition handled by refilling the reader
    pub fn is_incomplete(&self) -> bool {
        matches!(self, LogError::Incomplete(_))
    }
}

impl<I> ParseError<I> for LogError {
    fn from_error_kind(_input: I, kind: ErrorKind) -> Self {
        LogError::NomError(kind)
    }
    fn append(_input: I, kind: ErrorKind, _other: Self) -> Self {
        LogError::NomError(kind)
    }
}

impl From<io::Error> for LogError {
    fn from(e: io::Error) -> Self {
        LogError::Io(e)
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LogError::Eof => write!(f, "End of log"),
            LogError::Incomplete(n) => write!(f, "Incomplete read: {}", n),
            LogError::BufferTooSmall => write!(f, "Line too long for read buffer"),
            LogError::Io(e) => write!(f, "I/O error: {}", e),
            LogError::InvalidHex(pos) => write!(f, "Invalid hex payload at offset {}", pos),
            LogError::NomError(kind) => write!(f, "Internal parser error {:?}", kind),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogError::Io(e) => Some(e),
            _ => None,
        }
    }
}
