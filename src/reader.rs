use crate::error::LogError;
use circular::Buffer;
use nom::bytes::streaming::{tag, take_until};
use nom::sequence::terminated;
use nom::{IResult, Offset};
use std::borrow::Cow;
use std::io::Read;

/// Default capacity of the line buffer
pub const DEFAULT_CAPACITY: usize = 65536;

/// Parsing iterator over log lines (streaming version)
///
/// This reader is a streaming parser based on a circular buffer, which means memory
/// usage is bounded by the longest line, and that it can be used to scan logs much larger
/// than memory. It creates an abstraction over any input providing the `Read` trait, and
/// takes care of managing the circular buffer to provide an iterator-like interface.
///
/// Lines are returned without their terminator (`\n` or `\r\n`). Invalid UTF-8 sequences
/// are replaced with `U+FFFD`. A last line without terminator is returned once the
/// underlying reader is exhausted.
///
/// A line must fit in the buffer. If it does not, `next` returns
/// [`LogError::BufferTooSmall`] and the caller can [`grow`](LineReader::grow) the buffer.
///
/// ## Example
///
/// ```rust
/// use rpc_log_parser::{LineReader, LogError};
///
/// let log = b"first\nsecond\r\nthird";
/// let mut reader = LineReader::new(1024, &log[..]);
/// let mut lines = Vec::new();
/// loop {
///     match reader.next() {
///         Ok((offset, line)) => {
///             lines.push(line.into_owned());
///             reader.consume(offset);
///         }
///         Err(LogError::Eof) => break,
///         Err(LogError::Incomplete(_)) => {
///             reader.refill().unwrap();
///         }
///         Err(e) => panic!("error while reading: {:?}", e),
///     }
/// }
/// assert_eq!(lines, ["first", "second", "third"]);
/// ```
pub struct LineReader<R>
where
    R: Read,
{
    reader: R,
    buffer: Buffer,
    consumed: usize,
    reader_exhausted: bool,
}

fn parse_line(i: &[u8]) -> IResult<&[u8], &[u8], LogError> {
    terminated(take_until("\n"), tag("\n"))(i)
}

fn decode_line(line: &[u8]) -> Cow<str> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line)
}

impl<R> LineReader<R>
where
    R: Read,
{
    /// Creates a new `LineReader<R>` with the provided buffer capacity.
    pub fn new(capacity: usize, reader: R) -> LineReader<R> {
        Self::from_buffer(Buffer::with_capacity(capacity), reader)
    }

    /// Creates a new `LineReader<R>` using the provided `Buffer`.
    pub fn from_buffer(buffer: Buffer, reader: R) -> LineReader<R> {
        LineReader {
            reader,
            buffer,
            consumed: 0,
            reader_exhausted: false,
        }
    }

    /// Get the next line
    ///
    /// Returns the line and the number of bytes to [`consume`](LineReader::consume) to
    /// move past it. Calling `next` again without consuming returns the same line.
    pub fn next(&mut self) -> Result<(usize, Cow<str>), LogError> {
        if self.buffer.available_data() == 0 && self.reader_exhausted {
            return Err(LogError::Eof);
        }
        let data = self.buffer.data();
        match parse_line(data) {
            Ok((rem, line)) => {
                let offset = data.offset(rem);
                Ok((offset, decode_line(line)))
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e),
            Err(nom::Err::Incomplete(_)) => {
                if self.reader_exhausted {
                    // unterminated last line
                    Ok((data.len(), decode_line(data)))
                } else if self.buffer.available_data() >= self.buffer.capacity() {
                    Err(LogError::BufferTooSmall)
                } else {
                    Err(LogError::Incomplete(0))
                }
            }
        }
    }

    /// Consume data, and shift buffer if needed.
    pub fn consume(&mut self, offset: usize) {
        self.consumed += offset;
        self.buffer.consume(offset);
    }

    /// Total number of bytes consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Refill the internal buffer, shifting it if necessary.
    pub fn refill(&mut self) -> Result<(), LogError> {
        self.buffer.shift();
        let space = self.buffer.space();
        // check if available space is empty, so we can distinguish
        // a read() returning 0 because of EOF or because we requested 0
        if space.is_empty() {
            return Ok(());
        }
        let sz = self.reader.read(space).map_err(LogError::Io)?;
        self.reader_exhausted = sz == 0;
        self.buffer.fill(sz);
        Ok(())
    }

    /// Current capacity of the buffer
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Grow size of circular buffer to `new_size`. Returns false if the buffer did not grow.
    pub fn grow(&mut self, new_size: usize) -> bool {
        self.buffer.grow(new_size)
    }

    /// Returns true if the underlying reader returned end of file
    pub fn reader_exhausted(&self) -> bool {
        self.reader_exhausted
    }
}
