//! Turn a byte stream into logical lines.
//!
//! A [`LineSource`] strips CRLF, LF, or lone CR line endings and decodes
//! the surviving bytes through a fixed 8-bit-transparent charset, so raw
//! byte values (including anything above ASCII) survive into the line text
//! unchanged for later per-property charset handling. It does **not**
//! perform RFC 2425 continuation folding — that is entangled with the
//! active ENCODING and is handled by the value decoder instead, which
//! pulls further lines through [`LineSource::read_line`] /
//! [`LineSource::peek_line`] as needed.

use std::io::BufRead;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    inner: String,
    number: usize,
}

impl Line {
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn number(&self) -> usize {
        self.number
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "line {}: {}", self.number, self.inner)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A buffered line reader with a one-line lookahead.
///
/// `pending` distinguishes "no lookahead cached" (`None`) from "lookahead
/// is end-of-stream" (`Some(None)`) from "lookahead is a line"
/// (`Some(Some(line))`) — conflating the first two would make `peek_line`
/// re-read past end-of-stream on every call.
pub struct LineSource<R: BufRead> {
    reader: R,
    pending: Option<Option<Line>>,
    number: usize,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: None,
            number: 0,
        }
    }

    /// Consume and return the next line, or `None` at end of stream.
    pub fn read_line(&mut self) -> Result<Option<Line>, LineError> {
        if let Some(pending) = self.pending.take() {
            return Ok(pending);
        }
        self.next_line()
    }

    /// Return the next line without consuming it. A later `read_line`
    /// (or `peek_line`) returns the same line.
    pub fn peek_line(&mut self) -> Result<Option<&Line>, LineError> {
        if self.pending.is_none() {
            let line = self.next_line()?;
            self.pending = Some(line);
        }
        Ok(self.pending.as_ref().and_then(|line| line.as_ref()))
    }

    fn next_line(&mut self) -> Result<Option<Line>, LineError> {
        match read_raw_line(&mut self.reader)? {
            Some(bytes) => {
                self.number += 1;
                Ok(Some(Line {
                    inner: decode_latin1(&bytes),
                    number: self.number,
                }))
            }
            None => Ok(None),
        }
    }
}

/// Decode bytes through a fixed 8-bit-transparent charset: every byte maps
/// 1:1 to the Unicode scalar value of the same number (Latin-1), so no
/// byte sequence is ever rejected.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Read one logical line, splitting on CRLF, LF, or lone CR, and stripping
/// the terminator. Returns `None` only when the stream is exhausted with
/// nothing left to return (mirrors `Iterator::next` semantics for EOF).
fn read_raw_line<R: BufRead>(reader: &mut R) -> std::io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    let mut saw_any = false;

    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            break;
        }
        saw_any = true;

        match available.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(pos) => {
                let terminator = available[pos];
                buf.extend_from_slice(&available[..pos]);
                let mut consumed = pos + 1;
                if terminator == b'\r' {
                    if pos + 1 < available.len() {
                        if available[pos + 1] == b'\n' {
                            consumed += 1;
                        }
                        reader.consume(consumed);
                    } else {
                        reader.consume(consumed);
                        let more = reader.fill_buf()?;
                        if more.first() == Some(&b'\n') {
                            reader.consume(1);
                        }
                    }
                } else {
                    reader.consume(consumed);
                }
                return Ok(Some(buf));
            }
            None => {
                buf.extend_from_slice(available);
                let len = available.len();
                reader.consume(len);
            }
        }
    }

    if saw_any { Ok(Some(buf)) } else { Ok(None) }
}
