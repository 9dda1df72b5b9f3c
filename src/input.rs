//! Bounded line reading for operator requests.
//!
//! A line may hold at most `max_line - 1` bytes before its `\n`; a `\r`
//! directly ahead of the `\n` is part of the terminator. Anything
//! longer is cut at the bound and the remainder of the line is consumed, so
//! the next read starts on a fresh line.

use std::fmt;
use std::io::{self, BufRead};

/// Reference bound, terminator included
pub const DEFAULT_MAX_LINE: usize = 256;

/// A requested file name, trimmed of its line terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    name: Vec<u8>,
}

impl Request {
    pub fn new(name: impl Into<Vec<u8>>) -> Self {
        Request { name: name.into() }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn is_blank(&self) -> bool {
        self.name.iter().all(u8::is_ascii_whitespace)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.name))
    }
}

/// One read from the operator
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    /// Terminated line within the bound
    Complete(Vec<u8>),
    /// Last line of the input, no terminator
    Unterminated(Vec<u8>),
    /// No terminator within the bound; `discarded` bytes were skipped
    Oversized { kept: Vec<u8>, discarded: usize },
    Eof,
}

enum Step {
    Complete,
    Oversized,
}

pub struct RequestReader<R> {
    inner: R,
    max_line: usize,
}

impl<R: BufRead> RequestReader<R> {
    /// `max_line` counts the terminator and must be at least 2
    pub fn new(inner: R, max_line: usize) -> Self {
        RequestReader {
            inner,
            max_line: max_line.max(2),
        }
    }

    pub fn read_line(&mut self) -> io::Result<Line> {
        let limit = self.max_line - 1;
        // One byte of slack for a `\r` ahead of the `\n`
        let cap = limit + 1;
        let mut buf = Vec::new();

        loop {
            let (used, step) = {
                let available = match self.inner.fill_buf() {
                    Ok(bytes) => bytes,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };

                if available.is_empty() {
                    if buf.is_empty() {
                        return Ok(Line::Eof);
                    }
                    let line = trim_cr(buf);
                    return Ok(if line.len() > limit {
                        oversized(line, limit, 0)
                    } else {
                        Line::Unterminated(line)
                    });
                }

                let room = cap - buf.len();
                // The terminator may sit one past the last buffered byte
                let window = &available[..available.len().min(room + 1)];

                if let Some(pos) = window.iter().position(|&b| b == b'\n') {
                    buf.extend_from_slice(&window[..pos]);
                    (pos + 1, Some(Step::Complete))
                } else if available.len() > room {
                    buf.extend_from_slice(&available[..room]);
                    (room, Some(Step::Oversized))
                } else {
                    buf.extend_from_slice(available);
                    (available.len(), None)
                }
            };
            self.inner.consume(used);

            match step {
                Some(Step::Complete) => {
                    let line = trim_cr(buf);
                    return Ok(if line.len() > limit {
                        oversized(line, limit, 0)
                    } else {
                        Line::Complete(line)
                    });
                }
                Some(Step::Oversized) => {
                    let skipped = self.skip_rest_of_line()?;
                    return Ok(oversized(buf, limit, skipped));
                }
                None => {}
            }
        }
    }

    /// Consume up to and including the next `\n`, returning the bytes skipped
    /// before it
    fn skip_rest_of_line(&mut self) -> io::Result<usize> {
        let mut skipped = 0;
        loop {
            let (used, done) = {
                let available = match self.inner.fill_buf() {
                    Ok(bytes) => bytes,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if available.is_empty() {
                    return Ok(skipped);
                }
                match available.iter().position(|&b| b == b'\n') {
                    Some(pos) => {
                        skipped += pos;
                        (pos + 1, true)
                    }
                    None => {
                        skipped += available.len();
                        (available.len(), false)
                    }
                }
            };
            self.inner.consume(used);
            if done {
                return Ok(skipped);
            }
        }
    }
}

/// Cut `line` to `limit` bytes; `skipped` bytes were already consumed past it
fn oversized(mut line: Vec<u8>, limit: usize, skipped: usize) -> Line {
    let discarded = line.len() - limit + skipped;
    line.truncate(limit);
    Line::Oversized {
        kept: line,
        discarded,
    }
}

fn trim_cr(mut line: Vec<u8>) -> Vec<u8> {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    line
}
