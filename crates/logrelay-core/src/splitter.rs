//! Newline splitting over arbitrarily chunked input.
//!
//! Peers may send any chunking: one byte at a time, several lines per read,
//! or a line split across many reads. The splitter buffers bytes until a
//! `\n` arrives and only then yields the line, lossily decoded as UTF-8.

use crate::error::RelayError;

/// Accumulates bytes from one connection and yields complete lines.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
    /// Prefix of `pending` already searched for `\n` (and known to hold none).
    scanned: usize,
    max_line_bytes: Option<usize>,
}

impl LineSplitter {
    /// Create a splitter with no limit on unterminated bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a splitter that rejects unterminated lines longer than `limit` bytes.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            max_line_bytes: limit,
            ..Self::default()
        }
    }

    /// Feed a chunk and return every line it completed, in arrival order.
    ///
    /// Each line has its `\n` and one trailing `\r` removed. Invalid UTF-8 is
    /// replaced with U+FFFD. Only the newly appended bytes are searched, so a
    /// long unterminated line costs time linear in its length.
    ///
    /// The second value is [`RelayError::LineTooLong`] if, after extracting
    /// complete lines, the remaining unterminated bytes exceed the configured
    /// limit. Lines completed by this chunk are returned either way.
    pub fn push(&mut self, chunk: &[u8]) -> (Vec<String>, Option<RelayError>) {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        let mut search_from = self.scanned;
        while let Some(offset) = self.pending[search_from..].iter().position(|&b| b == b'\n') {
            let end = search_from + offset;
            let mut line = &self.pending[start..end];
            if line.last() == Some(&b'\r') {
                line = &line[..line.len() - 1];
            }
            lines.push(String::from_utf8_lossy(line).into_owned());
            start = end + 1;
            search_from = start;
        }
        self.pending.drain(..start);
        self.scanned = self.pending.len();

        let overflow = match self.max_line_bytes {
            Some(limit) if self.pending.len() > limit => Some(RelayError::LineTooLong { limit }),
            _ => None,
        };
        (lines, overflow)
    }

    /// Bytes received since the last newline.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop any unterminated bytes. Returns how many were discarded.
    pub fn discard(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        self.scanned = 0;
        n
    }
}
