//! Pattern buffer with ANSI stripping and tail search.
//!
//! Captures of long command output (chassis inventories, support dumps)
//! only ever need the tail searched for the returning prompt, so searches
//! look at the last `search_depth` bytes.

use std::borrow::Cow;
use std::fmt;

use bytes::{Buf, BytesMut};
use memchr::memmem;
use vte::{Parser, Perform};

/// Upper bound on retained output. Older bytes are discarded first.
const MAX_RETAINED: usize = 64 * 1024;

/// Buffer for accumulating console output and searching its tail.
pub struct PatternBuffer {
    /// The accumulated output, escape sequences removed.
    buffer: BytesMut,

    /// How many bytes from the end to search.
    search_depth: usize,

    /// Escape parser, kept across chunks so split sequences still strip.
    parser: Parser,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            search_depth,
            parser: Parser::new(),
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    ///
    /// Returns the number of bytes appended after stripping.
    pub fn extend(&mut self, data: &[u8]) -> usize {
        let mut sink = Printable::default();
        self.parser.advance(&mut sink, data);
        self.buffer.extend_from_slice(&sink.out);

        if self.buffer.len() > MAX_RETAINED {
            let excess = self.buffer.len() - MAX_RETAINED;
            self.buffer.advance(excess);
        }

        sink.out.len()
    }

    /// The last `search_depth` bytes.
    pub fn tail(&self) -> &[u8] {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        &self.buffer[start..]
    }

    /// Check if the tail contains a literal.
    pub fn tail_contains(&self, needle: &str) -> bool {
        memmem::find(self.tail(), needle.as_bytes()).is_some()
    }

    /// Check if anywhere in the buffer contains a literal.
    pub fn contains(&self, needle: &str) -> bool {
        memmem::find(&self.buffer, needle.as_bytes()).is_some()
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        self.buffer.split().to_vec()
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer contents as a string (lossy UTF-8 conversion).
    pub fn as_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.parser = Parser::new();
    }

    /// Get the search depth setting.
    pub fn search_depth(&self) -> usize {
        self.search_depth
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl fmt::Debug for PatternBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("len", &self.buffer.len())
            .field("search_depth", &self.search_depth)
            .finish()
    }
}

/// Collects printable output and line control, drops everything else.
#[derive(Default)]
struct Printable {
    out: Vec<u8>,
}

impl Perform for Printable {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.out.push(byte);
        }
    }
}
