//! Console channel over a transport.

use log::{debug, trace};

use super::buffer::PatternBuffer;
use crate::error::Result;
use crate::transport::Transport;

/// Console channel for a line-mode device session.
///
/// Wraps the transport and keeps a stripped copy of everything received
/// since the last [`clear`](Self::clear), so callers can both look at the
/// latest poll and at accumulated output.
pub struct ConsoleChannel<T> {
    /// The underlying line.
    transport: T,

    /// Pattern buffer for accumulating output.
    buffer: PatternBuffer,
}

impl<T: Transport> ConsoleChannel<T> {
    /// Create a new console channel.
    pub fn new(transport: T) -> Self {
        Self::with_search_depth(transport, 1000)
    }

    /// Create a channel with a custom tail search depth.
    pub fn with_search_depth(transport: T, search_depth: usize) -> Self {
        Self {
            transport,
            buffer: PatternBuffer::new(search_depth),
        }
    }

    /// Read whatever is buffered on the line.
    ///
    /// Returns only the text received by this call (possibly empty); it is
    /// also appended to the accumulated buffer.
    pub async fn poll(&mut self) -> Result<String> {
        let raw = self.transport.read_available().await?;
        if raw.is_empty() {
            return Ok(String::new());
        }

        let added = self.buffer.extend(&raw);
        let fresh = &self.buffer.as_slice()[self.buffer.len().saturating_sub(added)..];
        let text = String::from_utf8_lossy(fresh).into_owned();

        debug!("rx: {:?}", text);
        Ok(text)
    }

    /// Send a line followed by a newline.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        trace!("tx: {:?}", line);
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        self.transport.write_all(&data).await
    }

    /// Send a line without logging its content.
    pub async fn send_hidden_line(&mut self, line: &str) -> Result<()> {
        trace!("tx: <hidden, {} bytes>", line.len());
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        self.transport.write_all(&data).await
    }

    /// Send bytes exactly as given.
    pub async fn send_raw(&mut self, data: &[u8]) -> Result<()> {
        trace!("tx raw: {:?}", String::from_utf8_lossy(data));
        self.transport.write_all(data).await
    }

    /// Send a neutral newline to make an idle console repaint its prompt.
    pub async fn probe(&mut self) -> Result<()> {
        self.transport.write_all(b"\n").await
    }

    /// Get a reference to the buffer.
    pub fn buffer(&self) -> &PatternBuffer {
        &self.buffer
    }

    /// Accumulated output as text.
    pub fn accumulated(&self) -> String {
        self.buffer.as_str_lossy().into_owned()
    }

    /// Clear the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Take the buffer contents.
    pub fn take_buffer(&mut self) -> Vec<u8> {
        self.buffer.take()
    }

    /// Get a mutable reference to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the channel, returning the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}
