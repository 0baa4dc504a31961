//! Serial transport layer.
//!
//! This module owns the physical console line: port discovery, reads of
//! whatever is currently buffered, and verbatim writes. Nothing above this
//! layer knows it is talking to a serial port.

pub mod config;
#[cfg(test)]
pub(crate) mod scripted;
mod serial;

pub use config::{SerialConfig, default_candidates};
pub use serial::{SerialTransport, discover};

use std::future::Future;

use crate::error::Result;

/// A half-duplex byte line to a device console.
pub trait Transport: Send {
    /// Return the bytes buffered right now, possibly none.
    ///
    /// Must not wait for more data to arrive.
    fn read_available(&mut self) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Transmit bytes verbatim.
    fn write_all(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;
}
