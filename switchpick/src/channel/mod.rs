//! Channel layer for console text handling.
//!
//! This module turns raw console bytes into text: ANSI stripping,
//! accumulation for multi-poll captures, and classification of the
//! trailing prompt into a [`DeviceMarker`].

mod buffer;
mod console;
mod patterns;

pub use buffer::PatternBuffer;
pub use console::ConsoleChannel;
pub use patterns::{DeviceMarker, MarkerSet, last_line};
