//! Prompt classification.
//!
//! The device never reports its state; it is inferred from the prompt at
//! the end of the most recent output. [`MarkerSet::classify`] is the only
//! place that mapping happens.

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

/// Console state inferred from the trailing prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceMarker {
    /// Login banner, waiting for a username.
    LoginBanner,
    /// Top-level operational CLI.
    Operational,
    /// OS shell.
    Shell,
    /// Configuration-editing mode.
    Config,
    /// Pre-boot loader.
    Loader,
    /// A yes/no question.
    Confirmation,
    /// Nothing recognizable.
    Unknown,
}

impl fmt::Display for DeviceMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceMarker::LoginBanner => "login banner",
            DeviceMarker::Operational => "operational prompt",
            DeviceMarker::Shell => "shell prompt",
            DeviceMarker::Config => "config prompt",
            DeviceMarker::Loader => "loader prompt",
            DeviceMarker::Confirmation => "confirmation prompt",
            DeviceMarker::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Ordered marker patterns.
///
/// Patterns are tried in insertion order against the last non-blank line
/// of the text; the first match wins. Order matters where prompts
/// overlap (`loader>` also looks like an operational prompt).
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    patterns: IndexMap<DeviceMarker, Regex>,
}

impl MarkerSet {
    /// Create an empty marker set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a marker pattern.
    pub fn with_marker(mut self, marker: DeviceMarker, pattern: &str) -> Result<Self, regex::Error> {
        self.patterns.insert(marker, Regex::new(pattern)?);
        Ok(self)
    }

    /// Classify console text by its trailing prompt.
    pub fn classify(&self, text: &str) -> DeviceMarker {
        let line = last_line(text);
        if line.is_empty() {
            return DeviceMarker::Unknown;
        }

        self.patterns
            .iter()
            .find(|(_, pattern)| pattern.is_match(line))
            .map(|(marker, _)| *marker)
            .unwrap_or(DeviceMarker::Unknown)
    }

    /// Check whether text ends at the given marker.
    pub fn is_at(&self, marker: DeviceMarker, text: &str) -> bool {
        self.classify(text) == marker
    }

    /// Get the pattern registered for a marker.
    pub fn pattern(&self, marker: DeviceMarker) -> Option<&Regex> {
        self.patterns.get(&marker)
    }

    /// Number of registered markers.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if no markers are registered.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// The last non-blank line of `text`, without surrounding line control.
pub fn last_line(text: &str) -> &str {
    text.trim_end()
        .rsplit('\n')
        .next()
        .unwrap_or_default()
        .trim_start_matches('\r')
}
