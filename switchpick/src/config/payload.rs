//! Configuration payloads.

use std::path::Path;

use crate::error::ConfigError;

/// How a payload is applied on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFormat {
    /// Hierarchical stanza text, replacing the whole configuration.
    Stanza,
    /// Flat `set` commands, merged line by line.
    Set,
}

impl LoadFormat {
    /// Pick the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "config" | "conf" => Some(LoadFormat::Stanza),
            "txt" | "set" => Some(LoadFormat::Set),
            _ => None,
        }
    }
}

/// A configuration ready to be typed into the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPayload {
    /// Name recorded in the provisioning log (the file stem).
    pub name: String,

    /// Load format.
    pub format: LoadFormat,

    /// Text to send, already normalized for its format.
    body: String,
}

impl ConfigPayload {
    /// Create a payload from text.
    ///
    /// `Set` payloads are usually pasted from elsewhere with literal `\n`
    /// escapes; those are turned into real line breaks. `Stanza` text is
    /// kept verbatim.
    pub fn new(name: impl Into<String>, format: LoadFormat, text: &str) -> Self {
        let body = match format {
            LoadFormat::Stanza => text.to_string(),
            LoadFormat::Set => text.replace("\\n", "\n"),
        };
        Self {
            name: name.into(),
            format,
            body,
        }
    }

    /// Read a payload file, choosing the format by extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(LoadFormat::from_extension)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if text.trim().is_empty() {
            return Err(ConfigError::EmptyPayload(path.to_path_buf()));
        }

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(name, format, &text))
    }

    /// The normalized payload text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Payload lines in send order, line control stripped.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.body.lines().map(|line| line.trim_end_matches('\r'))
    }
}
