//! Operator credentials.

use std::fmt;
use std::path::Path;

use log::{info, warn};
use secrecy::{ExposeSecret, SecretString};

/// Default username when no credential file can be read.
pub const DEFAULT_USERNAME: &str = "root";

/// Login credentials plus the pre-hashed root password.
///
/// The hash seeds root authentication on a factory-default switch, which
/// refuses to commit any configuration until a root password exists.
pub struct Credentials {
    /// Login name.
    pub username: String,

    /// Interactive password.
    password: SecretString,

    /// Pre-hashed root password (may be empty).
    root_hash: SecretString,
}

impl Credentials {
    /// Create credentials without a root hash.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            root_hash: SecretString::from(String::new()),
        }
    }

    /// Set the pre-hashed root password.
    pub fn with_root_hash(mut self, hash: impl Into<String>) -> Self {
        self.root_hash = SecretString::from(hash.into());
        self
    }

    /// Replace username and password, keeping the root hash.
    pub fn update(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.username = username.into();
        self.password = SecretString::from(password.into());
    }

    /// The interactive password.
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// The root hash, if one is loaded.
    pub fn root_hash(&self) -> Option<&str> {
        let hash = self.root_hash.expose_secret();
        (!hash.is_empty()).then_some(hash)
    }

    /// Password rendered as asterisks for status lines.
    pub fn masked_password(&self) -> String {
        "*".repeat(self.password().chars().count())
    }

    /// Parse the credential file format.
    ///
    /// One value per line in fixed order (username, password, root hash),
    /// each line being `label value`. A line without a value yields an
    /// empty string. Fewer than three lines is malformed.
    pub fn parse(text: &str) -> Option<Self> {
        let values: Vec<&str> = text
            .lines()
            .map(|line| line.split_whitespace().nth(1).unwrap_or(""))
            .collect();

        match values.as_slice() {
            [username, password, root_hash, ..] => {
                Some(Self::new(*username, *password).with_root_hash(*root_hash))
            }
            _ => None,
        }
    }

    /// Load credentials from a file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match Self::parse(&text) {
                Some(credentials) => {
                    info!("Auto-loading credentials: {}", path.display());
                    credentials
                }
                None => {
                    warn!("Malformed credential file {}, loading defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                warn!(
                    "Could not locate credentials ({}: {}), loading defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, "")
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self::new(self.username.clone(), self.password())
            .with_root_hash(self.root_hash().unwrap_or_default())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.masked_password())
            .field("root_hash_loaded", &self.root_hash().is_some())
            .finish()
    }
}
