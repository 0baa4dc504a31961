//! Error types for switchpick.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for switchpick operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Serial line errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Engine and procedure errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Local input errors (credentials, config payloads, records)
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Device profile errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl Error {
    /// Whether this error aborts a multi-step device procedure.
    ///
    /// Local input problems only abort the current action; everything
    /// observed on the device side ends the whole procedure.
    pub fn is_fatal_to_procedure(&self) -> bool {
        !matches!(self, Error::Config(_))
    }
}

/// Serial transport errors (port discovery, reads, writes).
#[derive(Error, Debug)]
pub enum TransportError {
    /// None of the candidate ports could be opened
    #[error("No console port available after {cycles} discovery cycle(s)")]
    NoPortAvailable { cycles: u32 },

    /// Serial driver error
    #[error("Serial error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// A single read exceeded the configured read timeout
    #[error("Read timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Driver layer errors (navigation, verification, procedures).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Device rejected the username or password
    #[error("Authentication failed for user '{user}': {reason}")]
    AuthenticationFailed { user: String, reason: AuthRejection },

    /// Mounting removable storage was refused for lack of privilege
    #[error("Insufficient permission to mount removable storage")]
    MountPermissionDenied,

    /// Commit reported failure; the device needs manual inspection
    #[error("Commit failed - manual troubleshooting required")]
    CommitFailed,

    /// The terminal load was rejected by the device
    #[error("Configuration load failed: {message}")]
    LoadFailed { message: String },

    /// The line produced no output at all
    #[error("No response from device after {attempts} probe(s) - check the console cable")]
    NoResponse { attempts: u32 },

    /// A bounded retry loop ran out of attempts
    #[error("'{operation}' did not converge after {attempts} attempt(s)")]
    RetriesExhausted { operation: String, attempts: u32 },

    /// The loader window was missed and the device booted to login
    #[error("Reached the login prompt instead of the loader - power cycle and retry")]
    LoaderMissed,

    /// The operator interrupted the running procedure
    #[error("Procedure interrupted - verify device state manually")]
    Interrupted,
}

/// Which credential the device rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// The login prompt came back before a password was requested
    Username,
    /// The device reported the login as incorrect
    Password,
}

impl std::fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthRejection::Username => write!(f, "wrong username, please update your credentials"),
            AuthRejection::Password => write!(f, "wrong password, please update your credentials"),
        }
    }
}

/// Local input errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Payload file has no content
    #[error("No data contained in {0}")]
    EmptyPayload(PathBuf),

    /// Payload extension does not select a load format
    #[error("Unsupported configuration file type: {0}")]
    UnsupportedFormat(PathBuf),

    /// Provisioning log does not exist yet
    #[error("Provisioning log not found: {0}")]
    LogMissing(PathBuf),
}

/// Device profile errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Invalid marker pattern
    #[error("Invalid marker pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Result type alias using switchpick's Error.
pub type Result<T> = std::result::Result<T, Error>;
