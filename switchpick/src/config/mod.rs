//! Local inputs: credentials, configuration payloads and file locations.
//!
//! Everything here is recoverable. A missing credential file degrades to
//! defaults; a bad payload aborts only the action that asked for it.

mod credentials;
mod paths;
mod payload;

pub use credentials::Credentials;
pub use paths::AppPaths;
pub use payload::{ConfigPayload, LoadFormat};
