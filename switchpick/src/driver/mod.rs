//! Prompt-driven automation engine.
//!
//! The driver layer turns a console channel into a [`Session`]: the
//! wait-for-condition/respond loop, state navigation built on top of it,
//! and the verification patterns procedures rely on.

mod builder;
mod command;
mod navigation;
mod session;
mod timing;
mod verify;

pub use builder::SessionBuilder;
pub use command::{CommandStep, Condition};
pub use navigation::{LoaderOutcome, MAX_PASSWORD_PROMPTS};
pub use session::Session;
pub(crate) use session::pause;
pub use timing::{RetryPolicies, RetryPolicy, Timing};
pub use verify::RaceOutcome;

#[cfg(test)]
pub(crate) mod test_support {
    use super::{RetryPolicies, Session, Timing};
    use crate::config::Credentials;
    use crate::platform::DeviceProfile;
    use crate::transport::scripted::ScriptedTransport;

    /// A session with no delays and bounded waits, logged in as
    /// `admin`/`secret`.
    pub(crate) fn session(device: ScriptedTransport) -> Session<ScriptedTransport> {
        Session::new(
            device,
            Credentials::new("admin", "secret"),
            DeviceProfile::default(),
            Timing::immediate(20),
            RetryPolicies::bounded(10),
        )
    }
}
