//! The console session.

use std::time::Duration;

use crate::channel::{ConsoleChannel, DeviceMarker};
use crate::config::Credentials;
use crate::platform::DeviceProfile;
use crate::transport::Transport;

use super::timing::{RetryPolicies, Timing};

/// One logical session on one console line.
///
/// The session owns the transport, so holding `&mut Session` is the only
/// way to talk to the device: there is never a second writer. Every
/// navigation, verification and procedure call takes the session
/// explicitly.
///
/// There is no "current state" field. The device can change state on its
/// own (auto-update, idle timeouts); state is re-derived from the prompt on
/// every read.
pub struct Session<T> {
    /// Console channel over the transport.
    pub(crate) channel: ConsoleChannel<T>,

    /// Credentials used for login and root seeding.
    pub(crate) credentials: Credentials,

    /// Device vocabulary.
    pub(crate) profile: DeviceProfile,

    /// Poll intervals and settle times.
    pub(crate) timing: Timing,

    /// Retry policies for self-retrying loops.
    pub(crate) retries: RetryPolicies,
}

impl<T: Transport> Session<T> {
    /// Create a session over an open transport.
    pub fn new(
        transport: T,
        credentials: Credentials,
        profile: DeviceProfile,
        timing: Timing,
        retries: RetryPolicies,
    ) -> Self {
        Self {
            channel: ConsoleChannel::new(transport),
            credentials,
            profile,
            timing,
            retries,
        }
    }

    /// Current credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Change credentials at runtime. Nothing is persisted.
    pub fn credentials_mut(&mut self) -> &mut Credentials {
        &mut self.credentials
    }

    /// The device profile in use.
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Timing configuration.
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Retry policies.
    pub fn retries(&self) -> &RetryPolicies {
        &self.retries
    }

    /// Get a mutable reference to the channel.
    pub fn channel_mut(&mut self) -> &mut ConsoleChannel<T> {
        &mut self.channel
    }

    /// Classify text with the session's profile.
    pub fn classify(&self, text: &str) -> DeviceMarker {
        self.profile.classify(text)
    }

    /// Drop any partially accumulated output.
    ///
    /// Called after an interrupted procedure; the next read starts from a
    /// clean buffer.
    pub fn reset(&mut self) {
        self.channel.clear();
    }

    /// Consume the session, returning the transport.
    pub fn into_transport(self) -> T {
        self.channel.into_transport()
    }
}

/// Sleep for `duration` (no-op when zero).
pub(crate) async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
