//! Builder for creating console sessions.

use log::info;

use super::session::Session;
use super::timing::{RetryPolicies, Timing};
use crate::config::Credentials;
use crate::error::Result;
use crate::platform::DeviceProfile;
use crate::transport::{SerialConfig, SerialTransport, Transport};

/// Builder for constructing sessions.
///
/// # Example
///
/// ```rust,no_run
/// use switchpick::config::Credentials;
/// use switchpick::driver::SessionBuilder;
///
/// # async fn example() -> Result<(), switchpick::Error> {
/// let mut session = SessionBuilder::new()
///     .credentials(Credentials::new("root", "Juniper1"))
///     .port("/dev/ttyUSB0")
///     .connect()
///     .await?;
/// session.reach_login().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    credentials: Credentials,
    profile: DeviceProfile,
    timing: Timing,
    retries: RetryPolicies,
    serial: SerialConfig,
}

impl SessionBuilder {
    /// Create a builder with production defaults and the JUNOS profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the credentials.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the device profile.
    pub fn profile(mut self, profile: DeviceProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set timing.
    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Set retry policies.
    pub fn retries(mut self, retries: RetryPolicies) -> Self {
        self.retries = retries;
        self
    }

    /// Set the serial line configuration.
    pub fn serial(mut self, serial: SerialConfig) -> Self {
        self.serial = serial;
        self
    }

    /// Use a single port instead of discovery.
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.serial = self.serial.with_port(port);
        self
    }

    /// Discover a console port and open the session on it.
    ///
    /// Discovery cycles the candidate list until a port opens, which by
    /// default means waiting until a cable is plugged in.
    pub async fn connect(self) -> Result<Session<SerialTransport>> {
        let transport = SerialTransport::connect(&self.serial).await?;
        info!("Connected on {}", transport.name());
        Ok(self.build(transport))
    }

    /// Build a session over an already open transport.
    pub fn build<T: Transport>(self, transport: T) -> Session<T> {
        Session::new(
            transport,
            self.credentials,
            self.profile,
            self.timing,
            self.retries,
        )
    }
}
