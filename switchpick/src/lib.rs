//! # switchpick
//!
//! Prompt-driven serial console automation for Juniper EX switches.
//!
//! switchpick drives a switch over its console port the way a technician
//! would: read until a known prompt appears, send the next line, repeat.
//! It is meant for bench provisioning of fresh or factory-reset devices
//! where there is no network management yet.
//!
//! ## Features
//!
//! - Async serial transport via tokio-serial, with port discovery
//! - ANSI-stripping pattern buffer with tail-only prompt classification
//! - Login, CLI, shell, configuration and loader navigation
//! - Terminal configuration load with commit verification
//! - Provisioning records (model, serial, MAC, management address)
//! - Log collection to USB, configuration wipe, power off and reboot
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use switchpick::config::{ConfigPayload, Credentials};
//! use switchpick::driver::SessionBuilder;
//! use switchpick::procedure::load_config;
//! use switchpick::provisioning::ProvisioningLog;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), switchpick::Error> {
//!     let mut session = SessionBuilder::new()
//!         .credentials(Credentials::new("admin", "secret"))
//!         .port("/dev/ttyUSB0")
//!         .connect()
//!         .await?;
//!
//!     let payload = ConfigPayload::from_path("configs/prime.config".as_ref())?;
//!     let log = ProvisioningLog::new("records/provisioning.csv");
//!
//!     let record = load_config(&mut session, &payload, &log).await?;
//!     println!("{}", record.to_line());
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod platform;
pub mod procedure;
pub mod provisioning;
pub mod transport;

// Re-export main types for convenience
pub use channel::DeviceMarker;
pub use config::{ConfigPayload, Credentials, LoadFormat};
pub use driver::{CommandStep, Session, SessionBuilder};
pub use error::{Error, Result};
pub use platform::DeviceProfile;
pub use provisioning::{ProvisioningLog, ProvisioningRecord};
pub use transport::{SerialConfig, SerialTransport};
