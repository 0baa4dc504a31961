//! Provisioning records.
//!
//! After a configuration load the switch is asked who it is (chassis
//! hardware, management MAC and address) and the answers are appended to
//! a local log. Extraction never fails the load: anything that cannot be
//! parsed is recorded as [`SENTINEL`].

mod parser;
mod records;

pub use records::{HEADER, ProvisioningLog, format_table};
pub use parser::{parse_chassis, parse_mac, parse_inet};

use log::{info, warn};
use serde::Serialize;

use crate::driver::Session;
use crate::error::Result;
use crate::transport::Transport;

/// Placeholder for a field that could not be extracted.
pub const SENTINEL: &str = "N/A";

/// Identity and network details of a freshly configured switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisioningRecord {
    pub model: String,
    pub serial: String,
    pub config_name: String,
    pub mac: String,
    pub ip: String,
    pub subnet: String,
}

impl ProvisioningRecord {
    /// Build a record from the three query outputs.
    pub fn from_outputs(config_name: &str, chassis: &str, interface: &str, address: &str) -> Self {
        let (serial, model) = parse_chassis(chassis);
        let mac = parse_mac(interface);
        let (ip, subnet) = parse_inet(address);

        let or_sentinel = |field: Option<String>| field.unwrap_or_else(|| SENTINEL.to_string());
        Self {
            model: or_sentinel(model),
            serial: or_sentinel(serial),
            config_name: config_name.to_string(),
            mac: or_sentinel(mac),
            ip: or_sentinel(ip),
            subnet: or_sentinel(subnet),
        }
    }

    /// The record as one log line.
    pub fn to_line(&self) -> String {
        [
            &self.model,
            &self.serial,
            &self.config_name,
            &self.mac,
            &self.ip,
            &self.subnet,
        ]
        .map(String::as_str)
        .join(", ")
    }

    /// Whether any field fell back to the sentinel.
    pub fn is_partial(&self) -> bool {
        [&self.model, &self.serial, &self.mac, &self.ip, &self.subnet]
            .iter()
            .any(|field| field.as_str() == SENTINEL)
    }
}

/// Query the switch from the operational prompt and build its record.
pub async fn extract<T: Transport>(
    session: &mut Session<T>,
    config_name: &str,
) -> Result<ProvisioningRecord> {
    info!("Gathering provisioning data...");
    let queries = session.profile().queries.clone();

    let chassis = session.capture(&queries.chassis).await?;
    let interface = session.capture(&queries.interface).await?;
    let address = session.capture(&queries.address).await?;

    let record = ProvisioningRecord::from_outputs(config_name, &chassis, &interface, &address);
    if record.is_partial() {
        warn!("Some provisioning fields could not be read: {}", record.to_line());
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::test_support::session;
    use crate::transport::scripted::ScriptedTransport;

    const PROMPT: &str = "\r\n{master:0}\r\nadmin> ";

    #[test]
    fn test_missing_anchors_use_sentinel() {
        let record = ProvisioningRecord::from_outputs("prime", "", "", "");
        assert_eq!(record.model, SENTINEL);
        assert_eq!(record.serial, SENTINEL);
        assert_eq!(record.config_name, "prime");
        assert!(record.is_partial());
    }

    #[test]
    fn test_serialize() {
        let record = ProvisioningRecord::from_outputs(
            "prime",
            "Chassis SERIAL123 MODELX",
            "Current address: 2c:6b:f5:aa:bb:c0, Hardware",
            "vme.0 up up inet 10.20.0.15/24",
        );
        assert!(!record.is_partial());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["serial"], "SERIAL123");
        assert_eq!(json["model"], "MODELX");
        assert_eq!(json["subnet"], "255.255.255.0");
    }

    #[tokio::test]
    async fn test_extract() {
        let device = ScriptedTransport::new()
            .output(PROMPT)
            .on(
                "show chassis hardware | no-more",
                &format!(
                    "show chassis hardware | no-more\r\nChassis   JW3618AF0123   EX2300-24P{}",
                    PROMPT
                ),
            )
            .on(
                "show interfaces vme | no-more",
                &format!(
                    "show interfaces vme | no-more\r\n  Current address: 2c:6b:f5:aa:bb:c0, Hardware address: 2c:6b:f5:aa:bb:c0{}",
                    PROMPT
                ),
            )
            .on(
                "show interfaces vme.0 terse | no-more",
                &format!(
                    "show interfaces vme.0 terse | no-more\r\nvme.0   up   up   inet   10.20.0.15/24{}",
                    PROMPT
                ),
            );
        let mut session = session(device);

        let record = extract(&mut session, "prime").await.unwrap();

        assert_eq!(
            record.to_line(),
            "EX2300-24P, JW3618AF0123, prime, 2c:6b:f5:aa:bb:c0, 10.20.0.15, 255.255.255.0"
        );
    }
}
