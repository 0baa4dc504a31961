//! Serial line configuration.

use std::time::Duration;

/// Serial line configuration.
///
/// The console speaks 8-N-1; only the speed, read timeout and the
/// discovery behavior are configurable.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Line speed in baud (default: 9600).
    pub baud_rate: u32,

    /// Upper bound for a single underlying read call.
    pub read_timeout: Duration,

    /// Port names to try, in priority order. Empty means "ask the OS".
    pub candidates: Vec<String>,

    /// Pause between two full discovery cycles.
    pub discovery_backoff: Duration,

    /// Stop discovering after this many cycles (None: keep trying forever).
    pub max_discovery_cycles: Option<u32>,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            read_timeout: Duration::from_secs(8),
            candidates: default_candidates(),
            discovery_backoff: Duration::from_secs(10),
            max_discovery_cycles: None,
        }
    }
}

impl SerialConfig {
    /// Use a single fixed port instead of the default candidate list.
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.candidates = vec![port.into()];
        self
    }

    /// Set the per-read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// Candidate console ports across platforms, most likely first.
///
/// USB console adapters on Windows usually enumerate high, so COM ports
/// are tried from COM9 down.
pub fn default_candidates() -> Vec<String> {
    let mut ports: Vec<String> = (0..=9).rev().map(|n| format!("COM{}", n)).collect();
    ports.extend((0..4).map(|n| format!("/dev/ttyUSB{}", n)));
    ports.extend((0..2).map(|n| format!("/dev/ttyACM{}", n)));
    ports.push("/dev/ttyS0".to_string());
    ports.push("/dev/cu.usbserial".to_string());
    ports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_line_parameters() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.read_timeout, Duration::from_secs(8));
        assert!(config.max_discovery_cycles.is_none());
    }

    #[test]
    fn test_candidate_priority() {
        let ports = default_candidates();
        assert_eq!(ports.first().map(String::as_str), Some("COM9"));
        assert!(ports.iter().position(|p| p == "COM0") < ports.iter().position(|p| p == "/dev/ttyUSB0"));
        assert!(ports.contains(&"/dev/cu.usbserial".to_string()));
    }

    #[test]
    fn test_with_port_replaces_candidates() {
        let config = SerialConfig::default().with_port("/dev/ttyUSB3");
        assert_eq!(config.candidates, vec!["/dev/ttyUSB3".to_string()]);
    }
}
