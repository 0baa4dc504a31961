//! Serial transport implementation using tokio-serial.

use std::time::Duration;

use log::{debug, error, info};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{DataBits, Parity, SerialPort, SerialPortBuilderExt, SerialStream, StopBits};

use super::Transport;
use super::config::SerialConfig;
use crate::error::{Result, TransportError};

/// Serial console transport wrapping a tokio-serial stream.
pub struct SerialTransport {
    /// The open port.
    port: SerialStream,

    /// Name the port was opened under.
    name: String,

    /// Bound for one underlying read.
    read_timeout: Duration,
}

impl SerialTransport {
    /// Open one named port with 8-N-1 framing.
    pub fn open(name: &str, config: &SerialConfig) -> Result<Self> {
        let port = tokio_serial::new(name, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(config.read_timeout)
            .open_native_async()
            .map_err(TransportError::Serial)?;

        Ok(Self {
            port,
            name: name.to_string(),
            read_timeout: config.read_timeout,
        })
    }

    /// Find and open the console port.
    ///
    /// Cycles the configured candidates until one opens. With the default
    /// configuration this never gives up: the operator is expected to fix
    /// the cabling while the process waits.
    pub async fn connect(config: &SerialConfig) -> Result<Self> {
        let candidates = if config.candidates.is_empty() {
            tokio_serial::available_ports()
                .map_err(TransportError::Serial)?
                .into_iter()
                .map(|p| p.port_name)
                .collect()
        } else {
            config.candidates.clone()
        };

        info!(
            "Auto-initializing serial port: {} 8-N-1",
            config.baud_rate
        );

        discover(
            &candidates,
            config.discovery_backoff,
            config.max_discovery_cycles,
            |name| Self::open(name, config),
        )
        .await
    }

    /// Name of the opened port.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Try each candidate in order until `open` succeeds.
///
/// After a full unsuccessful cycle the failure is reported once (not per
/// cycle), then discovery sleeps `backoff` and starts over. `max_cycles`
/// of `None` means retry forever.
pub async fn discover<T, F>(
    candidates: &[String],
    backoff: Duration,
    max_cycles: Option<u32>,
    mut open: F,
) -> Result<T>
where
    F: FnMut(&str) -> Result<T>,
{
    let mut reported = false;
    let mut cycles = 0u32;

    loop {
        for name in candidates {
            match open(name) {
                Ok(transport) => {
                    info!("Connected: {}", name);
                    return Ok(transport);
                }
                Err(e) => debug!("Port {} unavailable: {}", name, e),
            }
        }

        cycles += 1;
        if !reported {
            error!("Unable to connect, please reseat adapters");
            reported = true;
        }

        if max_cycles.is_some_and(|max| cycles >= max) {
            return Err(TransportError::NoPortAvailable { cycles }.into());
        }

        tokio::time::sleep(backoff).await;
    }
}

impl Transport for SerialTransport {
    async fn read_available(&mut self) -> Result<Vec<u8>> {
        let pending = self.port.bytes_to_read().map_err(TransportError::Serial)? as usize;
        if pending == 0 {
            return Ok(Vec::new());
        }

        let mut buf = vec![0u8; pending];
        let n = tokio::time::timeout(self.read_timeout, self.port.read(&mut buf))
            .await
            .map_err(|_| TransportError::Timeout(self.read_timeout))?
            .map_err(TransportError::Io)?;
        buf.truncate(n);

        Ok(buf)
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.port.write_all(data).await.map_err(TransportError::Io)?;
        self.port.flush().await.map_err(TransportError::Io)?;
        Ok(())
    }
}
