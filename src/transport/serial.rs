//! Serial port transport built on the `serialport` crate.

use std::io::Read;
use std::time::Duration;

use tracing::{info, warn};

use super::{Transport, TransportError};

/// Line rate of the reference controller firmware.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Bounded per-read timeout used when none is configured.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1_000;

/// Transport over a USB/Bluetooth serial port.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
    name: String,
}

impl SerialTransport {
    /// Opens `path` at the given baud rate with a bounded read timeout.
    pub fn open(
        path: &str,
        baud_rate: u32,
        read_timeout: Duration,
    ) -> Result<Self, TransportError> {
        info!("Opening serial port {} at {} baud", path, baud_rate);
        let port = serialport::new(path, baud_rate)
            .timeout(read_timeout)
            .open()
            .map_err(|e| TransportError::Open {
                port: path.to_string(),
                message: e.to_string(),
            })?;
        info!("Serial port {} opened", path);
        Ok(Self {
            port,
            name: path.to_string(),
        })
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(err) if err.kind() == std::io::ErrorKind::TimedOut => {
                Err(TransportError::TimedOut)
            }
            Err(err) => Err(TransportError::Closed(err.to_string())),
        }
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Lists serial ports that could host the controller.
pub fn available_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(err) => {
            warn!("Failed to enumerate serial ports: {}", err);
            Vec::new()
        }
    }
}
