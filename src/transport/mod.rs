//! Byte transports feeding the frame decoder.
//!
//! The decoder only needs blocking, timeout-bounded read access to an
//! already-open byte stream; opening, configuring and enumerating ports is
//! the transport implementation's business.

pub mod serial;

pub use serial::{available_ports, SerialTransport};

use thiserror::Error;

/// Errors surfaced by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No data arrived within the bounded read timeout. Recoverable; the
    /// caller polls again.
    #[error("read timed out before any data arrived")]
    TimedOut,

    /// The underlying stream is gone. Terminal for the owning session.
    #[error("transport closed: {0}")]
    Closed(String),

    /// The port could not be opened in the first place.
    #[error("failed to open serial port {port}: {message}")]
    Open { port: String, message: String },
}

/// Blocking read access to an already-open byte stream.
///
/// Every read must be bounded by a timeout; the decode loop relies on reads
/// returning periodically so its cancellation check stays responsive.
pub trait Transport: Send {
    /// Reads up to `buf.len()` bytes, returning how many arrived. A zero
    /// count is treated like a timeout by callers.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Human-readable name for logging.
    fn describe(&self) -> String {
        "byte stream".to_string()
    }
}
