//! Input sinks realizing translated events.

pub mod os;

pub use os::OsInputSink;

use thiserror::Error;

use crate::mapping::{Axis, InputEvent, Key};

/// Errors raised by an input sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to initialize input sink: {0}")]
    Initialization(String),

    #[error("input injection failed: {0}")]
    Injection(String),
}

/// Destination for translated input events.
///
/// The session loop invokes the sink synchronously from the decode thread; a
/// blocking implementation back-pressures decoding, which is intended.
pub trait InputSink: Send {
    fn move_relative(&mut self, axis: Axis, amount: i16) -> Result<(), SinkError>;

    fn key_down(&mut self, key: Key) -> Result<(), SinkError>;

    fn key_up(&mut self, key: Key) -> Result<(), SinkError>;

    /// Routes one event to the matching sink call.
    fn dispatch(&mut self, event: &InputEvent) -> Result<(), SinkError> {
        match *event {
            InputEvent::PointerDelta { axis, amount } => self.move_relative(axis, amount),
            InputEvent::KeyDown { key } => self.key_down(key),
            InputEvent::KeyUp { key } => self.key_up(key),
        }
    }
}
