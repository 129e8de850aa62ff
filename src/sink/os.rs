//! OS-level pointer and keyboard injection through `enigo`.

use enigo::{Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use tracing::info;

use super::{InputSink, SinkError};
use crate::mapping::{Axis, Key};

/// Sink injecting events into the OS input stack.
pub struct OsInputSink {
    enigo: Enigo,
}

impl OsInputSink {
    pub fn new() -> Result<Self, SinkError> {
        info!("Initializing OS input sink");
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| SinkError::Initialization(e.to_string()))?;
        Ok(Self { enigo })
    }
}

fn to_enigo_key(key: Key) -> enigo::Key {
    match key {
        Key::Char(c) => enigo::Key::Unicode(c),
        Key::ArrowLeft => enigo::Key::LeftArrow,
        Key::ArrowRight => enigo::Key::RightArrow,
        Key::ArrowUp => enigo::Key::UpArrow,
        Key::ArrowDown => enigo::Key::DownArrow,
        Key::Space => enigo::Key::Space,
        Key::Enter => enigo::Key::Return,
        Key::Escape => enigo::Key::Escape,
        Key::Tab => enigo::Key::Tab,
    }
}

impl InputSink for OsInputSink {
    fn move_relative(&mut self, axis: Axis, amount: i16) -> Result<(), SinkError> {
        let (dx, dy) = match axis {
            Axis::X => (i32::from(amount), 0),
            Axis::Y => (0, i32::from(amount)),
        };
        self.enigo
            .move_mouse(dx, dy, Coordinate::Rel)
            .map_err(|e| SinkError::Injection(e.to_string()))
    }

    fn key_down(&mut self, key: Key) -> Result<(), SinkError> {
        self.enigo
            .key(to_enigo_key(key), Direction::Press)
            .map_err(|e| SinkError::Injection(e.to_string()))
    }

    fn key_up(&mut self, key: Key) -> Result<(), SinkError> {
        self.enigo
            .key(to_enigo_key(key), Direction::Release)
            .map_err(|e| SinkError::Injection(e.to_string()))
    }
}
