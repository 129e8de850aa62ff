//! Translation of decoded packets into input events.
//!
//! Axis packets pass through as relative pointer deltas, button packets map
//! through the channel-to-key table, and the two tilt channels are debounced
//! with mutual exclusion by [`EventTranslator`].

pub mod translator;

pub use translator::{DebounceState, EventTranslator};

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building or validating a key table.
#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("unknown key name: {0}")]
    UnknownKey(String),

    #[error("invalid button channel code: {0}")]
    InvalidButtonCode(String),

    #[error("key map has no button bindings")]
    Empty,
}

/// Pointer axis addressed by a motion event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// Logical key a button or tilt channel is bound to.
///
/// Config files spell keys as short names: a single printable character, or
/// `left`/`right`/`up`/`down`/`space`/`enter`/`escape`/`tab`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    Char(char),
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Space,
    Enter,
    Escape,
    Tab,
}

impl Key {
    /// Parses a key name as written in the config file.
    pub fn parse(name: &str) -> Result<Self, KeymapError> {
        let lowered = name.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "left" => Ok(Key::ArrowLeft),
            "right" => Ok(Key::ArrowRight),
            "up" => Ok(Key::ArrowUp),
            "down" => Ok(Key::ArrowDown),
            "space" => Ok(Key::Space),
            "enter" | "return" => Ok(Key::Enter),
            "escape" | "esc" => Ok(Key::Escape),
            "tab" => Ok(Key::Tab),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_graphic() => Ok(Key::Char(c)),
                    _ => Err(KeymapError::UnknownKey(name.to_string())),
                }
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::ArrowLeft => write!(f, "left"),
            Key::ArrowRight => write!(f, "right"),
            Key::ArrowUp => write!(f, "up"),
            Key::ArrowDown => write!(f, "down"),
            Key::Space => write!(f, "space"),
            Key::Enter => write!(f, "enter"),
            Key::Escape => write!(f, "escape"),
            Key::Tab => write!(f, "tab"),
        }
    }
}

impl TryFrom<String> for Key {
    type Error = KeymapError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Key::parse(&name)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

/// One semantic input change, dispatched to the sink as soon as it is
/// produced and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// Relative pointer motion; zero deltas are forwarded as-is to preserve
    /// timing parity with the source stream.
    PointerDelta { axis: Axis, amount: i16 },
    KeyDown { key: Key },
    KeyUp { key: Key },
}

/// Channel-to-key table for momentary buttons and the two tilt directions.
#[derive(Clone, Debug)]
pub struct KeyMap {
    buttons: HashMap<u8, Key>,
    tilt_left: Key,
    tilt_right: Key,
}

impl KeyMap {
    /// Table used by the reference controller: A/B/Z/X on the face buttons,
    /// arrow keys on tilt.
    pub fn default_map() -> Self {
        let mut buttons = HashMap::new();
        buttons.insert(3, Key::Char('a'));
        buttons.insert(4, Key::Char('b'));
        buttons.insert(5, Key::Char('z'));
        buttons.insert(6, Key::Char('x'));
        Self {
            buttons,
            tilt_left: Key::ArrowLeft,
            tilt_right: Key::ArrowRight,
        }
    }

    pub fn new(
        buttons: HashMap<u8, Key>,
        tilt_left: Key,
        tilt_right: Key,
    ) -> Result<Self, KeymapError> {
        if buttons.is_empty() {
            return Err(KeymapError::Empty);
        }
        Ok(Self {
            buttons,
            tilt_left,
            tilt_right,
        })
    }

    /// Key bound to a button channel code, if any.
    pub fn button_key(&self, code: u8) -> Option<Key> {
        self.buttons.get(&code).copied()
    }

    pub fn tilt_left(&self) -> Key {
        self.tilt_left
    }

    pub fn tilt_right(&self) -> Key {
        self.tilt_right
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::default_map()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_parse() {
        assert_eq!(Key::parse("a").unwrap(), Key::Char('a'));
        assert_eq!(Key::parse("Z").unwrap(), Key::Char('z'));
        assert_eq!(Key::parse("left").unwrap(), Key::ArrowLeft);
        assert_eq!(Key::parse(" space ").unwrap(), Key::Space);
        assert_eq!(Key::parse("return").unwrap(), Key::Enter);
        assert!(Key::parse("nope").is_err());
        assert!(Key::parse("").is_err());
    }

    #[test]
    fn key_name_round_trips() {
        for key in [Key::Char('q'), Key::ArrowRight, Key::Tab] {
            assert_eq!(Key::parse(&key.to_string()).unwrap(), key);
        }
    }

    #[test]
    fn default_map_matches_reference_controller() {
        let map = KeyMap::default_map();
        assert_eq!(map.button_key(3), Some(Key::Char('a')));
        assert_eq!(map.button_key(4), Some(Key::Char('b')));
        assert_eq!(map.button_key(5), Some(Key::Char('z')));
        assert_eq!(map.button_key(6), Some(Key::Char('x')));
        assert_eq!(map.button_key(7), None);
        assert_eq!(map.tilt_left(), Key::ArrowLeft);
        assert_eq!(map.tilt_right(), Key::ArrowRight);
    }

    #[test]
    fn empty_button_table_is_rejected() {
        assert!(matches!(
            KeyMap::new(HashMap::new(), Key::ArrowLeft, Key::ArrowRight),
            Err(KeymapError::Empty)
        ));
    }
}
