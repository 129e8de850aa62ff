//! Packet-to-event translation with tilt debouncing.

use tracing::{debug, trace};

use super::{Axis, InputEvent, KeyMap};
use crate::protocol::{Channel, Packet};

/// Pressed bookkeeping for the two tilt directions.
///
/// One instance lives inside each decoding session. It is the single source
/// of truth for whether a tilt key is logically down, independent of how many
/// raw packets report the physical condition; at most one direction is ever
/// active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebounceState {
    left_pressed: bool,
    right_pressed: bool,
}

impl DebounceState {
    pub fn left_pressed(&self) -> bool {
        self.left_pressed
    }

    pub fn right_pressed(&self) -> bool {
        self.right_pressed
    }

    /// Mutual-exclusion invariant check.
    pub fn is_exclusive(&self) -> bool {
        !(self.left_pressed && self.right_pressed)
    }
}

#[derive(Clone, Copy, Debug)]
enum TiltSide {
    Left,
    Right,
}

/// Turns packets into input events, owning the per-session debounce state.
pub struct EventTranslator {
    keys: KeyMap,
    state: DebounceState,
}

impl EventTranslator {
    pub fn new(keys: KeyMap) -> Self {
        Self {
            keys,
            state: DebounceState::default(),
        }
    }

    /// Snapshot of the current debounce state.
    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Translates one packet into the events it implies.
    ///
    /// Most packets produce zero or one event; a tilt transition that has to
    /// release the opposite direction first produces two, with the forced
    /// release emitted before the new press.
    pub fn translate(&mut self, packet: &Packet) -> Vec<InputEvent> {
        match packet.channel() {
            Channel::AxisX => vec![InputEvent::PointerDelta {
                axis: Axis::X,
                amount: packet.value,
            }],
            Channel::AxisY => vec![InputEvent::PointerDelta {
                axis: Axis::Y,
                amount: packet.value,
            }],
            Channel::TiltLeft => self.tilt(TiltSide::Left, packet.value),
            Channel::TiltRight => self.tilt(TiltSide::Right, packet.value),
            Channel::Button(code) => self.button(code, packet.value),
        }
    }

    fn button(&mut self, code: u8, value: i16) -> Vec<InputEvent> {
        let Some(key) = self.keys.button_key(code) else {
            trace!("Ignoring packet on unmapped channel {}", code);
            return Vec::new();
        };
        match value {
            1 => vec![InputEvent::KeyDown { key }],
            0 => vec![InputEvent::KeyUp { key }],
            other => {
                trace!("Ignoring button {} packet with value {}", code, other);
                Vec::new()
            }
        }
    }

    fn tilt(&mut self, side: TiltSide, value: i16) -> Vec<InputEvent> {
        let (own_key, other_key) = match side {
            TiltSide::Left => (self.keys.tilt_left(), self.keys.tilt_right()),
            TiltSide::Right => (self.keys.tilt_right(), self.keys.tilt_left()),
        };
        let (own_pressed, other_pressed) = match side {
            TiltSide::Left => (self.state.left_pressed, self.state.right_pressed),
            TiltSide::Right => (self.state.right_pressed, self.state.left_pressed),
        };

        let mut events = Vec::new();
        match value {
            1 if !own_pressed => {
                if other_pressed {
                    // Mutual exclusion: the opposite direction is released as
                    // a real, observable event before the new press.
                    events.push(InputEvent::KeyUp { key: other_key });
                }
                events.push(InputEvent::KeyDown { key: own_key });
                match side {
                    TiltSide::Left => {
                        self.state.left_pressed = true;
                        self.state.right_pressed = false;
                    }
                    TiltSide::Right => {
                        self.state.right_pressed = true;
                        self.state.left_pressed = false;
                    }
                }
                debug!("Tilt {:?} engaged", side);
            }
            1 => {
                trace!("Tilt {:?} already active, repeat suppressed", side);
            }
            0 if own_pressed => {
                events.push(InputEvent::KeyUp { key: own_key });
                match side {
                    TiltSide::Left => self.state.left_pressed = false,
                    TiltSide::Right => self.state.right_pressed = false,
                }
                debug!("Tilt {:?} released", side);
            }
            0 => {
                trace!("Tilt {:?} release without press, ignored", side);
            }
            other => {
                trace!("Ignoring tilt {:?} packet with value {}", side, other);
            }
        }
        events
    }
}
