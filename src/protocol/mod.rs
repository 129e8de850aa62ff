//! Wire protocol for the tilt controller.
//!
//! The controller emits fixed-size binary frames over a serial link. Every
//! frame carries one channel code and one little-endian signed 16-bit value.
//! Two framing revisions exist in the field: the current firmware prefixes
//! each 3-byte body with a sync marker, an earlier revision appends the
//! marker instead. Both are supported behind [`FrameDecoder`], selected by
//! [`FramingMode`] in the configuration.

pub mod framing;

pub use framing::{FrameDecoder, FramingMode, SyncFirstDecoder, TrailerDecoder};

/// Marker byte separating frames on the wire.
pub const FRAME_SYNC: u8 = 0xFF;

/// Logical source of a packet, derived from its raw channel code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Horizontal pointer motion (code 0).
    AxisX,
    /// Vertical pointer motion (code 1).
    AxisY,
    /// Left tilt sensor (code 8), debounced with mutual exclusion.
    TiltLeft,
    /// Right tilt sensor (code 9), debounced with mutual exclusion.
    TiltRight,
    /// Momentary button code, resolved through the key table. Codes without
    /// a binding are ignored.
    Button(u8),
}

impl Channel {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Channel::AxisX,
            1 => Channel::AxisY,
            8 => Channel::TiltLeft,
            9 => Channel::TiltRight,
            other => Channel::Button(other),
        }
    }
}

/// One decoded protocol frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Packet {
    /// Raw channel code as sent by the firmware.
    pub channel: u8,
    /// Signed payload; a relative delta for axes, 0/1 for switches.
    pub value: i16,
}

impl Packet {
    /// Decodes a 3-byte frame body: channel code followed by the value in
    /// little-endian two's-complement.
    pub fn from_body(body: [u8; 3]) -> Self {
        Self {
            channel: body[0],
            value: i16::from_le_bytes([body[1], body[2]]),
        }
    }

    pub fn channel(&self) -> Channel {
        Channel::from_code(self.channel)
    }
}
