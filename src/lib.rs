//! Serial tilt-controller to OS input bridge.
//!
//! A microcontroller streams 4-byte frames over a serial port; this crate
//! decodes them into packets, translates the packets into pointer deltas and
//! key events (debouncing the tilt switches), and injects the events into the
//! operating system's input stack.

pub mod config;
pub mod mapping;
pub mod protocol;
pub mod session;
pub mod sink;
pub mod transport;
