//! Framing strategies for the two observed protocol revisions.
//!
//! `sync-first` reads a sync marker, then a 3-byte body, and hunts
//! byte-by-byte when it loses alignment. `trailer` reads whole 4-byte frames
//! and accepts only those ending in the marker; it cannot hunt byte-by-byte
//! and is kept for compatibility with the firmware revision that appends the
//! marker. Prefer `sync-first`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::protocol::{Packet, FRAME_SYNC};
use crate::transport::{Transport, TransportError};

/// Upper bound on discarded bytes/frames per poll. Keeps a noisy line from
/// starving the session loop's cancellation check.
const MAX_DISCARDS_PER_POLL: u32 = 64;

/// Framing revision spoken by the connected controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FramingMode {
    /// `[0xFF][channel][value_lo][value_hi]`
    #[default]
    SyncFirst,
    /// `[channel][value_lo][value_hi][0xFF]`
    Trailer,
}

impl fmt::Display for FramingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramingMode::SyncFirst => write!(f, "sync-first"),
            FramingMode::Trailer => write!(f, "trailer"),
        }
    }
}

impl FramingMode {
    /// Builds the decoder implementing this framing revision.
    pub fn decoder(self) -> Box<dyn FrameDecoder> {
        match self {
            FramingMode::SyncFirst => Box::new(SyncFirstDecoder::default()),
            FramingMode::Trailer => Box::new(TrailerDecoder::default()),
        }
    }
}

/// Pulls validated packets off a byte transport.
///
/// The sequence is lazy and non-restartable: `Ok(None)` means no complete
/// frame arrived within the transport's read timeout and the caller should
/// poll again; a closed transport error ends the sequence for good.
pub trait FrameDecoder: Send {
    fn next_packet(
        &mut self,
        transport: &mut dyn Transport,
    ) -> Result<Option<Packet>, TransportError>;

    fn mode(&self) -> FramingMode;

    /// Bytes (sync-first) or frames (trailer) dropped while re-synchronizing.
    fn resync_count(&self) -> u64;
}

/// Fills `buf` completely, treating a timeout or zero-byte read before
/// completion as a short read (`Ok(false)`). The partial data is discarded by
/// the caller.
fn read_full(transport: &mut dyn Transport, buf: &mut [u8]) -> Result<bool, TransportError> {
    let mut filled = 0;
    while filled < buf.len() {
        match transport.read(&mut buf[filled..]) {
            Ok(0) | Err(TransportError::TimedOut) => return Ok(false),
            Ok(n) => filled += n,
            Err(err) => return Err(err),
        }
    }
    Ok(true)
}

/// Decoder for the sync-marker-first framing.
#[derive(Debug, Default)]
pub struct SyncFirstDecoder {
    resyncs: u64,
}

impl FrameDecoder for SyncFirstDecoder {
    fn next_packet(
        &mut self,
        transport: &mut dyn Transport,
    ) -> Result<Option<Packet>, TransportError> {
        let mut discarded = 0;
        loop {
            let mut sync = [0u8; 1];
            match transport.read(&mut sync) {
                Ok(0) | Err(TransportError::TimedOut) => return Ok(None),
                Ok(_) => {}
                Err(err) => return Err(err),
            }

            if sync[0] != FRAME_SYNC {
                // Misaligned or noisy byte; drop it and keep hunting.
                self.resyncs += 1;
                discarded += 1;
                trace!("Discarded stray byte {:#04x} while hunting for sync", sync[0]);
                if discarded >= MAX_DISCARDS_PER_POLL {
                    debug!("Discarded {} bytes without finding sync, yielding", discarded);
                    return Ok(None);
                }
                continue;
            }

            let mut body = [0u8; 3];
            if !read_full(transport, &mut body)? {
                // Stream paused mid-frame; the partial body is dropped and the
                // hunt restarts on the next poll.
                self.resyncs += 1;
                debug!("Partial frame body after sync, discarding");
                return Ok(None);
            }
            return Ok(Some(Packet::from_body(body)));
        }
    }

    fn mode(&self) -> FramingMode {
        FramingMode::SyncFirst
    }

    fn resync_count(&self) -> u64 {
        self.resyncs
    }
}

/// Decoder for the legacy trailing-marker framing.
#[derive(Debug, Default)]
pub struct TrailerDecoder {
    resyncs: u64,
}

impl FrameDecoder for TrailerDecoder {
    fn next_packet(
        &mut self,
        transport: &mut dyn Transport,
    ) -> Result<Option<Packet>, TransportError> {
        let mut discarded = 0;
        loop {
            let mut frame = [0u8; 4];
            if !read_full(transport, &mut frame)? {
                return Ok(None);
            }

            if frame[3] != FRAME_SYNC {
                // This revision only drops whole frames; once the stream is
                // misaligned it stays so until the sender pauses or resets.
                self.resyncs += 1;
                discarded += 1;
                debug!("Frame without trailing marker ({:02x?}), discarding", frame);
                if discarded >= MAX_DISCARDS_PER_POLL {
                    return Ok(None);
                }
                continue;
            }
            return Ok(Some(Packet::from_body([frame[0], frame[1], frame[2]])));
        }
    }

    fn mode(&self) -> FramingMode {
        FramingMode::Trailer
    }

    fn resync_count(&self) -> u64 {
        self.resyncs
    }
}
