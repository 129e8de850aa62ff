//! Decode-translate-dispatch session lifecycle.
//!
//! One session owns one connection: it pulls packets off the transport on a
//! dedicated blocking thread, translates them, and hands each event to the
//! sink synchronously. There is no internal event queue; a slow sink
//! back-pressures decoding by design.

use std::thread::{self, JoinHandle};

use chrono::Local;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::mapping::{EventTranslator, KeyMap};
use crate::protocol::FramingMode;
use crate::sink::InputSink;
use crate::transport::{Transport, TransportError};

/// Configuration for one decoding session.
#[derive(Clone, Debug, Default)]
pub struct SessionSettings {
    /// Framing revision spoken by the connected controller.
    pub framing: FramingMode,

    /// Channel-to-key table handed to the translator.
    pub keymap: KeyMap,
}

/// Errors that can occur while starting a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to start session thread: {0}")]
    SpawnError(String),
}

/// Handle owning one decode session.
///
/// The blocking decode loop runs on its own thread. Dropping the handle does
/// not stop the loop; call [`SessionHandle::shutdown`] for an orderly stop,
/// or watch [`SessionHandle::finished`] to learn when the stream closed on
/// its own.
pub struct SessionHandle {
    cancel: CancellationToken,
    finished: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Spawns the decode loop over the given transport and sink.
    pub fn spawn(
        transport: Box<dyn Transport>,
        sink: Box<dyn InputSink>,
        settings: SessionSettings,
    ) -> Result<Self, SessionError> {
        info!("Starting decode session ({} framing)", settings.framing);

        let cancel = CancellationToken::new();
        let finished = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let loop_finished = finished.clone();

        let join = thread::Builder::new()
            .name("tiltpad-session".to_string())
            .spawn(move || {
                run_session(transport, sink, settings, loop_cancel);
                loop_finished.cancel();
            })
            .map_err(|e| SessionError::SpawnError(e.to_string()))?;

        Ok(Self {
            cancel,
            finished,
            join: Some(join),
        })
    }

    /// Token that fires once the loop has exited, whether because the stream
    /// closed or because it was cancelled.
    pub fn finished(&self) -> CancellationToken {
        self.finished.clone()
    }

    /// Requests cancellation and waits for the loop to wind down. Returns
    /// after at most one read-timeout interval.
    pub fn shutdown(mut self) {
        info!("Shutting down decode session");
        self.cancel.cancel();
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                error!("Session thread panicked during shutdown");
            }
        }
    }
}

fn run_session(
    mut transport: Box<dyn Transport>,
    mut sink: Box<dyn InputSink>,
    settings: SessionSettings,
    cancel: CancellationToken,
) {
    let mut decoder = settings.framing.decoder();
    let mut translator = EventTranslator::new(settings.keymap);

    info!(
        "Session loop started on {} ({} framing)",
        transport.describe(),
        decoder.mode()
    );

    // Throughput stats, reported on a fixed cadence like the rest of the
    // pipeline logs.
    let mut packets: u64 = 0;
    let mut events: u64 = 0;
    let mut last_stats_time = Local::now();
    let stats_interval = chrono::Duration::seconds(30);

    while !cancel.is_cancelled() {
        match decoder.next_packet(transport.as_mut()) {
            Ok(Some(packet)) => {
                packets += 1;
                for event in translator.translate(&packet) {
                    events += 1;
                    debug!("Dispatching {:?}", event);
                    if let Err(e) = sink.dispatch(&event) {
                        warn!("Failed to dispatch {:?}: {}", event, e);
                    }
                }
            }
            Ok(None) => {
                // No complete frame within the read timeout; poll again.
            }
            Err(TransportError::TimedOut) => {
                // Recoverable; poll again.
            }
            Err(err) => {
                info!("Transport ended session: {}", err);
                break;
            }
        }

        let now = Local::now();
        if now - last_stats_time > stats_interval {
            let elapsed_seconds = (now - last_stats_time).num_seconds().max(1);
            info!(
                "Session stats: {} packets, {} events, {} resyncs total ({:.2} packets/sec)",
                packets,
                events,
                decoder.resync_count(),
                packets as f64 / elapsed_seconds as f64
            );
            packets = 0;
            events = 0;
            last_stats_time = now;
        }
    }

    info!(
        "Session loop finished ({} packets, {} events since last report)",
        packets, events
    );
}
