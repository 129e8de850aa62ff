//! End-to-end session tests over scripted transports and a recording sink.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tiltpad::mapping::{Axis, InputEvent, Key, KeyMap};
use tiltpad::protocol::FramingMode;
use tiltpad::session::{SessionHandle, SessionSettings};
use tiltpad::sink::{InputSink, SinkError};
use tiltpad::transport::{Transport, TransportError};

/// Replays a byte script one byte per read, then times out or closes.
///
/// Single-byte reads force the decoder to assemble frames across multiple
/// reads, like a real serial line under load.
struct ScriptTransport {
    data: Vec<u8>,
    pos: usize,
    close_at_end: bool,
}

impl ScriptTransport {
    fn closing(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            close_at_end: true,
        }
    }

    fn idle() -> Self {
        Self {
            data: Vec::new(),
            pos: 0,
            close_at_end: false,
        }
    }
}

impl Transport for ScriptTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if self.pos >= self.data.len() {
            return if self.close_at_end {
                Err(TransportError::Closed("script exhausted".to_string()))
            } else {
                // Pace the idle loop like a real read timeout would.
                std::thread::sleep(Duration::from_millis(5));
                Err(TransportError::TimedOut)
            };
        }
        buf[0] = self.data[self.pos];
        self.pos += 1;
        Ok(1)
    }

    fn describe(&self) -> String {
        "scripted stream".to_string()
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    events: Arc<Mutex<Vec<InputEvent>>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<InputEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl InputSink for RecordingSink {
    fn move_relative(&mut self, axis: Axis, amount: i16) -> Result<(), SinkError> {
        self.events
            .lock()
            .unwrap()
            .push(InputEvent::PointerDelta { axis, amount });
        Ok(())
    }

    fn key_down(&mut self, key: Key) -> Result<(), SinkError> {
        self.events.lock().unwrap().push(InputEvent::KeyDown { key });
        Ok(())
    }

    fn key_up(&mut self, key: Key) -> Result<(), SinkError> {
        self.events.lock().unwrap().push(InputEvent::KeyUp { key });
        Ok(())
    }
}

fn wait_for_finish(session: &SessionHandle) {
    let finished = session.finished();
    let deadline = Instant::now() + Duration::from_secs(5);
    while !finished.is_cancelled() {
        assert!(Instant::now() < deadline, "session did not finish in time");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn full_stream_produces_expected_events() {
    let script = [
        0xFF, 0x00, 0x0A, 0x00, // X axis +10
        0xFF, 0x01, 0xF6, 0xFF, // Y axis -10
        0xFF, 0x03, 0x01, 0x00, // button 3 down
        0xFF, 0x03, 0x00, 0x00, // button 3 up
        0xFF, 0x09, 0x01, 0x00, // tilt right on
        0xFF, 0x08, 0x01, 0x00, // tilt left on while right is held
        0xFF, 0x08, 0x00, 0x00, // tilt left off
        0xFF, 0x08, // truncated frame, then the stream closes
    ];
    let sink = RecordingSink::default();
    let session = SessionHandle::spawn(
        Box::new(ScriptTransport::closing(&script)),
        Box::new(sink.clone()),
        SessionSettings::default(),
    )
    .unwrap();

    wait_for_finish(&session);
    session.shutdown();

    assert_eq!(
        sink.events(),
        vec![
            InputEvent::PointerDelta { axis: Axis::X, amount: 10 },
            InputEvent::PointerDelta { axis: Axis::Y, amount: -10 },
            InputEvent::KeyDown { key: Key::Char('a') },
            InputEvent::KeyUp { key: Key::Char('a') },
            InputEvent::KeyDown { key: Key::ArrowRight },
            InputEvent::KeyUp { key: Key::ArrowRight },
            InputEvent::KeyDown { key: Key::ArrowLeft },
            InputEvent::KeyUp { key: Key::ArrowLeft },
        ]
    );
}

#[test]
fn noise_and_unknown_channels_are_skipped() {
    let script = [
        0x13, 0x37, // line noise before the first marker
        0xFF, 0x07, 0x01, 0x00, // unmapped channel, ignored
        0xFF, 0x04, 0x01, 0x00, // button 4 down
    ];
    let sink = RecordingSink::default();
    let session = SessionHandle::spawn(
        Box::new(ScriptTransport::closing(&script)),
        Box::new(sink.clone()),
        SessionSettings::default(),
    )
    .unwrap();

    wait_for_finish(&session);
    session.shutdown();

    assert_eq!(sink.events(), vec![InputEvent::KeyDown { key: Key::Char('b') }]);
}

#[test]
fn trailer_framing_decodes_the_legacy_stream() {
    let script = [
        0x00, 0x05, 0x00, 0xFF, // X axis +5
        0x09, 0x01, 0x00, 0xFF, // tilt right on
    ];
    let sink = RecordingSink::default();
    let session = SessionHandle::spawn(
        Box::new(ScriptTransport::closing(&script)),
        Box::new(sink.clone()),
        SessionSettings {
            framing: FramingMode::Trailer,
            keymap: KeyMap::default_map(),
        },
    )
    .unwrap();

    wait_for_finish(&session);
    session.shutdown();

    assert_eq!(
        sink.events(),
        vec![
            InputEvent::PointerDelta { axis: Axis::X, amount: 5 },
            InputEvent::KeyDown { key: Key::ArrowRight },
        ]
    );
}

#[test]
fn shutdown_stops_an_idle_session() {
    let sink = RecordingSink::default();
    let session = SessionHandle::spawn(
        Box::new(ScriptTransport::idle()),
        Box::new(sink.clone()),
        SessionSettings::default(),
    )
    .unwrap();

    // The loop only ever sees timeouts; shutdown must still return promptly.
    std::thread::sleep(Duration::from_millis(50));
    session.shutdown();

    assert!(sink.events().is_empty());
}
