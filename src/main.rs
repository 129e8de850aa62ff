use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tiltpad::config::BridgeConfig;
use tiltpad::session::{SessionHandle, SessionSettings};
use tiltpad::sink::OsInputSink;
use tiltpad::transport::serial::{self, SerialTransport};

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = BridgeConfig::load_or_default()?;
    let keymap = config.keymap.to_keymap()?;

    let port = if config.connection.port.is_empty() {
        let ports = serial::available_ports();
        info!("Available serial ports: {:?}", ports);
        ports
            .into_iter()
            .next()
            .ok_or_else(|| eyre!("No serial port found and none configured"))?
    } else {
        config.connection.port.clone()
    };

    let transport = SerialTransport::open(
        &port,
        config.connection.baud_rate,
        Duration::from_millis(config.connection.read_timeout_ms),
    )
    .map_err(|e| eyre!("Failed to open serial port: {}", e))?;

    let sink = OsInputSink::new().map_err(|e| eyre!("Failed to initialize input sink: {}", e))?;

    let session = SessionHandle::spawn(
        Box::new(transport),
        Box::new(sink),
        SessionSettings {
            framing: config.protocol.framing,
            keymap,
        },
    )
    .map_err(|e| eyre!("Failed to start session: {}", e))?;

    let finished = session.finished();
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
        }
        _ = finished.cancelled() => {
            info!("Controller stream ended");
        }
    }

    session.shutdown();
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
