//! On-disk configuration.
//!
//! Everything lives in a single TOML file under the user's config directory
//! (`~/.config/tiltpad/config.toml` on Linux). A missing file is created with
//! the defaults on first run; a malformed file is an error rather than a
//! silent fallback.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::mapping::{Key, KeyMap, KeymapError};
use crate::protocol::FramingMode;
use crate::transport::serial::{DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT_MS};

const CONFIG_DIR: &str = "tiltpad";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to write config file {path}: {message}")]
    Write { path: String, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("invalid key map: {0}")]
    Keymap(#[from] KeymapError),
}

/// Serial connection parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Port path, e.g. `/dev/ttyUSB0`. Empty means pick the first port the
    /// system enumerates.
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

/// Wire-level protocol parameters.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    pub framing: FramingMode,
}

/// Channel-to-key bindings as spelled in the config file.
///
/// Button channels are TOML table keys, so they are strings of decimal
/// channel codes; key values use the short names [`Key::parse`] accepts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct KeymapConfig {
    pub buttons: HashMap<String, Key>,
    pub tilt_left: Key,
    pub tilt_right: Key,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        let map = KeyMap::default_map();
        let buttons = [3u8, 4, 5, 6]
            .into_iter()
            .filter_map(|code| map.button_key(code).map(|key| (code.to_string(), key)))
            .collect();
        Self {
            buttons,
            tilt_left: map.tilt_left(),
            tilt_right: map.tilt_right(),
        }
    }
}

impl KeymapConfig {
    /// Validates the bindings into the table the translator uses.
    pub fn to_keymap(&self) -> Result<KeyMap, KeymapError> {
        let mut buttons = HashMap::new();
        for (code, key) in &self.buttons {
            let code: u8 = code
                .parse()
                .map_err(|_| KeymapError::InvalidButtonCode(code.clone()))?;
            buttons.insert(code, *key);
        }
        KeyMap::new(buttons, self.tilt_left, self.tilt_right)
    }
}

/// Top-level configuration for the bridge.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub connection: ConnectionConfig,
    pub protocol: ProtocolConfig,
    pub keymap: KeymapConfig,
}

impl BridgeConfig {
    /// Loads the config from the default location, writing the defaults
    /// there first when no file exists yet.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            warn!(
                "Config file {} does not exist, writing defaults",
                path.display()
            );
            let config = Self::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        // Bad key bindings should fail here, not at session start.
        config.keymap.to_keymap()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!("Saved config to {}", path.display());
        Ok(())
    }
}

/// Default config file location.
pub fn config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| {
        warn!("Could not determine config directory, using current directory");
        PathBuf::from(".")
    });
    base.join(CONFIG_DIR).join(CONFIG_FILE)
}
