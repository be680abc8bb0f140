//! Listener configuration.
//!
//! Values come from built-in defaults, optionally overridden by a TOML file:
//!
//! ```toml
//! port = "/dev/ttyAMA0"
//! baud_rate = 115200
//! read_timeout_secs = 60
//! no_ping_tries = 10
//! max_frame_len = 1000
//! reconnect_tries = 1
//! reconnect_delay_secs = 60
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use uart_log::frame::PRESENCE;

/// Largest accepted [`ListenerConfig::max_frame_len`].
pub const MAX_FRAME_LEN_LIMIT: usize = 64 * 1024;

/// An error while loading a [`ListenerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("reading configuration file")]
    Read(#[source] std::io::Error),
    /// The configuration file is not valid TOML or has unexpected keys.
    #[error("parsing configuration")]
    Parse(#[source] toml::de::Error),
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Settings of a [`Listener`](crate::listener::Listener) and the port it reads from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListenerConfig {
    /// Serial device to open.
    pub port: Option<String>,
    /// Baud rate of the serial link.
    pub baud_rate: u32,
    /// How long a read may wait for the next byte before counting a missed ping.
    pub read_timeout_secs: u64,
    /// Consecutive read timeouts tolerated before the target is considered lost.
    pub no_ping_tries: u32,
    /// Longest frame accepted, terminator excluded.
    pub max_frame_len: usize,
    /// Additional attempts at opening the port after the first one fails.
    pub reconnect_tries: u32,
    /// Pause between attempts at opening the port.
    pub reconnect_delay_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 115_200,
            read_timeout_secs: 60,
            no_ping_tries: 10,
            max_frame_len: 1000,
            reconnect_tries: 1,
            reconnect_delay_secs: 60,
        }
    }
}

impl ListenerConfig {
    /// Parses a TOML configuration, filling missing keys with defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses the TOML configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_toml(&source)
    }

    /// Checks that all values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud_rate == 0 {
            return Err(ConfigError::Invalid("baud_rate must be positive"));
        }
        if self.read_timeout_secs == 0 {
            return Err(ConfigError::Invalid("read_timeout_secs must be positive"));
        }
        if self.max_frame_len < PRESENCE.len() - 1 {
            return Err(ConfigError::Invalid("max_frame_len must fit the presence heartbeat"));
        }
        if self.max_frame_len > MAX_FRAME_LEN_LIMIT {
            return Err(ConfigError::Invalid("max_frame_len exceeds 64 KiB"));
        }
        Ok(())
    }

    /// Returns the read timeout as a [`Duration`].
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Returns the pause between attempts at opening the port.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}
