//! UI configuration
//!
//! Runtime tunables for the screens. Configuration can be stored in flash
//! as postcard-serialized binary data (feature `serde`).

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Message slots kept in the channel history
pub const HIST_CAP: usize = 20;

/// Number of group channels the node can join
pub const MAX_GROUP_CHANNELS: u8 = 8;

/// Maximum length of the history file path
pub const MAX_PATH_LEN: usize = 64;

/// Default location of the history file
pub const DEFAULT_HISTORY_PATH: &str = "/meshdeck/channels.bin";

/// Default wait before a login or command is declared lost
pub const DEFAULT_ADMIN_TIMEOUT_MS: u32 = 15_000;

/// Default redraw interval while something is in progress
pub const DEFAULT_ACTIVE_REDRAW_MS: u32 = 1_000;

/// Default redraw interval otherwise
pub const DEFAULT_IDLE_REDRAW_MS: u32 = 5_000;

const _: () = assert!(DEFAULT_HISTORY_PATH.len() <= MAX_PATH_LEN);
const _: () = assert!(HIST_CAP <= i16::MAX as usize);

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Stored bytes do not decode
    Deserialize,
    /// Buffer too small for the encoded config
    Serialize,
}

/// Screen configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UiConfig {
    /// Channel history file
    pub history_path: String<MAX_PATH_LEN>,
    /// Repeater login/command timeout
    pub admin_timeout_ms: u32,
    /// Redraw interval while waiting on the network
    pub active_redraw_ms: u32,
    /// Redraw interval when nothing is pending
    pub idle_redraw_ms: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        let mut history_path = String::new();
        let _ = history_path.push_str(DEFAULT_HISTORY_PATH);
        Self {
            history_path,
            admin_timeout_ms: DEFAULT_ADMIN_TIMEOUT_MS,
            active_redraw_ms: DEFAULT_ACTIVE_REDRAW_MS,
            idle_redraw_ms: DEFAULT_IDLE_REDRAW_MS,
        }
    }
}

#[cfg(feature = "serde")]
impl UiConfig {
    /// Decode a configuration blob
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)
    }

    /// Encode into `buffer`, returning the used part
    pub fn to_postcard<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buffer).map_err(|_| ConfigError::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = UiConfig::default();
        assert_eq!(config.history_path.as_str(), "/meshdeck/channels.bin");
        assert_eq!(config.admin_timeout_ms, 15_000);
        assert_eq!(config.active_redraw_ms, 1_000);
        assert_eq!(config.idle_redraw_ms, 5_000);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_roundtrip() {
        let mut config = UiConfig::default();
        config.admin_timeout_ms = 30_000;
        let mut buffer = [0u8; 128];
        let bytes = config.to_postcard(&mut buffer).unwrap();
        assert_eq!(UiConfig::from_postcard(bytes), Ok(config));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_errors() {
        let config = UiConfig::default();
        let mut tiny = [0u8; 4];
        assert_eq!(config.to_postcard(&mut tiny), Err(ConfigError::Serialize));
        assert_eq!(UiConfig::from_postcard(&[0xFF]), Err(ConfigError::Deserialize));
    }
}
