use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::blocks::Position;
use crate::editor::DEFAULT_SPAWN_POSITION;
use crate::interpreter::DEFAULT_TICK_HZ;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    /// device status file used by `run` and `eval` when none is given
    #[serde(default)]
    pub devices_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// forever passes and wait polls per second
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    /// how often the device status file is re-read
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// where new statements are placed
    #[serde(default = "default_spawn_position")]
    pub spawn_position: Position,
    /// tracing filter used when RAILBLOCKS_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_tick_hz() -> u32 {
    DEFAULT_TICK_HZ
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_spawn_position() -> Position {
    DEFAULT_SPAWN_POSITION
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_hz: DEFAULT_TICK_HZ,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            spawn_position: DEFAULT_SPAWN_POSITION,
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.settings.tick_hz, 60);
        assert_eq!(config.settings.spawn_position, Position::new(50.0, 50.0));
    }

    #[test]
    fn test_partial_settings() {
        let config: Config =
            serde_json::from_str(r#"{"settings": {"tick_hz": 30}, "devices_file": "/tmp/s.json"}"#)
                .unwrap();
        assert_eq!(config.settings.tick_hz, 30);
        assert_eq!(config.settings.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.devices_file, Some(PathBuf::from("/tmp/s.json")));
    }
}
