mod schema;

pub use schema::{Config, Settings, DEFAULT_LOG_LEVEL, DEFAULT_POLL_INTERVAL_MS};

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

const CONFIG_ENV_VAR: &str = "RAILBLOCKS_CONFIG";

pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not find home directory"))?
        .join(".railblocks")
        .join("config.json"))
}

/// explicit path from --config, otherwise the env var or default location
pub fn get_config_path_with_override(config_override: Option<&Path>) -> Result<PathBuf> {
    match config_override {
        Some(path) => Ok(path.to_path_buf()),
        None => get_config_path(),
    }
}

pub fn load() -> Result<Config> {
    load_with_override(None)
}

/// load the config; a missing file at the default location is created with defaults
pub fn load_with_override(config_override: Option<&Path>) -> Result<Config> {
    let path = get_config_path_with_override(config_override)?;

    if !path.exists() {
        if config_override.is_some() {
            return Err(anyhow!("config file not found: {}", path.display()));
        }
        let config = Config::default();
        save_with_override(&config, None)?;
        return Ok(config);
    }

    read_config(&path)
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    json5::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

pub fn save_with_override(config: &Config, config_override: Option<&Path>) -> Result<()> {
    let path = get_config_path_with_override(config_override)?;

    // ensure directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(&path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(())
}

/// Verify configuration file and return a list of errors
pub fn verify(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(anyhow!("config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: Config = match json5::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            return Err(anyhow!("invalid JSON: {}", e));
        }
    };

    Ok(validate(&config))
}

/// semantic checks on an already parsed config
pub fn validate(config: &Config) -> Vec<String> {
    let mut errors = Vec::new();
    let settings = &config.settings;

    if !(1..=1000).contains(&settings.tick_hz) {
        errors.push(format!(
            "settings.tick_hz: {} out of range (1-1000)",
            settings.tick_hz
        ));
    }

    if settings.poll_interval_ms == 0 {
        errors.push("settings.poll_interval_ms: must be greater than 0".to_string());
    }

    if let Err(e) = EnvFilter::try_new(&settings.log_level) {
        errors.push(format!(
            "settings.log_level: invalid filter '{}': {}",
            settings.log_level, e
        ));
    }

    if let Some(devices) = &config.devices_file {
        if devices.as_os_str().is_empty() {
            errors.push("devices_file: must not be empty".to_string());
        }
    }

    errors
}

pub fn set_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["settings", "tick_hz"] => {
            config.settings.tick_hz = value
                .parse()
                .with_context(|| format!("Invalid number: {}", value))?;
        }
        ["settings", "poll_interval_ms"] => {
            config.settings.poll_interval_ms = value
                .parse()
                .with_context(|| format!("Invalid number: {}", value))?;
        }
        ["settings", "spawn_position", "x"] => {
            config.settings.spawn_position.x = value
                .parse()
                .with_context(|| format!("Invalid number: {}", value))?;
        }
        ["settings", "spawn_position", "y"] => {
            config.settings.spawn_position.y = value
                .parse()
                .with_context(|| format!("Invalid number: {}", value))?;
        }
        ["settings", "log_level"] => {
            EnvFilter::try_new(value)
                .map_err(|e| anyhow!("Invalid log level '{}': {}", value, e))?;
            config.settings.log_level = value.to_string();
        }
        ["devices_file"] => {
            config.devices_file = match value {
                "" | "none" | "null" => None,
                path => Some(PathBuf::from(path)),
            };
        }
        _ => {
            return Err(anyhow!(
                "Unknown config key: {}. Valid keys: settings.tick_hz, settings.poll_interval_ms, settings.spawn_position.x, settings.spawn_position.y, settings.log_level, devices_file",
                key
            ));
        }
    }

    Ok(())
}
