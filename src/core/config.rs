//! Configuration management

use crate::hid::protocol::{PRODUCT_ID, VENDOR_ID};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// HID device configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HidConfig {
    /// USB Vendor ID
    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,
    /// USB Product ID
    #[serde(default = "default_product_id")]
    pub product_id: u16,
}

fn default_vendor_id() -> u16 {
    VENDOR_ID
}
fn default_product_id() -> u16 {
    PRODUCT_ID
}

impl Default for HidConfig {
    fn default() -> Self {
        Self {
            vendor_id: default_vendor_id(),
            product_id: default_product_id(),
        }
    }
}

/// Request/response pacing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Delay after each write before the pedal is polled (ms)
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Timeout of a single poll read (ms, 0 = non-blocking), capped by the
    /// remaining response budget
    #[serde(default)]
    pub poll_timeout_ms: u32,
    /// Total time allowed for a response after the settle delay (ms)
    #[serde(default = "default_response_timeout")]
    pub response_timeout_ms: u64,
    /// Upper bound on stale reports discarded before a request
    #[serde(default = "default_max_stale_reports")]
    pub max_stale_reports: usize,
}

fn default_settle_ms() -> u64 {
    5
}
fn default_response_timeout() -> u64 {
    50
}
fn default_max_stale_reports() -> usize {
    8
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            poll_timeout_ms: 0,
            response_timeout_ms: default_response_timeout(),
            max_stale_reports: default_max_stale_reports(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// HID device configuration
    #[serde(default)]
    pub hid: HidConfig,
    /// Timing configuration
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, falling back to defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "sourceaudio", "c4-hid")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.hid.vendor_id, 0x29a4);
        assert_eq!(config.hid.product_id, 0x0302);
        assert_eq!(config.timing.settle_ms, 5);
        assert_eq!(config.timing.poll_timeout_ms, 0);
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str("[timing]\nsettle_ms = 25\n").unwrap();
        assert_eq!(config.timing.settle_ms, 25);
        assert_eq!(config.timing.response_timeout_ms, 50);
        assert_eq!(config.hid, HidConfig::default());
    }

    #[test]
    fn test_negative_poll_timeout_rejected() {
        assert!(toml::from_str::<Config>("[timing]\npoll_timeout_ms = -1\n").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.timing.response_timeout_ms = 200;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[hid]\nvendor_id = \"nope\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
