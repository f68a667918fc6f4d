//! Configuration management for vuut.
//!
//! Loads configuration from ${VUUT_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::chat::ChannelId;

/// Returns the embedded default config template.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for vuut configuration and log files.
    //!
    //! VUUT_HOME resolution order:
    //! 1. VUUT_HOME environment variable (if set)
    //! 2. ~/.config/vuut (default)

    use std::env;
    use std::path::PathBuf;

    /// Returns the vuut home directory.
    pub fn vuut_home() -> PathBuf {
        if let Ok(home) = env::var("VUUT_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map_or_else(|| PathBuf::from(".vuut"), |h| h.join(".config").join("vuut"))
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        vuut_home().join("config.toml")
    }

    /// Returns the default log file path.
    pub fn log_path() -> PathBuf {
        vuut_home().join("vuut.log")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Width of the timestamp/author column including the separator.
    pub prefix_len: usize,
    /// Messages replayed when a channel page is first opened.
    pub history_limit: usize,
    pub modal_border: bool,
    pub output_border: bool,
    pub input_border: bool,
    pub disable_message_send: bool,
    /// Connect to the chat platform on startup.
    pub start_bot: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_channel: Option<ChannelId>,
    pub notifications: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Display name of the local identity.
    pub user_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix_len: 32,
            history_limit: 100,
            modal_border: true,
            output_border: true,
            input_border: true,
            disable_message_send: false,
            start_bot: true,
            target_channel: None,
            notifications: false,
            log_file: None,
            user_name: "me".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Log file from config, or the default under VUUT_HOME.
    pub fn effective_log_file(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(paths::log_path)
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.prefix_len, 32);
        assert_eq!(config.history_limit, 100);
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "prefix_len = 24\ntarget_channel = 1002\ndisable_message_send = true\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.prefix_len, 24);
        assert_eq!(config.target_channel, Some(ChannelId(1002)));
        assert!(config.disable_message_send);
        assert!(config.start_bot);
        assert_eq!(config.user_name, "me");
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "prefix_len = \"wide\"\n").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("prefix_len = 32"));
        assert!(contents.contains("# target_channel ="));
        assert_eq!(Config::load_from(&config_path).unwrap(), Config::default());
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "").unwrap();

        let result = Config::init(&config_path);
        assert!(result.is_err());
    }

    #[test]
    fn test_effective_log_file_prefers_config() {
        let config = Config {
            log_file: Some(PathBuf::from("/tmp/custom.log")),
            ..Config::default()
        };
        assert_eq!(config.effective_log_file(), PathBuf::from("/tmp/custom.log"));
    }
}
