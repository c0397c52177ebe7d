// Configuration management for Chatbox CLI
//
// Cross-platform config stored in:
// - macOS: ~/Library/Application Support/chatbox/config.json
// - Linux: ~/.config/chatbox/config.json
// - Windows: %APPDATA%\chatbox\config.json

use anyhow::{Context, Result};
use chatbox_core::{LogFormat, StoreLimits, TextPolicy, DEFAULT_LOG_FILE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Append-only message log, relative paths resolve against the working directory
    pub log_path: String,

    /// Field encoding used for the message log
    pub log_format: LogFormat,

    /// How overlong names and message bodies are handled
    pub text_policy: TextPolicy,

    /// Record capacity limits
    pub limits: StoreLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: DEFAULT_LOG_FILE.to_string(),
            log_format: LogFormat::Legacy,
            text_policy: TextPolicy::Truncate,
            limits: StoreLimits::default(),
        }
    }
}

impl Config {
    /// Get the config directory path (cross-platform)
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("chatbox");

        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir)
    }

    /// Get the data directory path (cross-platform)
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to determine data directory")?
            .join("chatbox");

        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        Ok(data_dir)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file()?)
    }

    /// Load config from `path`, or write and return the default if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
            let config: Config =
                serde_json::from_str(&contents).context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Set a config value (in memory; call `save` to persist)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "log_path" => {
                if value.is_empty() {
                    anyhow::bail!("log_path must not be empty");
                }
                self.log_path = value.to_string();
            }
            "log_format" => {
                self.log_format = value.parse().map_err(anyhow::Error::msg)?;
            }
            "text_policy" => {
                self.text_policy = value.parse().map_err(anyhow::Error::msg)?;
            }
            "max_users" => {
                self.limits.max_users = value.parse().context("Invalid number")?;
            }
            "max_messages" => {
                self.limits.max_messages = value.parse().context("Invalid number")?;
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    /// Get a config value
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "log_path" => Some(self.log_path.clone()),
            "log_format" => Some(self.log_format.to_string()),
            "text_policy" => Some(self.text_policy.to_string()),
            "max_users" => Some(self.limits.max_users.to_string()),
            "max_messages" => Some(self.limits.max_messages.to_string()),
            _ => None,
        }
    }

    /// List all config values
    pub fn list(&self) -> Vec<(String, String)> {
        ["log_path", "log_format", "text_policy", "max_users", "max_messages"]
            .iter()
            .filter_map(|key| self.get(key).map(|value| (key.to_string(), value)))
            .collect()
    }
}
