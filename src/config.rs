//! Configuration loading
//!
//! TOML file with the monitored endpoints, the bot token, and the monitor
//! interval. Loaded once at startup and passed down as owned data; invalid
//! configuration refuses to start the process.

use crate::logger::{self, LogTag};
use crate::probe::{Endpoint, Protocol};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("no endpoints configured - at least one [[endpoints]] entry is required")]
    NoEndpoints,
    #[error("telegram.bot_token is empty - get a token from @BotFather")]
    MissingBotToken,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub store: StoreConfig,
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather
    pub bot_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between monitoring cycles
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

fn default_check_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path of the subscriber database file
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "data/subscribers.db".to_string()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().display().to_string();

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path_str.clone(),
            source,
        })?;

        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path_str,
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }

        if self.telegram.bot_token.is_empty() {
            return Err(ConfigError::MissingBotToken);
        }

        // A missing role aggregates as unreachable, which pins the verdict.
        // Worth a loud warning but not a startup failure.
        for protocol in [Protocol::Signaling, Protocol::Relay, Protocol::Peer] {
            if !self.endpoints.iter().any(|e| e.protocol == protocol) {
                logger::warning(
                    LogTag::Config,
                    &format!(
                        "No {} endpoint configured - it will count as unreachable",
                        protocol.as_str()
                    ),
                );
            }
        }

        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.check_interval_secs)
    }
}
