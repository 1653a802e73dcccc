//! Client configuration: backend location, endpoint paths, per-step timeouts
//! and loading-overlay pacing.
//!
//! Loaded from TOML with every field defaulted, so an empty file is valid.
//! `KORA_BASE_URL` overrides the file; CLI flags override both.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const BASE_URL_ENV: &str = "KORA_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub endpoints: Endpoints,
    pub timeouts: Timeouts,
    pub loading: LoadingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoints: Endpoints::default(),
            timeouts: Timeouts::default(),
            loading: LoadingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub collect: String,
    pub analyze: String,
    pub answer: String,
    pub save: String,
    pub chat: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            collect: "/api/report/data".to_string(),
            analyze: "/api/report/analyze".to_string(),
            answer: "/api/report/answer".to_string(),
            save: "/api/reports/save".to_string(),
            chat: "/api/report/chat".to_string(),
        }
    }
}

/// Per-step request timeouts in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub collect: u64,
    pub analyze: u64,
    pub answer: u64,
    pub save: u64,
    pub chat: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            collect: 120,
            analyze: 180,
            answer: 60,
            save: 30,
            chat: 60,
        }
    }
}

impl Timeouts {
    fn all(&self) -> [(&'static str, u64); 5] {
        [
            ("collect", self.collect),
            ("analyze", self.analyze),
            ("answer", self.answer),
            ("save", self.save),
            ("chat", self.chat),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Rotation interval of the loading messages.
    pub message_interval_ms: u64,
    /// Delay between consecutive section reveals.
    pub reveal_delay_ms: u64,
    /// Pause at 100 % before the overlay is hidden.
    pub settle_ms: u64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            message_interval_ms: 2000,
            reveal_delay_ms: 150,
            settle_ms: 500,
        }
    }
}

impl LoadingConfig {
    pub fn message_interval(&self) -> Duration {
        Duration::from_millis(self.message_interval_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// No pauses at all; used by headless runs and tests.
    pub fn instant() -> Self {
        Self {
            message_interval_ms: 2000,
            reveal_delay_ms: 0,
            settle_ms: 0,
        }
    }
}

impl ClientConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// File (if given) then environment. A missing file is an error; no file
    /// means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(std::env::var(BASE_URL_ENV).ok().as_deref())?;
        Ok(config)
    }

    /// Apply the `KORA_BASE_URL` value, if set and non-blank.
    pub fn apply_env(&mut self, base_url: Option<&str>) -> Result<(), ConfigError> {
        if let Some(url) = base_url.map(str::trim).filter(|u| !u.is_empty()) {
            self.set_base_url(url)?;
        }
        Ok(())
    }

    pub fn set_base_url(&mut self, url: &str) -> Result<(), ConfigError> {
        validate_base_url(url)?;
        self.base_url = url.trim_end_matches('/').to_string();
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_base_url(&self.base_url)?;
        for (step, secs) in self.timeouts.all() {
            if secs == 0 {
                return Err(ConfigError::Invalid(format!(
                    "timeouts.{step} must be greater than zero"
                )));
            }
        }
        Ok(())
    }

    /// Absolute URL for an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

fn validate_base_url(url: &str) -> Result<(), ConfigError> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    match rest {
        Some(host) if !host.trim_matches('/').is_empty() => Ok(()),
        _ => Err(ConfigError::Invalid(format!(
            "base_url must be an http(s) URL, got '{url}'"
        ))),
    }
}
