//! Configuration for the alimi watcher
//!
//! All runtime settings live in an explicit [`Config`] object that is built
//! once at startup and handed to the watcher; nothing reads the environment
//! after that point.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Production event listing page
pub const DEFAULT_TARGET_URL: &str = "https://www.ff14.co.kr/news/event";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Event page source configuration
    pub source: SourceConfig,

    /// Webhook notifier configuration
    pub notifier: NotifierConfig,

    /// Poll cycle configuration
    pub watcher: WatcherConfig,
}

/// Event page source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the event listing page
    pub target_url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum retry attempts for a single fetch
    pub max_retries: u32,
}

/// Webhook notifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Destination webhook URL; absent means notifications are disabled
    /// and the watcher runs with a logging no-op notifier
    pub webhook_url: Option<String>,

    /// Per-delivery timeout in seconds
    pub timeout_secs: u64,

    /// Pause between consecutive deliveries in seconds (webhook rate limits)
    pub pause_secs: u64,
}

/// Poll cycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Path of the persisted latest-event marker file
    pub state_path: PathBuf,

    /// Seconds between poll cycles
    pub poll_interval_secs: u64,

    /// Longer pause after an unexpected cycle error
    pub error_backoff_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Recognized variables: `DISCORD_WEBHOOK_URL`, `ALIMI_TARGET_URL`,
    /// `ALIMI_STATE_PATH`, `ALIMI_POLL_INTERVAL`, `ALIMI_REQUEST_TIMEOUT`.
    /// Everything else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        let target_url =
            std::env::var("ALIMI_TARGET_URL").unwrap_or_else(|_| DEFAULT_TARGET_URL.to_string());

        let request_timeout_secs = std::env::var("ALIMI_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        let webhook_url = std::env::var("DISCORD_WEBHOOK_URL")
            .ok()
            .filter(|v| !v.is_empty());

        let state_path = std::env::var("ALIMI_STATE_PATH")
            .unwrap_or_else(|_| String::from("latest_event.json"))
            .into();

        let poll_interval_secs = std::env::var("ALIMI_POLL_INTERVAL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let config = Self {
            source: SourceConfig {
                target_url,
                request_timeout_secs,
                max_retries: 3,
            },
            notifier: NotifierConfig {
                webhook_url,
                timeout_secs: 5,
                pause_secs: 1,
            },
            watcher: WatcherConfig {
                state_path,
                poll_interval_secs,
                error_backoff_secs: 60,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.source.target_url.is_empty() {
            anyhow::bail!("target_url must not be empty");
        }

        if self.source.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.watcher.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be greater than 0");
        }

        if self.notifier.timeout_secs == 0 {
            anyhow::bail!("notifier timeout_secs must be greater than 0");
        }

        if let Some(url) = &self.notifier.webhook_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("webhook_url must start with http:// or https://");
            }
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.request_timeout_secs)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.watcher.poll_interval_secs)
    }

    /// Get error backoff as Duration
    #[must_use]
    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.watcher.error_backoff_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                target_url: DEFAULT_TARGET_URL.to_string(),
                request_timeout_secs: 10,
                max_retries: 3,
            },
            notifier: NotifierConfig {
                webhook_url: None,
                timeout_secs: 5,
                pause_secs: 1,
            },
            watcher: WatcherConfig {
                state_path: PathBuf::from("latest_event.json"),
                poll_interval_secs: 60,
                error_backoff_secs: 60,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.source.target_url, DEFAULT_TARGET_URL);
        assert!(config.notifier.webhook_url.is_none());
    }

    #[test]
    fn test_invalid_poll_interval() {
        let mut config = Config::default();
        config.watcher.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_webhook_url() {
        let mut config = Config::default();
        config.notifier.webhook_url = Some("hooks.example.com/x".to_string());
        assert!(config.validate().is_err());

        config.notifier.webhook_url = Some("https://hooks.example.com/x".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duration_conversions() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.error_backoff(), Duration::from_secs(60));
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
            [source]
            target_url = "https://example.com/events"
            request_timeout_secs = 7
            max_retries = 2

            [notifier]
            webhook_url = "https://hooks.example.com/abc"
            timeout_secs = 5
            pause_secs = 2

            [watcher]
            state_path = "state.json"
            poll_interval_secs = 120
            error_backoff_secs = 300
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.watcher.poll_interval_secs, 120);
        assert_eq!(config.notifier.pause_secs, 2);
    }
}
