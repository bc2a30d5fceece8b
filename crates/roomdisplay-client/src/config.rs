//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/roomdisplay/config.toml` by default:
//!
//! ```toml
//! timezone = "Europe/Paris"
//! poll_interval_secs = 60
//! log_format = "json"
//!
//! [feed]
//! url = "https://calendar.example.com/rooms/4.02.ics"
//!
//! [display]
//! space_name = "Room 4.02"
//! time_format = "h24"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use roomdisplay_core::{DisplayOptions, TracingConfig, TracingOutputFormat};
use roomdisplay_providers::{FeedConfig, FeedSource};
use serde::{Deserialize, Serialize};

/// Configuration for the roomdisplay client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// IANA timezone of the room; the process timezone when unset.
    pub timezone: Option<String>,

    /// Seconds between polls in watch mode.
    pub poll_interval_secs: u64,

    /// Debug mode.
    pub debug: bool,

    /// Log output format: `compact`, `pretty` or `json`.
    pub log_format: Option<TracingOutputFormat>,

    /// Feed settings.
    pub feed: FeedSettings,

    /// Display settings.
    pub display: DisplayOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timezone: None,
            poll_interval_secs: 60,
            debug: false,
            log_format: None,
            feed: FeedSettings::default(),
            display: DisplayOptions::default(),
        }
    }
}

/// Where and how to fetch the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// iCal feed URL.
    pub url: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// User agent override.
    pub user_agent: Option<String>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: FeedConfig::DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl FeedSettings {
    /// Builds the provider configuration for `source`.
    pub fn to_provider_config(&self, source: FeedSource) -> FeedConfig {
        let config = FeedConfig::new(source).with_timeout(Duration::from_secs(self.timeout_secs));
        match self.user_agent {
            Some(ref user_agent) => config.with_user_agent(user_agent),
            None => config,
        }
    }

    /// Parses the configured URL, if any.
    pub fn source(&self) -> Result<Option<FeedSource>, String> {
        self.url
            .as_deref()
            .map(|url| FeedSource::from_url(url).map_err(|e| e.to_string()))
            .transpose()
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("roomdisplay")
    }

    /// Parses the configured timezone; `None` means the process timezone.
    pub fn timezone(&self) -> Result<Option<Tz>, String> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|e| format!("invalid timezone {:?}: {}", name, e))
            })
            .transpose()
    }

    /// The watch-mode poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Logging setup: debug output when asked for, JSON logs for the
    /// unattended watch loop, quiet otherwise. `log_format` overrides the format.
    pub fn tracing_config(&self, debug: bool, watching: bool) -> TracingConfig {
        let config = if debug || self.debug {
            TracingConfig::debug()
        } else if watching {
            TracingConfig::kiosk()
        } else {
            TracingConfig::default()
        };

        match self.log_format {
            Some(format) => config.with_format(format),
            None => config,
        }
    }

    /// Checks every setting that is parsed lazily.
    pub fn validate(&self) -> Result<(), String> {
        self.timezone()?;
        self.feed.source()?;

        if self.poll_interval_secs == 0 {
            return Err("poll_interval_secs must be greater than zero".to_string());
        }
        if self.feed.timeout_secs == 0 {
            return Err("feed timeout_secs must be greater than zero".to_string());
        }
        if self.display.max_title_length == Some(0) {
            return Err("display max_title_length must be greater than zero".to_string());
        }
        Ok(())
    }
}
