//! Configuration management for tablebook
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::booking::{BookingSettings, OperatingCalendar};
use crate::remote::ClientConfig;

/// Hosted reservation backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://rr-backend-98sd.onrender.com";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote authority configuration
    pub remote: RemoteConfig,

    /// Local storage configuration
    pub storage: StorageConfig,

    /// Booking rules
    pub booking: BookingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Remote authority configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the reservation server
    pub base_url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Retries for idempotent reads (availability, listings)
    pub retry_count: u32,

    /// Base delay between retries in milliseconds
    pub retry_delay_ms: u64,

    /// User agent string
    pub user_agent: String,
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the ledger and session documents
    pub data_dir: PathBuf,
}

/// Booking rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Venue name used in confirmations
    pub venue_name: String,

    /// Minutes covered by one slot
    pub step_minutes: u32,

    /// Weekdays the venue never opens (e.g. "Tue")
    pub closed_weekdays: Vec<String>,

    /// Largest bookable party
    pub max_party_size: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let base_url =
            std::env::var("TABLEBOOK_API_URL").unwrap_or_else(|_| defaults.remote.base_url.clone());

        let request_timeout_secs = std::env::var("TABLEBOOK_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.remote.request_timeout_secs);

        let retry_count = std::env::var("TABLEBOOK_RETRY_COUNT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.remote.retry_count);

        let data_dir = std::env::var("TABLEBOOK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| defaults.storage.data_dir.clone());

        let step_minutes = std::env::var("TABLEBOOK_SLOT_MINUTES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.booking.step_minutes);

        let closed_weekdays = std::env::var("TABLEBOOK_CLOSED_WEEKDAYS")
            .map(|v| {
                v.split(',')
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| defaults.booking.closed_weekdays.clone());

        let log_level =
            std::env::var("TABLEBOOK_LOG_LEVEL").unwrap_or_else(|_| defaults.logging.level.clone());

        let log_format = std::env::var("TABLEBOOK_LOG_FORMAT")
            .unwrap_or_else(|_| defaults.logging.format.clone());

        Ok(Self {
            remote: RemoteConfig {
                base_url,
                request_timeout_secs,
                retry_count,
                ..defaults.remote
            },
            storage: StorageConfig { data_dir },
            booking: BookingConfig {
                step_minutes,
                closed_weekdays,
                ..defaults.booking
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.remote.base_url.trim().is_empty() {
            anyhow::bail!("remote.base_url must not be empty");
        }

        if self.booking.step_minutes == 0 {
            anyhow::bail!("step_minutes must be greater than 0");
        }

        if self.booking.max_party_size == 0 {
            anyhow::bail!("max_party_size must be greater than 0");
        }

        self.closed_weekdays()?;

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.request_timeout_secs)
    }

    /// Parsed non-operating weekdays
    pub fn closed_weekdays(&self) -> Result<Vec<Weekday>> {
        self.booking
            .closed_weekdays
            .iter()
            .map(|d| {
                d.parse::<Weekday>()
                    .map_err(|_| anyhow::anyhow!("Invalid weekday in closed_weekdays: {d}"))
            })
            .collect()
    }

    /// Operating calendar built from `closed_weekdays`
    pub fn calendar(&self) -> Result<OperatingCalendar> {
        Ok(OperatingCalendar::closed_on(self.closed_weekdays()?))
    }

    /// HTTP client settings for the remote authority
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            user_agent: self.remote.user_agent.clone(),
            ..ClientConfig::new(self.remote.base_url.clone())
        }
        .with_timeout(self.request_timeout())
        .with_retry_count(self.remote.retry_count)
        .with_retry_delay(Duration::from_millis(self.remote.retry_delay_ms))
    }

    /// Venue settings for booking submissions
    pub fn booking_settings(&self) -> BookingSettings {
        BookingSettings {
            venue_name: self.booking.venue_name.clone(),
            step_minutes: self.booking.step_minutes,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: RemoteConfig {
                base_url: String::from(DEFAULT_API_URL),
                request_timeout_secs: 30,
                retry_count: 0,
                retry_delay_ms: 500,
                user_agent: format!("tablebook/{}", env!("CARGO_PKG_VERSION")),
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("data"),
            },
            booking: BookingConfig {
                venue_name: String::from("Paris Pub"),
                step_minutes: 30,
                closed_weekdays: vec![String::from("Tue"), String::from("Wed")],
                max_party_size: 8,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}
