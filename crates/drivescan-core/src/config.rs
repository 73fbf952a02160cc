//! Configuration module
//!
//! Values come from the process environment (optionally seeded from a `.env`
//! file). The resulting `Config` is passed explicitly to every component;
//! nothing reads the environment after startup.

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

// Defaults
const SCAN_INTERVAL_SECS: u64 = 600;
const MAX_CONCURRENT_TRAVERSALS: usize = 1;
const NOTIFY_TIMEOUT_SECS: u64 = 2;
const DRIVE_REQUEST_TIMEOUT_SECS: u64 = 30;
const DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Invalid {
                key: "LOG_FORMAT",
                reason: format!("unknown format '{}'", other),
            }),
        }
    }
}

/// Process configuration.
///
/// The four values a run cannot do without are kept optional here and checked
/// by [`Config::scan_settings`] at the start of every run, so a misconfigured
/// deployment logs an error each cycle instead of refusing to start.
#[derive(Clone)]
pub struct Config {
    pub root_folder_id: Option<String>,
    pub application_name: Option<String>,
    pub api_endpoint: Option<String>,
    pub credentials_base64: Option<String>,
    pub credentials_dir: PathBuf,
    pub scan_interval_secs: u64,
    pub scan_align_to_interval: bool,
    pub max_concurrent_traversals: usize,
    pub notify_timeout_secs: u64,
    pub drive_api_base_url: String,
    pub drive_request_timeout_secs: u64,
    pub environment: String,
    pub log_format: LogFormat,
    /// Values that were set but unusable and replaced by a default. Loading
    /// happens before logging is up, so the caller reports these.
    pub fallbacks: Vec<ConfigError>,
}

/// Validated values required by a single run
#[derive(Clone)]
pub struct ScanSettings {
    pub root_folder_id: String,
    pub application_name: String,
    pub api_endpoint: Url,
    pub credentials_base64: String,
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut fallbacks = Vec::new();
        let log_format = match non_empty("LOG_FORMAT").map(|v| v.parse::<LogFormat>()) {
            Some(Ok(format)) => format,
            Some(Err(e)) => {
                fallbacks.push(e);
                LogFormat::Text
            }
            None => LogFormat::Text,
        };

        Config {
            root_folder_id: non_empty("ROOT_FOLDER_ID"),
            application_name: non_empty("APPLICATION_NAME"),
            api_endpoint: non_empty("API_ENDPOINT"),
            credentials_base64: non_empty("CREDENTIALS"),
            credentials_dir: non_empty("CREDENTIALS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            scan_interval_secs: non_empty("SCAN_INTERVAL_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(SCAN_INTERVAL_SECS),
            scan_align_to_interval: non_empty("SCAN_ALIGN_TO_INTERVAL")
                .map(|v| v.to_lowercase())
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            max_concurrent_traversals: non_empty("SCAN_MAX_CONCURRENT_TRAVERSALS")
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(MAX_CONCURRENT_TRAVERSALS),
            notify_timeout_secs: non_empty("NOTIFY_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(NOTIFY_TIMEOUT_SECS),
            drive_api_base_url: non_empty("DRIVE_API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DRIVE_API_BASE_URL.to_string()),
            drive_request_timeout_secs: non_empty("DRIVE_REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(DRIVE_REQUEST_TIMEOUT_SECS),
            environment: non_empty("ENVIRONMENT")
                .or_else(|| non_empty("APP_ENV"))
                .unwrap_or_else(|| "development".to_string()),
            log_format,
            fallbacks,
        }
    }

    /// Check the values every run needs, in the order they are reported
    pub fn scan_settings(&self) -> Result<ScanSettings, ConfigError> {
        let root_folder_id = self
            .root_folder_id
            .clone()
            .ok_or(ConfigError::Missing("ROOT_FOLDER_ID"))?;
        let application_name = self
            .application_name
            .clone()
            .ok_or(ConfigError::Missing("APPLICATION_NAME"))?;
        let api_endpoint = self
            .api_endpoint
            .as_deref()
            .ok_or(ConfigError::Missing("API_ENDPOINT"))?;
        let api_endpoint = parse_endpoint(api_endpoint)?;
        let credentials_base64 = self
            .credentials_base64
            .clone()
            .ok_or(ConfigError::Missing("CREDENTIALS"))?;

        Ok(ScanSettings {
            root_folder_id,
            application_name,
            api_endpoint,
            credentials_base64,
        })
    }

    pub fn is_production(&self) -> bool {
        matches!(
            self.environment.to_lowercase().as_str(),
            "production" | "prod"
        )
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }

    pub fn drive_request_timeout(&self) -> Duration {
        Duration::from_secs(self.drive_request_timeout_secs)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key: "API_ENDPOINT",
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::Invalid {
            key: "API_ENDPOINT",
            reason: format!("unsupported scheme '{}'", scheme),
        }),
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Config")
            .field("root_folder_id", &self.root_folder_id)
            .field("application_name", &self.application_name)
            .field("api_endpoint", &self.api_endpoint)
            .field(
                "credentials_base64",
                &self.credentials_base64.as_ref().map(|_| "<redacted>"),
            )
            .field("credentials_dir", &self.credentials_dir)
            .field("scan_interval_secs", &self.scan_interval_secs)
            .field("scan_align_to_interval", &self.scan_align_to_interval)
            .field("max_concurrent_traversals", &self.max_concurrent_traversals)
            .field("notify_timeout_secs", &self.notify_timeout_secs)
            .field("drive_api_base_url", &self.drive_api_base_url)
            .field("drive_request_timeout_secs", &self.drive_request_timeout_secs)
            .field("environment", &self.environment)
            .field("log_format", &self.log_format)
            .field("fallbacks", &self.fallbacks)
            .finish()
    }
}

impl Debug for ScanSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ScanSettings")
            .field("root_folder_id", &self.root_folder_id)
            .field("application_name", &self.application_name)
            .field("api_endpoint", &self.api_endpoint.as_str())
            .field("credentials_base64", &"<redacted>")
            .finish()
    }
}
