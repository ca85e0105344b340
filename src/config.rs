//! Runtime configuration read from the environment (and `.env` via dotenv)

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use crate::api::FixerClient;
use crate::models::{CurrencyPair, Interval, Session};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_key: Option<String>,
    /// Default selection, overridden by command arguments
    pub session: Session,
    pub request_timeout: Duration,
    pub max_requests_per_second: usize,
    pub chart_output: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let source = get("EXCHANGE_SOURCE").unwrap_or_else(|| "USD".to_string());
        let target = get("EXCHANGE_TARGET").unwrap_or_else(|| "GBP".to_string());
        let pair = CurrencyPair::new(&source, &target).map_err(|message| ConfigError::Invalid {
            key: "EXCHANGE_SOURCE/EXCHANGE_TARGET",
            message,
        })?;

        let interval = match get("EXCHANGE_INTERVAL") {
            Some(value) => Interval::parse(&value).map_err(|message| ConfigError::Invalid {
                key: "EXCHANGE_INTERVAL",
                message,
            })?,
            None => Interval::Week,
        };

        let mut session = Session::new(interval, pair);
        session.cascade_tiers = parse_flag("EXCHANGE_CASCADE_TIERS", get("EXCHANGE_CASCADE_TIERS"))?;

        let timeout_secs: u64 = parse_or("EXCHANGE_TIMEOUT_SECS", get("EXCHANGE_TIMEOUT_SECS"), 10)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "EXCHANGE_TIMEOUT_SECS",
                message: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            api_base_url: get("EXCHANGE_API_URL").unwrap_or_else(|| FixerClient::DEFAULT_BASE_URL.to_string()),
            api_key: get("EXCHANGE_API_KEY"),
            session,
            request_timeout: Duration::from_secs(timeout_secs),
            max_requests_per_second: parse_or("EXCHANGE_MAX_RPS", get("EXCHANGE_MAX_RPS"), 5)?,
            chart_output: get("CHART_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("exchange_chart.png")),
            chart_width: parse_or("CHART_WIDTH", get("CHART_WIDTH"), 1024)?,
            chart_height: parse_or("CHART_HEIGHT", get("CHART_HEIGHT"), 600)?,
        })
    }

    /// HTTP rate source configured from these settings
    pub fn rate_client(&self) -> FixerClient {
        FixerClient::with_base_url(self.api_base_url.clone())
            .with_access_key(self.api_key.clone())
            .with_max_requests_per_second(self.max_requests_per_second)
    }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: format!("'{}': {}", raw, e),
        }),
        None => Ok(default),
    }
}

fn parse_flag(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::to_lowercase).as_deref() {
        None | Some("0") | Some("false") | Some("no") | Some("off") => Ok(false),
        Some("1") | Some("true") | Some("yes") | Some("on") => Ok(true),
        Some(other) => Err(ConfigError::Invalid {
            key,
            message: format!("'{}' is not a boolean", other),
        }),
    }
}
