use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// Log output format selected by `LOG_FORMAT`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Upper bound for a single store call, in milliseconds
    pub store_timeout_ms: u64,
    /// Whole-request timeout, in seconds
    pub request_timeout: u64,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 8080,
            database_url: String::new(),
            max_connections: 10,
            min_connections: 1,
            db_acquire_timeout_secs: 3,
            store_timeout_ms: 5_000,
            request_timeout: 30,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = Config::default();

        let config = Config {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parse_or("PORT", env::var("PORT").ok(), defaults.port)?,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow!("DATABASE_URL environment variable is required"))?,
            max_connections: parse_or(
                "MAX_CONNECTIONS",
                env::var("MAX_CONNECTIONS").ok(),
                defaults.max_connections,
            )?,
            min_connections: parse_or(
                "MIN_CONNECTIONS",
                env::var("MIN_CONNECTIONS").ok(),
                defaults.min_connections,
            )?,
            db_acquire_timeout_secs: parse_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                env::var("DB_ACQUIRE_TIMEOUT_SECS").ok(),
                defaults.db_acquire_timeout_secs,
            )?,
            store_timeout_ms: parse_or(
                "STORE_TIMEOUT_MS",
                env::var("STORE_TIMEOUT_MS").ok(),
                defaults.store_timeout_ms,
            )?,
            request_timeout: parse_or(
                "REQUEST_TIMEOUT",
                env::var("REQUEST_TIMEOUT").ok(),
                defaults.request_timeout,
            )?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: parse_or("LOG_FORMAT", env::var("LOG_FORMAT").ok(), defaults.log_format)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// The store deadline must expire before the whole-request timeout, so a
    /// slow store surfaces as a classified store timeout.
    pub fn validate(&self) -> Result<()> {
        if self.store_timeout_ms == 0 {
            return Err(anyhow!("STORE_TIMEOUT_MS must be greater than 0"));
        }
        if u128::from(self.store_timeout_ms) >= self.request_timeout().as_millis() {
            return Err(anyhow!(
                "STORE_TIMEOUT_MS ({}) must be less than REQUEST_TIMEOUT ({}s)",
                self.store_timeout_ms,
                self.request_timeout
            ));
        }
        Ok(())
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Parse an optional raw value, falling back to `default` when unset.
/// A value that is present but malformed is an error.
fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid value for {}: {:?} ({})", name, value, e)),
    }
}
