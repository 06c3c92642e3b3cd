use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub batch: BatchScheduleConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let enabled = match env::var("APP_BATCH_ENABLED") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidBatchFlag(raw))?,
            Err(_) => true,
        };
        let interval_hours = env::var("APP_BATCH_INTERVAL_HOURS")
            .unwrap_or_else(|_| DEFAULT_BATCH_INTERVAL_HOURS.to_string())
            .parse::<u64>()
            .ok()
            .filter(|hours| *hours > 0)
            .ok_or(ConfigError::InvalidBatchInterval)?;
        let reminder_interval_hours = env::var("APP_REMINDER_INTERVAL_HOURS")
            .unwrap_or_else(|_| DEFAULT_REMINDER_INTERVAL_HOURS.to_string())
            .parse::<u64>()
            .ok()
            .filter(|hours| *hours > 0)
            .ok_or(ConfigError::InvalidReminderInterval)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            batch: BatchScheduleConfig {
                enabled,
                interval_hours,
                reminder_interval_hours,
            },
        })
    }
}

const DEFAULT_BATCH_INTERVAL_HOURS: u64 = 24 * 7;
const DEFAULT_REMINDER_INTERVAL_HOURS: u64 = 24;

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Cadence of the periodic re-assessment and milestone reminder runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchScheduleConfig {
    pub enabled: bool,
    pub interval_hours: u64,
    pub reminder_interval_hours: u64,
}

impl BatchScheduleConfig {
    pub fn interval(&self) -> Duration {
        hours(self.interval_hours)
    }

    pub fn reminder_interval(&self) -> Duration {
        hours(self.reminder_interval_hours)
    }
}

fn hours(count: u64) -> Duration {
    Duration::from_secs(count.saturating_mul(60 * 60))
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidBatchFlag(String),
    InvalidBatchInterval,
    InvalidReminderInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBatchFlag(raw) => {
                write!(f, "APP_BATCH_ENABLED must be true or false (found '{raw}')")
            }
            ConfigError::InvalidBatchInterval => {
                write!(f, "APP_BATCH_INTERVAL_HOURS must be a positive number of hours")
            }
            ConfigError::InvalidReminderInterval => {
                write!(f, "APP_REMINDER_INTERVAL_HOURS must be a positive number of hours")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidBatchFlag(_)
            | ConfigError::InvalidBatchInterval
            | ConfigError::InvalidReminderInterval => None,
        }
    }
}
