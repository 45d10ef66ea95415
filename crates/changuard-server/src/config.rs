//! Server configuration loading from file and environment variables.

use changuard_monitor::{
    MonitorSettings, DEFAULT_BAN_COUNT_HOURS, DEFAULT_CAPACITY, DEFAULT_RECENT_BANS_LIMIT,
    DEFAULT_SUSPICIOUS_THRESHOLD, DEFAULT_SUSPICIOUS_WINDOW_HOURS,
};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Event monitor settings.
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "changuard_monitor=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Event monitor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Maximum number of events kept in memory.
    pub capacity: usize,
    /// Bans within the window above which a moderator is flagged.
    pub suspicious_threshold: usize,
    /// Length of the burst-ban window in hours.
    pub suspicious_window_hours: u32,
    /// Default page size for ban reports.
    pub recent_bans_limit: usize,
    /// Default window for per-moderator ban counts.
    pub ban_count_hours: u32,
}

impl MonitorConfig {
    /// Settings for constructing the event monitor.
    pub fn settings(&self) -> MonitorSettings {
        MonitorSettings {
            capacity: self.capacity,
            suspicious_threshold: self.suspicious_threshold,
            suspicious_window_hours: self.suspicious_window_hours,
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            suspicious_threshold: DEFAULT_SUSPICIOUS_THRESHOLD,
            suspicious_window_hours: DEFAULT_SUSPICIOUS_WINDOW_HOURS,
            recent_bans_limit: DEFAULT_RECENT_BANS_LIMIT,
            ban_count_hours: DEFAULT_BAN_COUNT_HOURS,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `CHANGUARD_HOST` overrides `server.host`
/// - `CHANGUARD_PORT` overrides `server.port`
/// - `CHANGUARD_LOG_LEVEL` overrides `logging.level`
/// - `CHANGUARD_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `CHANGUARD_MONITOR_CAPACITY` overrides `monitor.capacity`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed,
/// or if the resulting configuration is invalid.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

/// Applies `CHANGUARD_*` overrides, reading each variable through `lookup`.
///
/// Values that fail to parse leave the setting unchanged.
fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(host) = lookup("CHANGUARD_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = lookup("CHANGUARD_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(level) = lookup("CHANGUARD_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("CHANGUARD_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(capacity) = lookup("CHANGUARD_MONITOR_CAPACITY") {
        if let Ok(parsed) = capacity.parse() {
            config.monitor.capacity = parsed;
        }
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.monitor.capacity == 0 {
        return Err(ConfigError::Invalid(
            "monitor.capacity must be greater than zero".to_string(),
        ));
    }
    if config.monitor.recent_bans_limit == 0 {
        return Err(ConfigError::Invalid(
            "monitor.recent_bans_limit must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
