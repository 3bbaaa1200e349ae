//! Bot configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

use restock_types::TriggerSet;

/// Top-level bot configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Health endpoint network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Notion connection and property schema.
    #[serde(default)]
    pub notion: NotionSettings,

    /// Telegram connection and command interface.
    #[serde(default)]
    pub telegram: TelegramSettings,

    /// Watch loop tunables.
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Network configuration for the health endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Busy timeout for SQLite connections, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled SQLite connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "restock_bot=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Notion API connection and the property names of the watched database.
#[derive(Debug, Clone, Deserialize)]
pub struct NotionSettings {
    /// Base API URL. Only overridden in tests.
    #[serde(default = "default_notion_api_url")]
    pub api_url: String,

    /// Integration token. Required.
    #[serde(default)]
    pub token: String,

    /// Database to watch. Required.
    #[serde(default)]
    pub database_id: String,

    /// Title property candidates, tried in order.
    #[serde(default = "default_title_candidates")]
    pub title_candidates: Vec<String>,

    /// Name of the group `select` property.
    #[serde(default = "default_group_property")]
    pub group_property: String,

    /// Name of the status `select` property.
    #[serde(default = "default_status_property")]
    pub status_property: String,
}

/// Telegram Bot API connection and the command keyboard.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSettings {
    /// Base API URL. Only overridden in tests.
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,

    /// Bot token. Required.
    #[serde(default)]
    pub token: String,

    /// Seconds the `getUpdates` long poll is held open server-side.
    #[serde(default = "default_poll_timeout_seconds")]
    pub poll_timeout_seconds: u64,

    /// Group buttons offered on the reply keyboard.
    #[serde(default = "default_groups")]
    pub groups: Vec<String>,

    /// Label of the show-everything button.
    #[serde(default = "default_all_label")]
    pub all_label: String,
}

/// Watch loop configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Seconds between poll cycles. Zero disables the watch loop.
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,

    /// Seconds to wait before the first cycle.
    #[serde(default = "default_startup_delay_seconds")]
    pub startup_delay_seconds: u64,

    /// Seconds subtracted from the watermark at fetch time, against clock
    /// skew between this process and the remote.
    #[serde(default = "default_window_margin_seconds")]
    pub window_margin_seconds: u64,

    /// Statuses that fire alerts.
    #[serde(default = "default_trigger_statuses")]
    pub trigger_statuses: TriggerSet,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "restock.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_notion_api_url() -> String {
    "https://api.notion.com".to_string()
}

fn default_title_candidates() -> Vec<String> {
    vec!["Name".to_string()]
}

fn default_group_property() -> String {
    "Group".to_string()
}

fn default_status_property() -> String {
    "Status".to_string()
}

fn default_telegram_api_url() -> String {
    restock_telegram::TELEGRAM_API_URL.to_string()
}

fn default_poll_timeout_seconds() -> u64 {
    30
}

fn default_groups() -> Vec<String> {
    vec![
        "Health".to_string(),
        "Work".to_string(),
        "Study".to_string(),
    ]
}

fn default_all_label() -> String {
    "All".to_string()
}

fn default_poll_interval_seconds() -> u64 {
    120
}

fn default_startup_delay_seconds() -> u64 {
    10
}

fn default_window_margin_seconds() -> u64 {
    60
}

fn default_trigger_statuses() -> TriggerSet {
    TriggerSet::new(["Expiring", "Depleted"])
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
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

impl Default for NotionSettings {
    fn default() -> Self {
        Self {
            api_url: default_notion_api_url(),
            token: String::new(),
            database_id: String::new(),
            title_candidates: default_title_candidates(),
            group_property: default_group_property(),
            status_property: default_status_property(),
        }
    }
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_url: default_telegram_api_url(),
            token: String::new(),
            poll_timeout_seconds: default_poll_timeout_seconds(),
            groups: default_groups(),
            all_label: default_all_label(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval_seconds(),
            startup_delay_seconds: default_startup_delay_seconds(),
            window_margin_seconds: default_window_margin_seconds(),
            trigger_statuses: default_trigger_statuses(),
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

    /// A required value was neither configured nor provided by environment.
    #[error("missing required config value: {0}")]
    Missing(&'static str),
}

impl Config {
    /// Checks that the values without usable defaults are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notion.token.trim().is_empty() {
            return Err(ConfigError::Missing("notion.token"));
        }
        if self.notion.database_id.trim().is_empty() {
            return Err(ConfigError::Missing("notion.database_id"));
        }
        if self.telegram.token.trim().is_empty() {
            return Err(ConfigError::Missing("telegram.token"));
        }
        Ok(())
    }
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `RESTOCK_HOST` overrides `server.host`
/// - `RESTOCK_PORT` overrides `server.port`
/// - `RESTOCK_DB_PATH` overrides `database.path`
/// - `RESTOCK_LOG_LEVEL` overrides `logging.level`
/// - `RESTOCK_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `RESTOCK_NOTION_TOKEN` overrides `notion.token`
/// - `RESTOCK_NOTION_DATABASE_ID` overrides `notion.database_id`
/// - `RESTOCK_TELEGRAM_TOKEN` overrides `telegram.token`
/// - `RESTOCK_POLL_INTERVAL_SECONDS` overrides `watch.poll_interval_seconds`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
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

    // Environment variable overrides
    if let Ok(host) = std::env::var("RESTOCK_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("RESTOCK_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(db_path) = std::env::var("RESTOCK_DB_PATH") {
        config.database.path = db_path;
    }
    if let Ok(level) = std::env::var("RESTOCK_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("RESTOCK_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Ok(token) = std::env::var("RESTOCK_NOTION_TOKEN") {
        config.notion.token = token;
    }
    if let Ok(database_id) = std::env::var("RESTOCK_NOTION_DATABASE_ID") {
        config.notion.database_id = database_id;
    }
    if let Ok(token) = std::env::var("RESTOCK_TELEGRAM_TOKEN") {
        config.telegram.token = token;
    }
    if let Ok(interval) = std::env::var("RESTOCK_POLL_INTERVAL_SECONDS") {
        if let Ok(parsed) = interval.parse() {
            config.watch.poll_interval_seconds = parsed;
        }
    }

    Ok(config)
}
