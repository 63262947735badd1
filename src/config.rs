use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::core::EngineSettings;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub engine: EngineConfig,
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    #[serde(default = "default_daily_swipe_limit")]
    pub daily_swipe_limit: i64,
    #[serde(default = "default_premium_duration_days")]
    pub premium_duration_days: i64,
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            daily_swipe_limit: default_daily_swipe_limit(),
            premium_duration_days: default_premium_duration_days(),
            utc_offset_minutes: 0,
            operation_timeout_secs: default_operation_timeout_secs(),
        }
    }
}

const MAX_PREMIUM_DURATION_DAYS: i64 = 3650;

fn default_page_size() -> u32 { 10 }
fn default_max_page_size() -> u32 { 100 }
fn default_daily_swipe_limit() -> i64 { 10 }
fn default_premium_duration_days() -> i64 { 30 }
fn default_operation_timeout_secs() -> u64 { 5 }

impl EngineConfig {
    /// Validate and convert into the engine's runtime settings
    pub fn to_engine_settings(&self) -> Result<EngineSettings, ConfigError> {
        if self.max_page_size == 0 {
            return Err(ConfigError::Message("engine.max_page_size must be at least 1".into()));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::Message(
                "engine.default_page_size must be between 1 and engine.max_page_size".into(),
            ));
        }

        if !(1..=MAX_PREMIUM_DURATION_DAYS).contains(&self.premium_duration_days) {
            return Err(ConfigError::Message(format!(
                "engine.premium_duration_days must be between 1 and {} (got {})",
                MAX_PREMIUM_DURATION_DAYS, self.premium_duration_days
            )));
        }
        if self.daily_swipe_limit < 0 {
            return Err(ConfigError::Message("engine.daily_swipe_limit must not be negative".into()));
        }

        let utc_offset = chrono::FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .ok_or_else(|| {
                ConfigError::Message(format!(
                    "engine.utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                ))
            })?;

        Ok(EngineSettings {
            max_page_size: self.max_page_size,
            daily_swipe_limit: self.daily_swipe_limit,
            premium_duration: chrono::Duration::days(self.premium_duration_days),
            utc_offset,
            operation_timeout: Duration::from_secs(self.operation_timeout_secs),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingSettings {
    /// Apply `LOG_LEVEL` / `LOG_FORMAT` style overrides on top of the file values
    pub fn overridden_by(&self, level: Option<String>, format: Option<String>) -> Self {
        Self {
            level: level.unwrap_or_else(|| self.level.clone()),
            format: format.unwrap_or_else(|| self.format.clone()),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with DISCOVERY_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // e.g., DISCOVERY__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("DISCOVERY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_env_overrides(settings)?;

        settings.try_deserialize()
    }
}

/// Well-known variables that take precedence over prefixed ones
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(jwt_secret) = env::var("JWT_SECRET") {
        builder = builder.set_override("auth.jwt_secret", jwt_secret)?;
    }

    builder.build()
}
