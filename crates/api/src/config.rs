use persistence::repositories::WriteMode;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub monitoring: MonitoringConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub boundaries: BoundariesConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Where position samples come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSourceKind {
    /// Samples pushed by the device over HTTP
    Push,
    /// A recorded JSON track played back at a fixed interval
    Replay,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// Start monitoring as soon as the server boots
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_source")]
    pub source: PositionSourceKind,

    /// Track file for the replay source
    #[serde(default)]
    pub replay_path: String,

    /// Delay between replayed samples
    #[serde(default = "default_replay_interval_ms")]
    pub replay_interval_ms: u64,

    /// Restart the track when it runs out
    #[serde(default)]
    pub replay_repeat: bool,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Upper bound on a single position request
    #[serde(default = "default_position_timeout_ms")]
    pub position_timeout_ms: u64,

    /// Oldest cached fix a position request may return
    #[serde(default = "default_maximum_age_ms")]
    pub maximum_age_ms: u64,
}

impl MonitoringConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn position_timeout(&self) -> Duration {
        Duration::from_millis(self.position_timeout_ms)
    }

    pub fn maximum_age(&self) -> Duration {
        Duration::from_millis(self.maximum_age_ms)
    }

    pub fn replay_interval(&self) -> Duration {
        Duration::from_millis(self.replay_interval_ms)
    }
}

/// Key-value backend for alert history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_history_key")]
    pub history_key: String,

    #[serde(default = "default_sessions_key")]
    pub sessions_key: String,

    #[serde(default)]
    pub write_mode: WriteMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoundariesConfig {
    /// JSON boundary catalog; the built-in catalog is used when empty
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_source() -> PositionSourceKind {
    PositionSourceKind::Push
}
fn default_replay_interval_ms() -> u64 {
    1000
}
fn default_poll_interval() -> u64 {
    10
}
fn default_position_timeout_ms() -> u64 {
    5000
}
fn default_maximum_age_ms() -> u64 {
    30000
}
fn default_storage_backend() -> StorageBackend {
    StorageBackend::File
}
fn default_data_dir() -> String {
    "data".to_string()
}
fn default_history_key() -> String {
    persistence::repositories::alert_history::DEFAULT_HISTORY_KEY.to_string()
}
fn default_sessions_key() -> String {
    persistence::repositories::alert_history::DEFAULT_SESSIONS_KEY.to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with SG__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SG").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// This method creates a config entirely from defaults and overrides,
    /// without relying on config files (which may not be accessible during tests).
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        // Embed defaults directly to avoid file system dependency in tests
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [logging]
            level = "info"
            format = "json"

            [monitoring]
            enabled = false
            source = "push"
            replay_path = ""
            poll_interval_secs = 10
            position_timeout_ms = 5000
            maximum_age_ms = 30000

            [storage]
            backend = "memory"
            data_dir = "data"
            history_key = "geofence-alert-history"
            sessions_key = "geofence-monitoring-sessions"
            write_mode = "background"

            [boundaries]
            path = ""

            [security]
            cors_origins = []
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        self.socket_addr()?;

        if self.monitoring.poll_interval_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "monitoring.poll_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.monitoring.position_timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "monitoring.position_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.monitoring.source == PositionSourceKind::Replay
            && self.monitoring.replay_path.is_empty()
        {
            return Err(ConfigValidationError::MissingRequired(
                "SG__MONITORING__REPLAY_PATH must be set when the replay source is selected"
                    .to_string(),
            ));
        }

        if self.monitoring.source == PositionSourceKind::Replay
            && self.monitoring.replay_interval_ms == 0
        {
            return Err(ConfigValidationError::InvalidValue(
                "monitoring.replay_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.storage.backend == StorageBackend::File && self.storage.data_dir.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "storage.data_dir must be set for the file backend".to_string(),
            ));
        }

        if self.storage.history_key == self.storage.sessions_key {
            return Err(ConfigValidationError::InvalidValue(
                "storage.history_key and storage.sessions_key must differ".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigValidationError::InvalidValue(format!(
                    "Invalid socket address {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }
}
