use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Placeholder client id/secret shipped in the documentation templates
pub const PLACEHOLDER_CLIENT_CREDENTIAL: &str = "abcd1234";

/// Placeholder webhook URL shipped in the documentation templates
pub const PLACEHOLDER_WEBHOOK_URL: &str =
    "https://discordapp.com/api/webhooks/1234567890/abcdefghijklmnopqrstuvwxyz1234567890";

pub const DEFAULT_POLL_RATE_SECONDS: u64 = 60;
pub const MIN_POLL_RATE_SECONDS: u64 = 5;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub rtmp: RtmpConfig,
    pub twitch: TwitchConfig,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9090,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file, created on first start
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "rtmpauth.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

/// Public address of the RTMP ingest server, used for viewer links only
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RtmpConfig {
    pub fqdn: String,
    pub port: u16,
}

impl Default for RtmpConfig {
    fn default() -> Self {
        Self {
            fqdn: "stream.mydomain.com".to_string(),
            port: 1935,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitchConfig {
    pub enabled: bool,
    pub client_id: String,
    pub client_secret: String,
    /// Seconds between reconciliation cycles; values below the floor are raised
    pub poll_rate_seconds: u64,
    pub api_base_url: String,
    pub auth_base_url: String,
    pub viewer_base_url: String,
    pub request_timeout_seconds: u64,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            client_id: PLACEHOLDER_CLIENT_CREDENTIAL.to_string(),
            client_secret: PLACEHOLDER_CLIENT_CREDENTIAL.to_string(),
            poll_rate_seconds: DEFAULT_POLL_RATE_SECONDS,
            api_base_url: "https://api.twitch.tv/helix".to_string(),
            auth_base_url: "https://id.twitch.tv/oauth2".to_string(),
            viewer_base_url: "https://twitch.tv".to_string(),
            request_timeout_seconds: 10,
        }
    }
}

impl TwitchConfig {
    /// Poll interval with the minimum floor applied
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_rate_seconds.max(MIN_POLL_RATE_SECONDS))
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub enabled: bool,
    pub url: String,
    pub request_timeout_seconds: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: PLACEHOLDER_WEBHOOK_URL.to_string(),
            request_timeout_seconds: 10,
        }
    }
}

impl WebhookConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // RTMPAUTH_TWITCH__CLIENT_ID, RTMPAUTH_SERVER__PORT, ...
        builder = builder.add_source(
            Environment::with_prefix("RTMPAUTH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Get HTTP listen address
    #[must_use]
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Collect every configuration problem instead of stopping at the first
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.host.trim().is_empty() {
            errors.push("server.host must not be empty".to_string());
        }
        if self.server.port == 0 {
            errors.push("server.port must not be 0".to_string());
        }
        if self.database.path.trim().is_empty() {
            errors.push("database.path must not be empty".to_string());
        }
        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "warning" | "error"
        ) {
            errors.push(format!("logging.level '{}' is not a valid level", self.logging.level));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            errors.push(format!(
                "logging.format '{}' must be 'json' or 'pretty'",
                self.logging.format
            ));
        }
        if self.twitch.request_timeout_seconds == 0 {
            errors.push("twitch.request_timeout_seconds must be greater than 0".to_string());
        }
        if self.webhook.request_timeout_seconds == 0 {
            errors.push("webhook.request_timeout_seconds must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
