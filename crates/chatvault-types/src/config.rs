//! Service configuration types for chatvault.
//!
//! `ServiceConfig` mirrors the optional `chatvault.toml` file. Every field has
//! a default so a partial (or missing) file is valid; the API key is the only
//! value that must come from somewhere before the server starts.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

/// Top-level configuration, read once at startup and immutable afterwards.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub limits: LimitsConfig,
    pub store: StoreConfig,
    pub log: LogConfig,
}

impl ServiceConfig {
    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.rate_limit.enabled {
            if self.rate_limit.max_requests == 0 {
                return Err("rate_limit.max_requests must be at least 1".to_string());
            }
            if self.rate_limit.window_secs == 0 {
                return Err("rate_limit.window_secs must be at least 1".to_string());
            }
        }
        if self.limits.max_page_size == 0 {
            return Err("limits.max_page_size must be at least 1".to_string());
        }
        if self.limits.default_page_size == 0
            || self.limits.default_page_size > self.limits.max_page_size
        {
            return Err(format!(
                "limits.default_page_size must be between 1 and {}",
                self.limits.max_page_size
            ));
        }
        if self.limits.max_name_length == 0 {
            return Err("limits.max_name_length must be at least 1".to_string());
        }
        if self.store.operation_timeout_ms == 0 {
            return Err("store.operation_timeout_ms must be at least 1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection string, e.g. `sqlite://chatvault.db?mode=rwc`.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://chatvault.db?mode=rwc".to_string(),
        }
    }
}

/// Shared-secret settings for the access gateway.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|k| !k.is_empty()).map(SecretString::from))
}

/// Fixed-window limits applied per client address.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub max_requests: u32,
    pub window_secs: u64,
    /// Key clients by the first `X-Forwarded-For` hop instead of the peer address.
    pub trust_forwarded_for: bool,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 10,
            window_secs: 60,
            trust_forwarded_for: false,
        }
    }
}

/// Input bounds enforced by the validation functions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum session name length, in characters.
    pub max_name_length: usize,
    /// Maximum role tag length, in characters.
    pub max_role_length: usize,
    /// Maximum message content size, in bytes.
    pub max_content_length: usize,
    pub max_page_size: u32,
    pub default_page_size: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_name_length: 200,
            max_role_length: 32,
            max_content_length: 100_000,
            max_page_size: 100,
            default_page_size: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Upper bound for a single store operation.
    pub operation_timeout_ms: u64,
    /// Extra attempts for reads that fail transiently. Writes are never retried.
    pub read_retries: u32,
}

impl StoreConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            operation_timeout_ms: 5_000,
            read_retries: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Export spans through OpenTelemetry (stdout exporter).
    pub otel: bool,
}
