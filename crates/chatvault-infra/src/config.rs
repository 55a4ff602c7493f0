//! Service configuration loader for chatvault.
//!
//! Layers, lowest priority first: built-in defaults, an optional TOML file,
//! then `.env` and process environment overrides. CLI flags are applied on
//! top by the binary.

use std::path::{Path, PathBuf};

use chatvault_types::config::ServiceConfig;
use secrecy::SecretString;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "chatvault.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration from `path` (or `CHATVAULT_CONFIG`, or `./chatvault.toml`)
/// and the environment.
///
/// - An explicitly named file must exist.
/// - The implicit `./chatvault.toml` is optional; when absent, defaults are used.
/// - A file that exists but fails to parse is an error, never silently ignored.
pub async fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    // A missing .env is normal.
    if let Ok(env_file) = dotenvy::dotenv() {
        tracing::debug!("loaded environment from {}", env_file.display());
    }

    let explicit = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("CHATVAULT_CONFIG").map(PathBuf::from));

    let mut config = match explicit {
        Some(path) => read_config_file(&path).await?,
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            match tokio::fs::try_exists(fallback).await {
                Ok(true) => read_config_file(fallback).await?,
                _ => {
                    tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    ServiceConfig::default()
                }
            }
        }
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}

async fn read_config_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let config = toml::from_str::<ServiceConfig>(&content).map_err(|source| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    tracing::info!(path = %path.display(), "loaded configuration file");
    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
///
/// `CHATVAULT_API_KEY` wins over the legacy `API_KEY`. Empty values are
/// treated as unset.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(key) = get("CHATVAULT_API_KEY").or_else(|| get("API_KEY")) {
        config.auth.api_key = Some(SecretString::from(key));
    }
    if let Some(url) = get("DATABASE_URL") {
        config.database.url = url;
    }
    if let Some(host) = get("CHATVAULT_HOST") {
        config.server.host = host;
    }
    if let Some(port) = get("CHATVAULT_PORT") {
        config.server.port = parse_var("CHATVAULT_PORT", port)?;
    }
    if let Some(max) = get("CHATVAULT_RATE_LIMIT") {
        config.rate_limit.max_requests = parse_var("CHATVAULT_RATE_LIMIT", max)?;
    }
    if let Some(window) = get("CHATVAULT_RATE_WINDOW_SECS") {
        config.rate_limit.window_secs = parse_var("CHATVAULT_RATE_WINDOW_SECS", window)?;
    }
    Ok(())
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}
