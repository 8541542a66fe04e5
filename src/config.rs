// src/config.rs
//
// Runtime configuration
//
// Defaults are usable as-is; environment variables override single fields.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const ENV_DATABASE: &str = "RECIPEBOOK_DATABASE";
pub const ENV_API_HOST: &str = "RECIPEBOOK_API_HOST";
pub const ENV_API_KEY: &str = "RECIPEBOOK_API_KEY";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "RECIPEBOOK_HTTP_TIMEOUT_SECS";
pub const ENV_POOL_SIZE: &str = "RECIPEBOOK_POOL_SIZE";

pub const DEFAULT_API_HOST: &str = "https://themealdb.com/api/json/v1";
pub const DEFAULT_API_KEY: &str = "1";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite file backing the record store
    pub database_path: PathBuf,
    /// API base URL, without the key segment
    pub api_host: String,
    pub api_key: String,
    pub http_timeout: Duration,
    /// Max pooled connections (one writer, the rest readers)
    pub pool_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            api_host: DEFAULT_API_HOST.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            http_timeout: Duration::from_secs(30),
            pool_size: 8,
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATABASE) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(host) = lookup(ENV_API_HOST) {
            config.api_host = host.trim_end_matches('/').to_string();
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            config.api_key = key;
        }
        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            let secs: u64 = raw.parse().map_err(|_| {
                AppError::Config(format!("{} must be a number of seconds, got '{}'", ENV_HTTP_TIMEOUT_SECS, raw))
            })?;
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup(ENV_POOL_SIZE) {
            let size: u32 = raw
                .parse()
                .ok()
                .filter(|size| *size >= 2)
                .ok_or_else(|| AppError::Config(format!("{} must be an integer >= 2, got '{}'", ENV_POOL_SIZE, raw)))?;
            config.pool_size = size;
        }

        Ok(config)
    }
}

/// `{DATA_DIR}/recipebook/recipebook.db`, falling back to the working directory
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recipebook")
        .join("recipebook.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.api_host, DEFAULT_API_HOST);
        assert_eq!(config.api_key, "1");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.database_path.ends_with("recipebook/recipebook.db"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_DATABASE, "/tmp/test.db"),
            (ENV_API_HOST, "https://test.com/"),
            (ENV_API_KEY, "API_KEY"),
            (ENV_HTTP_TIMEOUT_SECS, "5"),
            (ENV_POOL_SIZE, "4"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/test.db"));
        assert_eq!(config.api_host, "https://test.com");
        assert_eq!(config.api_key, "API_KEY");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.pool_size, 4);
    }

    #[test]
    fn test_invalid_values_fail() {
        let result = AppConfig::from_lookup(lookup_from(&[(ENV_HTTP_TIMEOUT_SECS, "soon")]));
        assert!(matches!(result, Err(AppError::Config(_))));

        let result = AppConfig::from_lookup(lookup_from(&[(ENV_POOL_SIZE, "1")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
