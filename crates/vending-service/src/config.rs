//! Service configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use vending_db::DbConfig;

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// SQLite database file (`VENDING_DB_PATH`)
    pub database_path: PathBuf,

    /// Pool size (`VENDING_DB_MAX_CONNECTIONS`)
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection (`VENDING_DB_CONNECT_TIMEOUT_SECS`)
    pub connect_timeout_secs: u64,

    /// tracing filter directive (`VENDING_LOG`); `RUST_LOG` still wins
    pub log_filter: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            database_path: PathBuf::from("vending.db"),
            max_connections: 5,
            connect_timeout_secs: 30,
            log_filter: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServiceConfig::default();

        let config = ServiceConfig {
            database_path: lookup("VENDING_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: parse_or(&lookup, "VENDING_DB_MAX_CONNECTIONS", defaults.max_connections)?,

            connect_timeout_secs: parse_or(
                &lookup,
                "VENDING_DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,

            log_filter: lookup("VENDING_LOG").filter(|s| !s.trim().is_empty()),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "VENDING_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
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
        let config = ServiceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.db_config().max_connections, 5);
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("VENDING_DB_PATH", "/tmp/v.db"),
            ("VENDING_DB_MAX_CONNECTIONS", "8"),
            ("VENDING_DB_CONNECT_TIMEOUT_SECS", "3"),
            ("VENDING_LOG", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/v.db"));
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
        assert_eq!(config.db_config().connect_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("VENDING_DB_MAX_CONNECTIONS", "many"),
            ("VENDING_DB_MAX_CONNECTIONS", "0"),
            ("VENDING_DB_CONNECT_TIMEOUT_SECS", "-1"),
        ] {
            let err = ServiceConfig::from_lookup(lookup_from(&[(key, value)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(ref k) if k == key));
        }
    }
}
