// ⚙️ Configuration - read once by the binaries, passed down explicitly
//
// Nothing below the binaries touches the process environment: the lookup
// client gets a LookupConfig at construction, the API gets a page size.

use std::path::PathBuf;
use thiserror::Error;

use crate::pagination::DEFAULT_PER_PAGE;

pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_REGISTRY_URL: &str = "https://brasilapi.com.br/api/cnpj/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where and how to reach the CNPJ registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    /// Base URL; the CNPJ digits are appended as the last path segment
    pub base_url: String,
    /// Bearer token, when the provider requires one
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            base_url: DEFAULT_REGISTRY_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SERVER_ADDR
    pub server_addr: String,
    /// REGISTRY_API_URL, REGISTRY_API_TOKEN, REGISTRY_TIMEOUT_SECS
    pub lookup: LookupConfig,
    /// PAGE_SIZE
    pub per_page: usize,
    /// SEED_CSV: companies loaded into the directory at startup
    pub seed_csv: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            lookup: LookupConfig::default(),
            per_page: DEFAULT_PER_PAGE,
            seed_csv: None,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `get`, so callers (and tests) choose the source.
    /// Unset or blank variables fall back to defaults.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Config::default();

        let timeout_secs = match get("REGISTRY_TIMEOUT_SECS") {
            Some(value) => parse_positive("REGISTRY_TIMEOUT_SECS", &value)? as u64,
            None => defaults.lookup.timeout_secs,
        };

        let per_page = match get("PAGE_SIZE") {
            Some(value) => parse_positive("PAGE_SIZE", &value)?,
            None => defaults.per_page,
        };

        Ok(Config {
            server_addr: get("SERVER_ADDR").unwrap_or(defaults.server_addr),
            lookup: LookupConfig {
                base_url: get("REGISTRY_API_URL").unwrap_or(defaults.lookup.base_url),
                token: get("REGISTRY_API_TOKEN"),
                timeout_secs,
            },
            per_page,
            seed_csv: get("SEED_CSV").map(PathBuf::from),
        })
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let parsed: usize = value.parse().map_err(|_| invalid("not a number"))?;
    if parsed == 0 {
        return Err(invalid("must be greater than zero"));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.per_page, 10);
        assert_eq!(config.lookup.base_url, DEFAULT_REGISTRY_URL);
        assert!(config.lookup.token.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = from_map(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("REGISTRY_API_URL", "http://localhost:9000/cnpj"),
            ("REGISTRY_API_TOKEN", "secret"),
            ("REGISTRY_TIMEOUT_SECS", "3"),
            ("PAGE_SIZE", "25"),
            ("SEED_CSV", "companies.csv"),
        ])
        .unwrap();

        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.lookup.base_url, "http://localhost:9000/cnpj");
        assert_eq!(config.lookup.token.as_deref(), Some("secret"));
        assert_eq!(config.lookup.timeout_secs, 3);
        assert_eq!(config.per_page, 25);
        assert_eq!(config.seed_csv, Some(PathBuf::from("companies.csv")));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = from_map(&[("REGISTRY_API_TOKEN", "  "), ("PAGE_SIZE", "")]).unwrap();
        assert!(config.lookup.token.is_none());
        assert_eq!(config.per_page, 10);
    }

    #[test]
    fn test_invalid_numbers() {
        let err = from_map(&[("PAGE_SIZE", "ten")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PAGE_SIZE", .. }));

        let err = from_map(&[("REGISTRY_TIMEOUT_SECS", "0")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for REGISTRY_TIMEOUT_SECS: \"0\" (must be greater than zero)"
        );
    }
}
