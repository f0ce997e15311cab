//! Service configuration, read once from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::llm::LlmConfig;
use crate::rate_limit::RateLimitConfig;
use crate::store::StorageMode;

/// Default durable store directory.
pub const DEFAULT_DATA_DIR: &str = "./data";
/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default bind port.
pub const DEFAULT_PORT: u16 = 8001;
/// Default frontend origin allowed by CORS.
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
/// Development origins that are always allowed.
const DEV_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:3001"];
/// Default upload cap in megabytes.
const DEFAULT_MAX_UPLOAD_MB: usize = 10;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No API key configured for provider '{0}'. Set GEMINI_API_KEY, OPENAI_API_KEY or LLM_API_KEY")]
    MissingApiKey(&'static str),

    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Model provider settings.
    pub llm: LlmConfig,
    /// Durable store directory.
    pub data_dir: PathBuf,
    /// Storage backend.
    pub storage_mode: StorageMode,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Frontend origin allowed by CORS.
    pub frontend_url: String,
    /// Analyze endpoint limiter.
    pub rate_limit: RateLimitConfig,
    /// Request body cap for uploads.
    pub max_upload_bytes: usize,
    /// Key the limiter on `X-Forwarded-For` instead of the peer address.
    /// Only safe behind a reverse proxy that overwrites the header.
    pub trust_proxy: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_mode: StorageMode::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            rate_limit: RateLimitConfig::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            trust_proxy: false,
        }
    }
}

impl Settings {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let storage_mode = match lookup("STORAGE_MODE") {
            Some(v) => StorageMode::parse(&v).ok_or(ConfigError::Invalid {
                key: "STORAGE_MODE",
                value: v,
            })?,
            None => defaults.storage_mode,
        };

        let rate_limit = RateLimitConfig {
            max_requests: parse_var(&lookup, "RATE_LIMIT_REQUESTS")?
                .unwrap_or(defaults.rate_limit.max_requests),
            window: parse_var(&lookup, "RATE_LIMIT_WINDOW_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_limit.window),
        };

        let max_upload_bytes = parse_var::<usize>(&lookup, "MAX_UPLOAD_MB")?
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(defaults.max_upload_bytes);

        let trust_proxy = match lookup("TRUST_PROXY") {
            Some(v) => parse_flag(&v).ok_or(ConfigError::Invalid {
                key: "TRUST_PROXY",
                value: v,
            })?,
            None => defaults.trust_proxy,
        };

        Ok(Self {
            llm: LlmConfig::from_lookup(&lookup),
            data_dir: lookup("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            storage_mode,
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
            frontend_url: lookup("FRONTEND_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.frontend_url),
            rate_limit,
            max_upload_bytes,
            trust_proxy,
        })
    }

    /// Fail early when the configured provider needs a key and has none.
    pub fn require_llm_credentials(&self) -> Result<(), ConfigError> {
        if self.llm.has_credentials() {
            Ok(())
        } else {
            Err(ConfigError::MissingApiKey(self.llm.provider.as_str()))
        }
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Origins allowed by CORS: the frontend plus local development hosts.
    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins = vec![self.frontend_url.clone()];
        for origin in DEV_ORIGINS {
            if !origins.iter().any(|o| o == origin) {
                origins.push(origin.to_string());
            }
        }
        origins
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(None),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmProvider;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("./data"));
        assert_eq!(settings.storage_mode, StorageMode::Disk);
        assert_eq!(settings.bind_addr(), "127.0.0.1:8001");
        assert_eq!(settings.frontend_url, "http://localhost:3000");
        assert_eq!(settings.rate_limit.max_requests, 10);
        assert_eq!(settings.rate_limit.window, Duration::from_secs(3600));
        assert_eq!(settings.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(settings.llm.provider, LlmProvider::Gemini);
        assert!(!settings.trust_proxy);
    }

    #[test]
    fn test_trust_proxy_flag() {
        for value in ["1", "true", "YES", "on"] {
            let settings = Settings::from_lookup(lookup(&[("TRUST_PROXY", value)])).unwrap();
            assert!(settings.trust_proxy, "{value}");
        }
        let settings = Settings::from_lookup(lookup(&[("TRUST_PROXY", "off")])).unwrap();
        assert!(!settings.trust_proxy);

        let err = Settings::from_lookup(lookup(&[("TRUST_PROXY", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TRUST_PROXY", .. }));
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATA_DIR", "/srv/influract"),
            ("STORAGE_MODE", "memory"),
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("FRONTEND_URL", "https://app.example.com/"),
            ("RATE_LIMIT_REQUESTS", "0"),
            ("RATE_LIMIT_WINDOW_SECS", "60"),
            ("MAX_UPLOAD_MB", "2"),
            ("GEMINI_API_KEY", "g-1"),
        ]))
        .unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/srv/influract"));
        assert_eq!(settings.storage_mode, StorageMode::Memory);
        assert_eq!(settings.bind_addr(), "0.0.0.0:9000");
        assert_eq!(settings.frontend_url, "https://app.example.com");
        assert!(!settings.rate_limit.is_enabled());
        assert_eq!(settings.rate_limit.window, Duration::from_secs(60));
        assert_eq!(settings.max_upload_bytes, 2 * 1024 * 1024);
        assert!(settings.require_llm_credentials().is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Settings::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = Settings::from_lookup(lookup(&[("STORAGE_MODE", "s3")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STORAGE_MODE", .. }));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let settings = Settings::from_lookup(lookup(&[("PORT", ""), ("DATA_DIR", "  ")])).unwrap();
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn test_missing_key_reported() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        let err = settings.require_llm_credentials().unwrap_err();
        assert!(err.to_string().contains("gemini"));

        let settings = Settings::from_lookup(lookup(&[("LLM_PROVIDER", "ollama")])).unwrap();
        assert!(settings.require_llm_credentials().is_ok());
    }

    #[test]
    fn test_cors_origins_deduplicated() {
        let settings = Settings::default();
        assert_eq!(
            settings.cors_origins(),
            vec!["http://localhost:3000", "http://localhost:3001"]
        );

        let settings = Settings {
            frontend_url: "https://app.example.com".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.cors_origins().len(), 3);
    }
}
