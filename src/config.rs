//! Runtime configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `CAREENFORCED_API_URL` (or `VITE_API_URL`) | `http://localhost:8000` |
//! | `CAREENFORCED_HTTP_TIMEOUT_SECS` | `30` |
//! | `CAREENFORCED_EXPORT_DIR` | `.` |
//! | `CAREENFORCED_MIN_LOADING_MS` | `7000` |

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MIN_LOADING_MS: u64 = 7_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("API URL must start with http:// or https://, got '{0}'")]
    InvalidApiUrl(String),
}

/// Settings resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the prediction service, without trailing slash
    pub api_url: String,
    pub http_timeout: Duration,
    pub export_dir: PathBuf,
    /// Minimum time the loading screen stays visible
    pub min_loading: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            export_dir: PathBuf::from("."),
            min_loading: Duration::from_millis(DEFAULT_MIN_LOADING_MS),
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns error if the API URL is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults.
    ///
    /// # Errors
    /// Returns error if the API URL is not an http(s) URL.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("CAREENFORCED_API_URL")
            .or_else(|| lookup("VITE_API_URL"))
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_url);
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(api_url));
        }

        let http_timeout = parse_u64(&lookup, "CAREENFORCED_HTTP_TIMEOUT_SECS")
            .filter(|&secs| secs > 0)
            .map_or(defaults.http_timeout, Duration::from_secs);

        let min_loading = parse_u64(&lookup, "CAREENFORCED_MIN_LOADING_MS")
            .map_or(defaults.min_loading, Duration::from_millis);

        let export_dir = lookup("CAREENFORCED_EXPORT_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or(defaults.export_dir, PathBuf::from);

        Ok(Self {
            api_url,
            http_timeout,
            export_dir,
            min_loading,
        })
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a non-negative integer", key, raw);
            None
        }
    }
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
        let config = Config::from_lookup(lookup_from(&[])).expect("defaults");
        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.min_loading, Duration::from_millis(7_000));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("CAREENFORCED_API_URL", "https://risk.example.org/api/"),
            ("CAREENFORCED_HTTP_TIMEOUT_SECS", "5"),
            ("CAREENFORCED_EXPORT_DIR", "/tmp/reports"),
            ("CAREENFORCED_MIN_LOADING_MS", "0"),
        ]))
        .expect("valid");

        assert_eq!(config.api_url, "https://risk.example.org/api");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(config.min_loading, Duration::ZERO);
    }

    #[test]
    fn test_vite_url_fallback() {
        let config = Config::from_lookup(lookup_from(&[("VITE_API_URL", "http://10.0.0.2:9000")]))
            .expect("valid");
        assert_eq!(config.api_url, "http://10.0.0.2:9000");
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("CAREENFORCED_HTTP_TIMEOUT_SECS", "soon"),
            ("CAREENFORCED_MIN_LOADING_MS", "-1"),
        ]))
        .expect("valid");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.min_loading, Duration::from_millis(7_000));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = Config::from_lookup(lookup_from(&[("CAREENFORCED_API_URL", "ftp://x")]))
            .expect_err("invalid");
        assert_eq!(err, ConfigError::InvalidApiUrl("ftp://x".into()));
    }
}
