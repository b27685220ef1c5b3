//! Backend connection settings

use std::time::Duration;

use thiserror::Error;

/// Base URL used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable overriding the base URL
pub const API_URL_ENV: &str = "GEOWATCH_API_URL";

/// Environment variable overriding the timeout, in whole seconds
pub const TIMEOUT_ENV: &str = "GEOWATCH_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid API URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid {var}: {value:?} is not a number of seconds")]
    InvalidTimeout { var: &'static str, value: String },
}

/// Where the backend lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    /// Config for the given base URL with the default timeout
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Self::default().with_base_url(base_url)
    }

    /// Read [`API_URL_ENV`] and [`TIMEOUT_ENV`], falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(API_URL_ENV) {
            config = config.with_base_url(&url)?;
        }
        if let Some(value) = lookup(TIMEOUT_ENV) {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout {
                    var: TIMEOUT_ENV,
                    value: value.clone(),
                })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        let parsed = reqwest::Url::parse(base_url).map_err(|e| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: base_url.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL of a resource path such as `"detection/jobs"`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url(), DEFAULT_API_URL);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let config = ApiConfig::new("https://geo.example.org/api/v1/").unwrap();
        assert_eq!(
            config.endpoint("/detection/jobs"),
            "https://geo.example.org/api/v1/detection/jobs"
        );
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = ApiConfig::new("ftp://geo.example.org").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));

        assert!(ApiConfig::new("not a url").is_err());
    }

    #[test]
    fn test_lookup_overrides() {
        let config = ApiConfig::from_lookup(|var| match var {
            API_URL_ENV => Some("http://10.0.0.5:9000/api/v1".into()),
            TIMEOUT_ENV => Some(" 5 ".into()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.base_url(), "http://10.0.0.5:9000/api/v1");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_lookup_rejects_bad_timeout() {
        let err = ApiConfig::from_lookup(|var| (var == TIMEOUT_ENV).then(|| "soon".into()))
            .unwrap_err();

        assert_eq!(
            err,
            ConfigError::InvalidTimeout {
                var: TIMEOUT_ENV,
                value: "soon".into()
            }
        );
    }
}
