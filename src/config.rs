//! Transport configuration.
//!
//! Settings can come from any serde source (a `services.postmark` table in an
//! application config, a JSON blob, ...) or from environment variables:
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `POSTMARK_API_KEY` | Server token (required) |
//! | `POSTMARK_CONNECT_TIMEOUT` | Connect timeout in seconds (default: 60) |
//! | `POSTMARK_TIMEOUT` | Total request timeout in seconds (default: none) |
//! | `POSTMARK_PROXY` | Proxy URL for all requests |

use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::MailError;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 60;

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

/// Settings for a [`PostmarkTransport`](crate::PostmarkTransport).
#[derive(Clone, Deserialize)]
pub struct PostmarkConfig {
    /// Postmark server token
    pub secret: String,
    /// Low-level HTTP client options
    #[serde(default)]
    pub http: HttpOptions,
}

impl fmt::Debug for PostmarkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostmarkConfig")
            .field("secret", &"<redacted>")
            .field("http", &self.http)
            .finish()
    }
}

impl PostmarkConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            http: HttpOptions::default(),
        }
    }

    /// Replace the HTTP options.
    pub fn http(mut self, http: HttpOptions) -> Self {
        self.http = http;
        self
    }

    /// Deserialize from a settings mapping.
    ///
    /// ```
    /// use postmark_transport::PostmarkConfig;
    /// use serde_json::json;
    ///
    /// let config = PostmarkConfig::from_value(json!({
    ///     "secret": "server-token",
    ///     "http": { "timeout_secs": 30 }
    /// })).unwrap();
    ///
    /// assert_eq!(config.http.connect_timeout_secs, 60);
    /// assert_eq!(config.http.timeout_secs, Some(30));
    /// ```
    pub fn from_value(value: serde_json::Value) -> Result<Self, MailError> {
        let config: Self = serde_json::from_value(value)
            .map_err(|e| MailError::Configuration(format!("invalid postmark settings: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read settings from `POSTMARK_*` environment variables.
    pub fn from_env() -> Result<Self, MailError> {
        let secret = env::var("POSTMARK_API_KEY")
            .map_err(|_| MailError::Configuration("POSTMARK_API_KEY not set".into()))?;

        let mut http = HttpOptions::default();
        if let Some(secs) = env_secs("POSTMARK_CONNECT_TIMEOUT")? {
            http.connect_timeout_secs = secs;
        }
        http.timeout_secs = env_secs("POSTMARK_TIMEOUT")?;
        http.proxy = env::var("POSTMARK_PROXY").ok();

        let config = Self { secret, http };
        config.validate()?;
        Ok(config)
    }

    /// Check that a server token is present.
    pub fn validate(&self) -> Result<(), MailError> {
        if self.secret.trim().is_empty() {
            return Err(MailError::Configuration(
                "postmark server token is empty".into(),
            ));
        }
        Ok(())
    }
}

fn env_secs(name: &str) -> Result<Option<u64>, MailError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| MailError::Configuration(format!("{} must be a number of seconds", name))),
        Err(_) => Ok(None),
    }
}

/// Options forwarded to the underlying HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpOptions {
    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds; unlimited when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Proxy URL applied to all requests
    #[serde(default)]
    pub proxy: Option<String>,
    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            timeout_secs: None,
            proxy: None,
            headers: HashMap::new(),
        }
    }
}

impl HttpOptions {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Build a reqwest client carrying these options.
    pub fn build_client(&self) -> Result<reqwest::Client, MailError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout())
            .user_agent(format!("postmark-transport/{}", crate::VERSION));

        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Some(ref url) = self.proxy {
            let proxy = reqwest::Proxy::all(url.as_str())
                .map_err(|e| MailError::Configuration(format!("invalid proxy '{}': {}", url, e)))?;
            builder = builder.proxy(proxy);
        }

        if !self.headers.is_empty() {
            let mut headers = HeaderMap::with_capacity(self.headers.len());
            for (name, value) in &self.headers {
                let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                    MailError::Configuration(format!("invalid header name '{}': {}", name, e))
                })?;
                let value = HeaderValue::from_str(value).map_err(|e| {
                    MailError::Configuration(format!("invalid header value for '{}': {}", name, e))
                })?;
                headers.insert(name, value);
            }
            builder = builder.default_headers(headers);
        }

        builder
            .build()
            .map_err(|e| MailError::Configuration(format!("failed to build HTTP client: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = PostmarkConfig::new("token");
        assert_eq!(config.http.connect_timeout(), Duration::from_secs(60));
        assert_eq!(config.http.timeout_secs, None);
        assert!(config.http.headers.is_empty());
    }

    #[test]
    fn test_from_value_overrides() {
        let config = PostmarkConfig::from_value(json!({
            "secret": "token",
            "http": {
                "connect_timeout_secs": 5,
                "headers": { "X-Trace": "on" }
            }
        }))
        .unwrap();

        assert_eq!(config.http.connect_timeout_secs, 5);
        assert_eq!(config.http.headers.get("X-Trace").map(String::as_str), Some("on"));
    }

    #[test]
    fn test_from_value_requires_secret() {
        let err = PostmarkConfig::from_value(json!({ "http": {} })).unwrap_err();
        assert!(matches!(err, MailError::Configuration(_)));

        let err = PostmarkConfig::from_value(json!({ "secret": "  " })).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = PostmarkConfig::new("super-secret-token");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_build_client() {
        let options = HttpOptions {
            timeout_secs: Some(10),
            headers: HashMap::from([("X-Trace".to_string(), "on".to_string())]),
            ..HttpOptions::default()
        };
        assert!(options.build_client().is_ok());
    }

    #[test]
    fn test_build_client_rejects_bad_header() {
        let options = HttpOptions {
            headers: HashMap::from([("bad header".to_string(), "x".to_string())]),
            ..HttpOptions::default()
        };
        assert!(matches!(
            options.build_client(),
            Err(MailError::Configuration(_))
        ));
    }
}
