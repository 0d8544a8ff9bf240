//! Startup configuration for `NetworkService`.
//!
//! # Design
//! Configuration is an explicit value handed to the service at construction,
//! validated once. A missing credential or a bad base URL is a `ConfigError`
//! the host application sees before it can issue any request.
//!
//! The on-disk format is a small JSON document:
//!
//! ```json
//! { "apiKey": "...", "environment": "local", "apiVersion": "/v1", "timeoutSecs": 60 }
//! ```
//!
//! Only `apiKey` is required.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::HeaderValue;
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_API_VERSION: &str = "/v1";
pub const DEFAULT_USERS_URL: &str = "https://randomuser.me/api/";
pub const DEFAULT_CONFIG_PATH: &str = "Config.json";

pub const CONFIG_PATH_VAR: &str = "NETROUTE_CONFIG";
pub const API_KEY_VAR: &str = "NETROUTE_API_KEY";
pub const BASE_URL_VAR: &str = "NETROUTE_BASE_URL";

/// Deployment the client talks to. Each has a default base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Local => "http://localhost:3000/api",
            Environment::Staging => "https://staging.example.com/api",
            Environment::Production => "https://api.example.com/api",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// The credential sent in the `apiKey` header. Never blank, and always a
/// valid header value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if HeaderValue::from_str(&key).is_err() {
            return Err(ConfigError::InvalidApiKey);
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Validated client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    environment: Environment,
    base_url: String,
    users_url: String,
    api_version: String,
    api_key: ApiKey,
    timeout: Duration,
}

impl ApiConfig {
    pub fn builder(api_key: impl Into<String>) -> ApiConfigBuilder {
        ApiConfigBuilder {
            api_key: api_key.into(),
            environment: Environment::default(),
            base_url: None,
            users_url: None,
            api_version: None,
            timeout: None,
        }
    }

    /// Reads a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::builder_from_json_file(path)?.build()
    }

    /// Reads the file named by `NETROUTE_CONFIG` (default `Config.json`),
    /// then applies `NETROUTE_API_KEY` and `NETROUTE_BASE_URL` overrides.
    ///
    /// A missing file is tolerated when the API key comes from the
    /// environment.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut builder = match Self::builder_from_json_file(&path) {
            Ok(builder) => builder,
            Err(ConfigError::Read { .. }) if std::env::var(API_KEY_VAR).is_ok() => {
                debug!(%path, "config file not found, using environment only");
                Self::builder(String::new())
            }
            Err(e) => return Err(e),
        };
        if let Ok(key) = std::env::var(API_KEY_VAR) {
            builder.api_key = key;
        }
        if let Ok(url) = std::env::var(BASE_URL_VAR) {
            builder.base_url = Some(url);
        }
        builder.build()
    }

    fn builder_from_json_file(path: impl AsRef<Path>) -> Result<ApiConfigBuilder, ConfigError> {
        let path_str = path.as_ref().display().to_string();
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Read {
            path: path_str.clone(),
            source,
        })?;
        let file: ConfigFile = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path_str,
            source,
        })?;
        file.into_builder()
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Base URL for the app's own API, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn users_url(&self) -> &str {
        &self.users_url
    }

    /// Carried for the config file format; no built-in route prefixes it.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

pub struct ApiConfigBuilder {
    api_key: String,
    environment: Environment,
    base_url: Option<String>,
    users_url: Option<String>,
    api_version: Option<String>,
    timeout: Option<Duration>,
}

impl ApiConfigBuilder {
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Overrides the environment's default base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn users_url(mut self, url: impl Into<String>) -> Self {
        self.users_url = Some(url.into());
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ApiConfig, ConfigError> {
        let api_key = ApiKey::new(self.api_key)?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| self.environment.base_url().to_string());
        let base_url = validate_url(base_url.trim_end_matches('/'))?;
        let users_url = validate_url(self.users_url.as_deref().unwrap_or(DEFAULT_USERS_URL))?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(ApiConfig {
            environment: self.environment,
            base_url,
            users_url,
            api_version: self.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            api_key,
            timeout,
        })
    }
}

fn validate_url(url: &str) -> Result<String, ConfigError> {
    url::Url::parse(url).map_err(|reason| ConfigError::InvalidBaseUrl {
        url: url.to_string(),
        reason,
    })?;
    Ok(url.to_string())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    environment: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    users_url: Option<String>,
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl ConfigFile {
    fn into_builder(self) -> Result<ApiConfigBuilder, ConfigError> {
        let environment = match self.environment {
            Some(name) => name.parse()?,
            None => Environment::default(),
        };
        Ok(ApiConfigBuilder {
            api_key: self.api_key.unwrap_or_default(),
            environment,
            base_url: self.base_url,
            users_url: self.users_url,
            api_version: self.api_version,
            timeout: self.timeout_secs.map(Duration::from_secs),
        })
    }
}
