use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use url::Url;

/// Backend address used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Client-side request cutoff in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

const ENV_API_BASE_URL: &str = "TUHURA_API_BASE_URL";
const ENV_REQUEST_TIMEOUT_SECS: &str = "TUHURA_REQUEST_TIMEOUT_SECS";
const ENV_STORAGE_PATH: &str = "TUHURA_STORAGE_PATH";
const ENV_LOG_LEVEL: &str = "TUHURA_LOG_LEVEL";

/// Errors raised while resolving a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The YAML document did not match the configuration schema.
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yml::Error),
    /// The JSON document did not match the configuration schema.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// The file extension is not one we know how to parse.
    #[error("Unsupported configuration format for {0}. Use 'yaml' or 'json'.")]
    UnsupportedFormat(PathBuf),
    /// An environment variable held an unusable value.
    #[error("Invalid {name} value: {reason}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// The resolved configuration failed validation.
    #[error("{0}")]
    Invalid(String),
}

/// Settings for talking to the auth API and persisting the session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base endpoint every API path is joined onto.
    pub api_base_url: Url,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// File holding the persisted session record.
    pub storage_path: PathBuf,

    /// Default tracing filter directive.
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ClientConfig {
    /// Generates a default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            storage_path: default_storage_path(),
            log_level: "info".to_string(),
        }
    }

    /// Loads the configuration from a file, environment variables, or defaults.
    ///
    /// File values win over environment variables, which only fill fields
    /// still at their default. `api_url_override` wins over both.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the file cannot be read or parsed, an
    /// environment variable is malformed, or the result fails validation.
    pub fn load_config(
        config_path: Option<&Path>,
        api_url_override: Option<Url>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::with_defaults();
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => defaults.clone(),
        };

        if config.api_base_url == defaults.api_base_url {
            if let Ok(value) = env::var(ENV_API_BASE_URL) {
                config.api_base_url =
                    Url::parse(&value).map_err(|err| ConfigError::InvalidEnv {
                        name: ENV_API_BASE_URL,
                        reason: err.to_string(),
                    })?;
            }
        }
        if config.request_timeout_secs == defaults.request_timeout_secs {
            if let Ok(value) = env::var(ENV_REQUEST_TIMEOUT_SECS) {
                config.request_timeout_secs =
                    value.parse().map_err(|_| ConfigError::InvalidEnv {
                        name: ENV_REQUEST_TIMEOUT_SECS,
                        reason: "must be a whole number of seconds".to_string(),
                    })?;
            }
        }
        if config.storage_path == defaults.storage_path {
            if let Ok(value) = env::var(ENV_STORAGE_PATH) {
                config.storage_path = PathBuf::from(value);
            }
        }
        if config.log_level == defaults.log_level {
            if let Ok(value) = env::var(ENV_LOG_LEVEL) {
                config.log_level = value;
            }
        }

        if let Some(url) = api_url_override {
            config.api_base_url = url;
        }

        config.validate()?;
        tracing::debug!(api_base_url = %config.api_base_url, storage = %config.storage_path.display(), "configuration resolved");
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Ok(serde_yml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Checks the invariants the HTTP adapter relies on.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for a zero timeout or a non-HTTP base URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "Invalid request timeout. Must be greater than 0.".to_string(),
            ));
        }
        if !matches!(self.api_base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "Invalid API base URL {}: scheme must be http or https",
                self.api_base_url
            )));
        }
        Ok(())
    }

    /// The request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Serializes the configuration in the named format (`yaml` or `json`).
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for an unknown format, or the
    /// serializer's error.
    pub fn to_format(&self, format: &str) -> Result<String, ConfigError> {
        match format {
            "yaml" => Ok(serde_yml::to_string(self)?),
            "json" => Ok(serde_json::to_string_pretty(self)?),
            other => Err(ConfigError::Invalid(format!(
                "Unsupported format '{other}'. Use 'yaml' or 'json'."
            ))),
        }
    }
}

fn default_api_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL).expect("default API base URL is a valid URL")
}

/// Where the session record lives when no path is configured.
#[must_use]
pub fn default_storage_path() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.config_dir().join("tuhura").join("session.json"))
        .unwrap_or_else(|| PathBuf::from("./session.json"))
}
