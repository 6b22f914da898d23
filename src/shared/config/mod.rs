//! Client configuration module
//!
//! Configuration for callers of the external API (the editor extension):
//! where the server lives and which API key to present.

use thiserror::Error;

/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Client configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server base URL, without trailing slash
    pub server_url: String,
    /// API key (`cp_<prefix>_<secret>`)
    pub api_key: String,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Build from `CODEPOCKET_URL` and `CODEPOCKET_API_KEY`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::builder();
        if let Ok(url) = std::env::var("CODEPOCKET_URL") {
            builder = builder.server_url(url);
        }
        if let Ok(key) = std::env::var("CODEPOCKET_API_KEY") {
            builder = builder.api_key(key);
        }
        builder.build()
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.server_url.clone()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingValue("api_key"));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
    api_key: Option<String>,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let server_url = self
            .server_url
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let api_key = self.api_key.ok_or(ConfigError::MissingValue("api_key"))?;
        let config = AppConfig { server_url, api_key };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
    #[error("failed to read config file {path}: {message}")]
    File { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_server_url() {
        let config = AppConfig::builder().api_key("cp_abcdefgh_secret").build().unwrap();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let config = AppConfig::builder()
            .server_url("https://pocket.example.com/")
            .api_key("cp_abcdefgh_secret")
            .build()
            .unwrap();
        assert_eq!(config.api_url("/api/v1/snippets"), "https://pocket.example.com/api/v1/snippets");
    }

    #[test]
    fn test_builder_rejects_non_http_url() {
        let err = AppConfig::builder()
            .server_url("ftp://pocket.example.com")
            .api_key("cp_abcdefgh_secret")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidUrl("ftp://pocket.example.com".to_string()));
    }

    #[test]
    fn test_builder_requires_api_key() {
        let err = AppConfig::builder().build().unwrap_err();
        assert_eq!(err, ConfigError::MissingValue("api_key"));

        let err = AppConfig::builder().api_key("   ").build().unwrap_err();
        assert_eq!(err, ConfigError::MissingValue("api_key"));
    }
}
