/**
 * Server Configuration
 *
 * This module handles loading and validation of server configuration.
 *
 * # Configuration Sources
 *
 * Later sources override earlier ones:
 * 1. Built-in defaults, suitable for local development
 * 2. An optional TOML file named by `CODEPOCKET_CONFIG`
 * 3. Environment variables (a `.env` file is loaded by the binary)
 *
 * # Error Handling
 *
 * Malformed values are configuration errors and stop start-up. A missing
 * `JWT_SECRET` is only warned about; a development secret is used instead.
 */

use std::time::Duration;

use serde::Deserialize;

use crate::shared::config::ConfigError;

const DEFAULT_DATABASE_URL: &str = "sqlite://codepocket.db?mode=rwc";
const DEV_JWT_SECRET: &str = "codepocket-dev-secret-change-in-production";
/// A century; anything longer is treated as a typo
pub const MAX_ARCHIVE_RETENTION_DAYS: u32 = 36_500;

/// Limits for one fixed-window rate limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub cache_ttl: Duration,
    /// Limits for the API-key endpoints
    pub rate_limit: RateLimitConfig,
    /// Limits for signup/login
    pub auth_rate_limit: RateLimitConfig,
    /// Archived snippets older than this are purged; 0 disables purging
    pub archive_retention_days: u32,
    /// Accounts registered with these emails become admins
    pub admin_emails: Vec<String>,
    /// bcrypt work factor for password hashes
    pub bcrypt_cost: u32,
    /// Key the auth limiter on `X-Forwarded-For`; only safe behind a proxy that sets it
    pub trust_proxy_headers: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl: Duration::from_secs(720 * 60 * 60),
            cache_ttl: Duration::from_secs(30),
            rate_limit: RateLimitConfig {
                window: Duration::from_secs(60),
                max_requests: 120,
            },
            auth_rate_limit: RateLimitConfig {
                window: Duration::from_secs(60),
                max_requests: 20,
            },
            archive_retention_days: 30,
            admin_emails: Vec::new(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            trust_proxy_headers: false,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfigBuilder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Load configuration from the optional file and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::builder();
        if let Ok(path) = std::env::var("CODEPOCKET_CONFIG") {
            builder = builder.merge_file(&path)?;
        }
        builder.merge_env(|key| std::env::var(key).ok())?.build()
    }

    /// In-memory database and fixed secret, for tests and throwaway instances
    pub fn ephemeral() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "ephemeral-test-secret".to_string(),
            bcrypt_cost: 4,
            ..Self::default()
        }
    }

    /// Socket address string to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether an email is listed in `admin_emails`
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|admin| admin.eq_ignore_ascii_case(email))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingValue("database_url"));
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port",
                message: "port cannot be 0".to_string(),
            });
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("jwt_secret"));
        }
        if self.token_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "token_ttl_hours",
                message: "token lifetime cannot be 0".to_string(),
            });
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                field: "bcrypt_cost",
                message: "must be between 4 and 31".to_string(),
            });
        }
        if self.archive_retention_days > MAX_ARCHIVE_RETENTION_DAYS {
            return Err(ConfigError::InvalidValue {
                field: "archive_retention_days",
                message: format!("must be at most {}", MAX_ARCHIVE_RETENTION_DAYS),
            });
        }
        for (field, limit) in [
            ("rate_limit", &self.rate_limit),
            ("auth_rate_limit", &self.auth_rate_limit),
        ] {
            if limit.window.is_zero() || limit.max_requests == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: "window and max_requests must be positive".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Shape of the optional TOML configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    database_url: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    jwt_secret: Option<String>,
    token_ttl_hours: Option<u64>,
    cache_ttl_secs: Option<u64>,
    rate_limit_window_secs: Option<u64>,
    rate_limit_max_requests: Option<u32>,
    auth_rate_limit_max_requests: Option<u32>,
    archive_retention_days: Option<u32>,
    admin_emails: Option<Vec<String>>,
    bcrypt_cost: Option<u32>,
    trust_proxy_headers: Option<bool>,
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    file: FileConfig,
    jwt_secret_set: bool,
}

fn parse_var<T: std::str::FromStr>(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
                field,
                message: format!("{:?}: {}", raw, e),
            })
        })
        .transpose()
}

impl ServerConfigBuilder {
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.file.database_url = Some(url.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.file.port = Some(port);
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.file.jwt_secret = Some(secret.into());
        self.jwt_secret_set = true;
        self
    }

    pub fn admin_emails(mut self, emails: Vec<String>) -> Self {
        self.file.admin_emails = Some(emails);
        self
    }

    /// Overlay values from a TOML file
    pub fn merge_file(self, path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        self.merge_toml(&raw).map_err(|e| match e {
            ConfigError::File { message, .. } => ConfigError::File {
                path: path.to_string(),
                message,
            },
            other => other,
        })
    }

    /// Overlay values from TOML text
    pub fn merge_toml(mut self, raw: &str) -> Result<Self, ConfigError> {
        let parsed: FileConfig = toml::from_str(raw).map_err(|e| ConfigError::File {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        let file = &mut self.file;
        if parsed.jwt_secret.is_some() {
            self.jwt_secret_set = true;
        }
        macro_rules! overlay {
            ($($field:ident),*) => {
                $(if parsed.$field.is_some() { file.$field = parsed.$field; })*
            };
        }
        overlay!(
            database_url,
            host,
            port,
            jwt_secret,
            token_ttl_hours,
            cache_ttl_secs,
            rate_limit_window_secs,
            rate_limit_max_requests,
            auth_rate_limit_max_requests,
            archive_retention_days,
            admin_emails,
            bcrypt_cost,
            trust_proxy_headers
        );
        Ok(self)
    }

    /// Overlay values from environment variables, read through `lookup`
    pub fn merge_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = &mut self.file;
        if let Some(url) = lookup("DATABASE_URL") {
            file.database_url = Some(url);
        }
        if let Some(host) = lookup("SERVER_HOST") {
            file.host = Some(host);
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            file.jwt_secret = Some(secret);
            self.jwt_secret_set = true;
        }
        if let Some(port) = parse_var("SERVER_PORT", lookup("SERVER_PORT"))? {
            file.port = Some(port);
        }
        if let Some(hours) = parse_var("TOKEN_TTL_HOURS", lookup("TOKEN_TTL_HOURS"))? {
            file.token_ttl_hours = Some(hours);
        }
        if let Some(secs) = parse_var("CACHE_TTL_SECS", lookup("CACHE_TTL_SECS"))? {
            file.cache_ttl_secs = Some(secs);
        }
        if let Some(secs) = parse_var("RATE_LIMIT_WINDOW_SECS", lookup("RATE_LIMIT_WINDOW_SECS"))? {
            file.rate_limit_window_secs = Some(secs);
        }
        if let Some(max) = parse_var("RATE_LIMIT_MAX_REQUESTS", lookup("RATE_LIMIT_MAX_REQUESTS"))? {
            file.rate_limit_max_requests = Some(max);
        }
        if let Some(max) = parse_var(
            "AUTH_RATE_LIMIT_MAX_REQUESTS",
            lookup("AUTH_RATE_LIMIT_MAX_REQUESTS"),
        )? {
            file.auth_rate_limit_max_requests = Some(max);
        }
        if let Some(days) = parse_var("ARCHIVE_RETENTION_DAYS", lookup("ARCHIVE_RETENTION_DAYS"))? {
            file.archive_retention_days = Some(days);
        }
        if let Some(cost) = parse_var("BCRYPT_COST", lookup("BCRYPT_COST"))? {
            file.bcrypt_cost = Some(cost);
        }
        if let Some(trust) = parse_var("TRUST_PROXY_HEADERS", lookup("TRUST_PROXY_HEADERS"))? {
            file.trust_proxy_headers = Some(trust);
        }
        if let Some(emails) = lookup("ADMIN_EMAILS") {
            file.admin_emails = Some(
                emails
                    .split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect(),
            );
        }
        Ok(self)
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let defaults = ServerConfig::default();
        let file = self.file;

        if !self.jwt_secret_set {
            tracing::warn!("JWT_SECRET not set; using the development secret");
        }

        let window = file
            .rate_limit_window_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.rate_limit.window);

        let config = ServerConfig {
            database_url: file.database_url.unwrap_or(defaults.database_url),
            host: file.host.unwrap_or(defaults.host),
            port: file.port.unwrap_or(defaults.port),
            jwt_secret: file.jwt_secret.unwrap_or(defaults.jwt_secret),
            token_ttl: file
                .token_ttl_hours
                .map(|h| Duration::from_secs(h * 60 * 60))
                .unwrap_or(defaults.token_ttl),
            cache_ttl: file
                .cache_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            rate_limit: RateLimitConfig {
                window,
                max_requests: file
                    .rate_limit_max_requests
                    .unwrap_or(defaults.rate_limit.max_requests),
            },
            auth_rate_limit: RateLimitConfig {
                window,
                max_requests: file
                    .auth_rate_limit_max_requests
                    .unwrap_or(defaults.auth_rate_limit.max_requests),
            },
            archive_retention_days: file
                .archive_retention_days
                .unwrap_or(defaults.archive_retention_days),
            admin_emails: file
                .admin_emails
                .unwrap_or_default()
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
            bcrypt_cost: file.bcrypt_cost.unwrap_or(defaults.bcrypt_cost),
            trust_proxy_headers: file
                .trust_proxy_headers
                .unwrap_or(defaults.trust_proxy_headers),
        };
        config.validate()?;
        Ok(config)
    }
}
