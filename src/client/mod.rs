//! Editor Extension Client
//!
//! Async client for the API-key authenticated `/api/v1` endpoints, used by
//! the editor extension to search, fetch and save snippets.
//!
//! ```rust,no_run
//! use codepocket::client::CodePocketClient;
//! use codepocket::shared::{AppConfig, SnippetQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::builder()
//!     .server_url("http://127.0.0.1:3000")
//!     .api_key("cp_abcd1234_secret")
//!     .build()?;
//! let client = CodePocketClient::new(config);
//! let found = client
//!     .list_snippets(&SnippetQuery { q: Some("retry".into()), ..Default::default() })
//!     .await?;
//! println!("{} matches", found.total);
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::config::{AppConfig, ConfigError};
use crate::shared::validation::{validate_code, validate_title};
use crate::shared::{CreateSnippetRequest, ListSnippetsResponse, SharedError, Snippet, SnippetQuery};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response, with the server's error message
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Validation(#[from] SharedError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Message of an error response body, falling back to the raw text
pub(crate) fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status),
        Err(_) => body.trim().to_string(),
    }
}

/// CodePocket API client
#[derive(Debug, Clone)]
pub struct CodePocketClient {
    config: AppConfig,
    http: Client,
}

impl CodePocketClient {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Client configured from `CODEPOCKET_URL` and `CODEPOCKET_API_KEY`
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::new(AppConfig::from_env()?))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(API_KEY_HEADER, &self.config.api_key)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status.as_u16(), &body);
            tracing::warn!("CodePocket request failed with {}: {}", status, message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }

    /// Search the key owner's snippets
    pub async fn list_snippets(&self, query: &SnippetQuery) -> Result<ListSnippetsResponse, ClientError> {
        let url = self.config.api_url("/api/v1/snippets");
        let response = self.authorized(self.http.get(&url).query(query)).send().await?;
        Self::decode(response).await
    }

    pub async fn get_snippet(&self, id: Uuid) -> Result<Snippet, ClientError> {
        let url = self.config.api_url(&format!("/api/v1/snippets/{}", id));
        let response = self.authorized(self.http.get(&url)).send().await?;
        Self::decode(response).await
    }

    /// Save a snippet; obviously invalid input is rejected before any request
    pub async fn create_snippet(&self, request: &CreateSnippetRequest) -> Result<Snippet, ClientError> {
        validate_title(&request.title)?;
        validate_code(&request.code)?;

        let url = self.config.api_url("/api/v1/snippets");
        let response = self.authorized(self.http.post(&url).json(request)).send().await?;
        Self::decode(response).await
    }
}
