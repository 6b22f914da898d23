//! API Key Data Structures
//!
//! API keys let the editor extension call the external snippet endpoints
//! without a session token. The full key is only ever returned once, at
//! creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix every CodePocket API key starts with
pub const API_KEY_MARKER: &str = "cp_";

/// An API key without its secret
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKeySummary {
    pub id: Uuid,
    pub name: String,
    /// Public part of the key, safe to display
    pub prefix: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
}

/// Returned once, when a key is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedApiKey {
    pub id: Uuid,
    pub name: String,
    pub prefix: String,
    /// Full key, `cp_<prefix>_<secret>`
    pub key: String,
    pub created_at: DateTime<Utc>,
}

/// Split `cp_<prefix>_<secret>` into its prefix, if well-formed
pub fn parse_key_prefix(key: &str) -> Option<&str> {
    let rest = key.strip_prefix(API_KEY_MARKER)?;
    let (prefix, secret) = rest.split_once('_')?;
    if prefix.is_empty() || secret.is_empty() {
        return None;
    }
    Some(prefix)
}
