//! Admin Panel Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::user::UserRole;

/// Instance-wide counters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminStats {
    pub users: i64,
    pub admins: i64,
    pub disabled_users: i64,
    pub snippets: i64,
    pub archived_snippets: i64,
    pub groups: i64,
    pub active_api_keys: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUserQuery {
    /// Substring of username or email
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUserUpdate {
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub is_disabled: Option<bool>,
}

/// One row of the audit log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEvent {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub target: Option<String>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditQuery {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}
