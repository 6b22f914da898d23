//! Audit Event Logger
//!
//! Append-only log of security-relevant actions (logins, key changes, admin
//! edits). Each record is written to `audit_events` and mirrored as a
//! `tracing` event. Failures are logged and swallowed so auditing can never
//! fail the request that triggered it.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::AuditEvent;

pub const USER_SIGNUP: &str = "user.signup";
pub const USER_LOGIN: &str = "user.login";
pub const USER_LOGIN_FAILED: &str = "user.login_failed";
pub const USER_PASSWORD_CHANGED: &str = "user.password_changed";
pub const USER_DELETED: &str = "user.deleted";
pub const API_KEY_CREATED: &str = "api_key.created";
pub const API_KEY_REVOKED: &str = "api_key.revoked";
pub const ADMIN_USER_UPDATED: &str = "admin.user_updated";
pub const ADMIN_USER_DELETED: &str = "admin.user_deleted";
pub const ARCHIVE_EMPTIED: &str = "archive.emptied";

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    actor_id: Option<Uuid>,
    action: String,
    target: Option<String>,
    details: Json<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl From<AuditRow> for AuditEvent {
    fn from(row: AuditRow) -> Self {
        Self {
            id: row.id,
            actor_id: row.actor_id,
            action: row.action,
            target: row.target,
            details: row.details.0,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventLogger {
    pool: SqlitePool,
}

impl EventLogger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one event
    pub async fn record(
        &self,
        actor_id: Option<Uuid>,
        action: &str,
        target: Option<String>,
        details: serde_json::Value,
    ) {
        tracing::info!(
            target: "codepocket::audit",
            action,
            actor = ?actor_id,
            target_ref = ?target,
            "audit event"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO audit_events (id, actor_id, action, target, details, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor_id)
        .bind(action)
        .bind(target)
        .bind(Json(details))
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::error!("Failed to record audit event {}: {:?}", action, e);
        }
    }

    /// Newest first, optionally filtered by action
    pub async fn list_events(
        &self,
        limit: i64,
        offset: i64,
        action: Option<&str>,
    ) -> Result<Vec<AuditEvent>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, actor_id, action, target, details, created_at
            FROM audit_events
            WHERE (?1 IS NULL OR action = ?1)
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(action)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AuditEvent::from).collect())
    }
}
