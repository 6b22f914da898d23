//! Group activity feed
//!
//! Append-only log of group mutations, read newest first. The actor's
//! username is stored with each entry so the feed survives account
//! deletion; `actor_id` is cleared when the account goes.
//!
//! Pages are keyed by `(created_at, rowid)`. Passing the last entry's id as
//! `before_id` continues exactly where the previous page stopped, even when
//! several entries share a timestamp. `before` alone is a coarser
//! time-based cursor.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::{Activity, ActivityKind, User};

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    id: Uuid,
    group_id: Uuid,
    actor_id: Option<Uuid>,
    actor_username: String,
    kind: String,
    details: Json<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl ActivityRow {
    fn into_activity(self) -> Option<Activity> {
        let Some(kind) = ActivityKind::from_str(&self.kind) else {
            tracing::warn!("Skipping activity {} with unknown kind {}", self.id, self.kind);
            return None;
        };
        Some(Activity {
            id: self.id,
            group_id: self.group_id,
            actor_id: self.actor_id,
            actor_username: self.actor_username,
            kind,
            details: self.details.0,
            created_at: self.created_at,
        })
    }
}

/// Where a feed page starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedCursor {
    /// Only entries strictly older than this instant
    pub before: Option<DateTime<Utc>>,
    /// Only entries that sort after this one
    pub before_id: Option<Uuid>,
}

/// Append an entry to a group's feed
pub async fn record_activity(
    pool: &SqlitePool,
    group_id: Uuid,
    actor: &User,
    kind: ActivityKind,
    details: serde_json::Value,
) -> Result<Activity, sqlx::Error> {
    let activity = Activity {
        id: Uuid::new_v4(),
        group_id,
        actor_id: Some(actor.id),
        actor_username: actor.username.clone(),
        kind,
        details,
        created_at: Utc::now(),
    };
    insert_activity(pool, &activity).await?;
    Ok(activity)
}

async fn insert_activity(pool: &SqlitePool, activity: &Activity) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO group_activity (id, group_id, actor_id, actor_username, kind, details, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(activity.id)
    .bind(activity.group_id)
    .bind(activity.actor_id)
    .bind(&activity.actor_username)
    .bind(activity.kind.as_str())
    .bind(Json(&activity.details))
    .bind(activity.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Newest entries first. An unknown `before_id` yields an empty page.
pub async fn list_activity(
    pool: &SqlitePool,
    group_id: Uuid,
    limit: i64,
    cursor: FeedCursor,
) -> Result<Vec<Activity>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ActivityRow>(
        r#"
        SELECT a.id, a.group_id, a.actor_id, a.actor_username, a.kind, a.details, a.created_at
        FROM group_activity a
        WHERE a.group_id = ?1
          AND (?2 IS NULL OR a.created_at < ?2)
          AND (?3 IS NULL OR (a.created_at, a.rowid) < (
                SELECT c.created_at, c.rowid FROM group_activity c
                WHERE c.id = ?3 AND c.group_id = ?1
          ))
        ORDER BY a.created_at DESC, a.rowid DESC
        LIMIT ?4
        "#,
    )
    .bind(group_id)
    .bind(cursor.before)
    .bind(cursor.before_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(ActivityRow::into_activity).collect())
}
