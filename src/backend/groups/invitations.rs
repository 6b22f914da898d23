//! Invitation database operations
//!
//! Only `pending` invitations change state. Every transition is guarded by
//! `status = 'pending'` in the `WHERE` clause, so two racing answers cannot
//! both succeed.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::db::add_member;
use crate::shared::{GroupRole, Invitation, InvitationStatus};

const INVITATION_SELECT: &str = r#"
    SELECT i.id, i.group_id, g.name AS group_name,
           i.inviter_id, inviter.username AS inviter_username,
           i.invitee_id, invitee.username AS invitee_username,
           i.status, i.created_at, i.responded_at
    FROM group_invitations i
    JOIN groups g ON g.id = i.group_id
    JOIN users inviter ON inviter.id = i.inviter_id
    JOIN users invitee ON invitee.id = i.invitee_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct InvitationRow {
    id: Uuid,
    group_id: Uuid,
    group_name: String,
    inviter_id: Uuid,
    inviter_username: String,
    invitee_id: Uuid,
    invitee_username: String,
    status: String,
    created_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
}

impl From<InvitationRow> for Invitation {
    fn from(row: InvitationRow) -> Self {
        Self {
            id: row.id,
            group_id: row.group_id,
            group_name: row.group_name,
            inviter_id: row.inviter_id,
            inviter_username: row.inviter_username,
            invitee_id: row.invitee_id,
            invitee_username: row.invitee_username,
            status: InvitationStatus::from_str(&row.status).unwrap_or_default(),
            created_at: row.created_at,
            responded_at: row.responded_at,
        }
    }
}

pub async fn create_invitation(
    pool: &SqlitePool,
    group_id: Uuid,
    inviter_id: Uuid,
    invitee_id: Uuid,
) -> Result<Invitation, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO group_invitations (id, group_id, inviter_id, invitee_id, status, created_at)
        VALUES (?, ?, ?, ?, 'pending', ?)
        "#,
    )
    .bind(id)
    .bind(group_id)
    .bind(inviter_id)
    .bind(invitee_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    get_invitation(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn get_invitation(pool: &SqlitePool, id: Uuid) -> Result<Option<Invitation>, sqlx::Error> {
    let sql = format!("{INVITATION_SELECT} WHERE i.id = ?");
    let row = sqlx::query_as::<_, InvitationRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Invitation::from))
}

pub async fn has_pending(pool: &SqlitePool, group_id: Uuid, invitee_id: Uuid) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM group_invitations WHERE group_id = ? AND invitee_id = ? AND status = 'pending'",
    )
    .bind(group_id)
    .bind(invitee_id)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

/// Pending invitations of a group, newest first
pub async fn list_pending_for_group(pool: &SqlitePool, group_id: Uuid) -> Result<Vec<Invitation>, sqlx::Error> {
    let sql = format!(
        "{INVITATION_SELECT} WHERE i.group_id = ? AND i.status = 'pending' ORDER BY i.created_at DESC, i.rowid DESC"
    );
    let rows = sqlx::query_as::<_, InvitationRow>(&sql)
        .bind(group_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Invitation::from).collect())
}

/// Pending invitations addressed to a user, newest first
pub async fn list_pending_for_user(pool: &SqlitePool, invitee_id: Uuid) -> Result<Vec<Invitation>, sqlx::Error> {
    let sql = format!(
        "{INVITATION_SELECT} WHERE i.invitee_id = ? AND i.status = 'pending' ORDER BY i.created_at DESC, i.rowid DESC"
    );
    let rows = sqlx::query_as::<_, InvitationRow>(&sql)
        .bind(invitee_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Invitation::from).collect())
}

/// Move a pending invitation to `status`; false when it was no longer pending
pub async fn resolve_invitation(pool: &SqlitePool, id: Uuid, status: InvitationStatus) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE group_invitations SET status = ?, responded_at = ? WHERE id = ? AND status = 'pending'",
    )
    .bind(status.as_str())
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Accept a pending invitation and add the membership in one transaction
pub async fn accept_invitation(pool: &SqlitePool, id: Uuid, invitee_id: Uuid) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let group_id: Option<Uuid> = sqlx::query_scalar(
        r#"
        UPDATE group_invitations SET status = 'accepted', responded_at = ?
        WHERE id = ? AND invitee_id = ? AND status = 'pending'
        RETURNING group_id
        "#,
    )
    .bind(Utc::now())
    .bind(id)
    .bind(invitee_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(group_id) = group_id else {
        tx.rollback().await?;
        return Ok(false);
    };

    add_member(&mut *tx, group_id, invitee_id, GroupRole::Member).await?;
    tx.commit().await?;
    Ok(true)
}
