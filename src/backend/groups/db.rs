/**
 * Group Database Operations
 *
 * Groups, memberships and snippets shared into groups. Invitations and the
 * activity feed have their own modules.
 *
 * Membership is the access boundary: callers that are not members get
 * `None` from the scoped lookups, which handlers turn into 404 so a group's
 * existence is not leaked.
 */

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::snippets::db::SnippetRow;
use crate::shared::{Group, GroupMember, GroupRole, GroupSummary, SharedSnippet};

#[derive(Debug, sqlx::FromRow)]
struct GroupRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GroupSummaryRow {
    #[sqlx(flatten)]
    group: GroupRow,
    role: String,
    member_count: i64,
}

impl From<GroupSummaryRow> for GroupSummary {
    fn from(row: GroupSummaryRow) -> Self {
        Self {
            group: row.group.into(),
            role: parse_role(&row.role),
            member_count: row.member_count,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    user_id: Uuid,
    username: String,
    display_name: Option<String>,
    role: String,
    joined_at: DateTime<Utc>,
}

impl From<MemberRow> for GroupMember {
    fn from(row: MemberRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            display_name: row.display_name,
            role: parse_role(&row.role),
            joined_at: row.joined_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SharedSnippetRow {
    #[sqlx(flatten)]
    snippet: SnippetRow,
    shared_by: Uuid,
    shared_by_username: String,
    shared_at: DateTime<Utc>,
}

impl From<SharedSnippetRow> for SharedSnippet {
    fn from(row: SharedSnippetRow) -> Self {
        Self {
            snippet: row.snippet.into(),
            shared_by: row.shared_by,
            shared_by_username: row.shared_by_username,
            shared_at: row.shared_at,
        }
    }
}

/// Stored roles are written by this module; anything unknown is a plain member
fn parse_role(role: &str) -> GroupRole {
    GroupRole::from_str(role).unwrap_or(GroupRole::Member)
}

const SUMMARY_SELECT: &str = r#"
    SELECT g.id, g.name, g.description, g.owner_id, g.created_at, g.updated_at,
           gm.role,
           (SELECT COUNT(*) FROM group_members c WHERE c.group_id = g.id) AS member_count
    FROM groups g
    JOIN group_members gm ON gm.group_id = g.id
"#;

/// Create a group with `owner_id` as its owner member
pub async fn create_group(
    pool: &SqlitePool,
    owner_id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<Group, sqlx::Error> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, GroupRow>(
        r#"
        INSERT INTO groups (id, name, description, owner_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, name, description, owner_id, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .bind(owner_id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    add_member(&mut *tx, row.id, owner_id, GroupRole::Owner).await?;
    tx.commit().await?;

    Ok(row.into())
}

pub async fn get_group(pool: &SqlitePool, id: Uuid) -> Result<Option<Group>, sqlx::Error> {
    let row = sqlx::query_as::<_, GroupRow>(
        "SELECT id, name, description, owner_id, created_at, updated_at FROM groups WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Group::from))
}

/// The group as seen by `user_id`, or `None` when they are not a member
pub async fn get_summary(pool: &SqlitePool, group_id: Uuid, user_id: Uuid) -> Result<Option<GroupSummary>, sqlx::Error> {
    let sql = format!("{SUMMARY_SELECT} WHERE g.id = ? AND gm.user_id = ?");
    let row = sqlx::query_as::<_, GroupSummaryRow>(&sql)
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(GroupSummary::from))
}

/// Groups `user_id` belongs to, by name
pub async fn list_groups_for(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<GroupSummary>, sqlx::Error> {
    let sql = format!("{SUMMARY_SELECT} WHERE gm.user_id = ? ORDER BY g.name COLLATE NOCASE, g.rowid");
    let rows = sqlx::query_as::<_, GroupSummaryRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(GroupSummary::from).collect())
}

pub async fn update_group(
    pool: &SqlitePool,
    id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<Option<Group>, sqlx::Error> {
    let row = sqlx::query_as::<_, GroupRow>(
        r#"
        UPDATE groups SET name = ?, description = ?, updated_at = ?
        WHERE id = ?
        RETURNING id, name, description, owner_id, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Group::from))
}

pub async fn delete_group(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM groups WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn member_role(pool: &SqlitePool, group_id: Uuid, user_id: Uuid) -> Result<Option<GroupRole>, sqlx::Error> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM group_members WHERE group_id = ? AND user_id = ?")
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(role.as_deref().map(parse_role))
}

/// Members with the owner first, then admins, then by join time
pub async fn list_members(pool: &SqlitePool, group_id: Uuid) -> Result<Vec<GroupMember>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT gm.user_id, u.username, u.display_name, gm.role, gm.joined_at
        FROM group_members gm
        JOIN users u ON u.id = gm.user_id
        WHERE gm.group_id = ?
        ORDER BY CASE gm.role WHEN 'owner' THEN 0 WHEN 'admin' THEN 1 ELSE 2 END,
                 gm.joined_at, gm.rowid
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(GroupMember::from).collect())
}

pub async fn member_ids(pool: &SqlitePool, group_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT user_id FROM group_members WHERE group_id = ?")
        .bind(group_id)
        .fetch_all(pool)
        .await
}

/// Insert a membership; an existing membership is left untouched
pub async fn add_member<'e, E>(executor: E, group_id: Uuid, user_id: Uuid, role: GroupRole) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO group_members (group_id, user_id, role, joined_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (group_id, user_id) DO NOTHING
        "#,
    )
    .bind(group_id)
    .bind(user_id)
    .bind(role.as_str())
    .bind(Utc::now())
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn remove_member(pool: &SqlitePool, group_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM group_members WHERE group_id = ? AND user_id = ?")
        .bind(group_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_member_role(pool: &SqlitePool, group_id: Uuid, user_id: Uuid, role: GroupRole) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE group_members SET role = ? WHERE group_id = ? AND user_id = ?")
        .bind(role.as_str())
        .bind(group_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn share_snippet(
    pool: &SqlitePool,
    group_id: Uuid,
    snippet_id: Uuid,
    shared_by: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO group_snippets (group_id, snippet_id, shared_by, shared_at) VALUES (?, ?, ?, ?)")
        .bind(group_id)
        .bind(snippet_id)
        .bind(shared_by)
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(())
}

/// Live snippets shared into the group, most recently shared first
pub async fn list_shared_snippets(pool: &SqlitePool, group_id: Uuid) -> Result<Vec<SharedSnippet>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SharedSnippetRow>(
        r#"
        SELECT s.id, s.owner_id, s.folder_id, s.title, s.description, s.code, s.language, s.tags,
               s.is_favorite, s.is_public, s.created_at, s.updated_at, s.deleted_at,
               gs.shared_by, u.username AS shared_by_username, gs.shared_at
        FROM group_snippets gs
        JOIN snippets s ON s.id = gs.snippet_id
        JOIN users u ON u.id = gs.shared_by
        WHERE gs.group_id = ? AND s.deleted_at IS NULL
        ORDER BY gs.shared_at DESC, gs.rowid DESC
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(SharedSnippet::from).collect())
}

/// Who shared the snippet and who owns it, if it is shared into the group
pub async fn get_share(pool: &SqlitePool, group_id: Uuid, snippet_id: Uuid) -> Result<Option<(Uuid, Uuid)>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT gs.shared_by, s.owner_id
        FROM group_snippets gs
        JOIN snippets s ON s.id = gs.snippet_id
        WHERE gs.group_id = ? AND gs.snippet_id = ?
        "#,
    )
    .bind(group_id)
    .bind(snippet_id)
    .fetch_optional(pool)
    .await
}

pub async fn unshare_snippet(pool: &SqlitePool, group_id: Uuid, snippet_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM group_snippets WHERE group_id = ? AND snippet_id = ?")
        .bind(group_id)
        .bind(snippet_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
