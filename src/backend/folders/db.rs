//! Folder database operations
//!
//! Folders are owner-scoped; `snippet_count` only counts live snippets.
//! Deleting a folder leaves its snippets in place with `folder_id` cleared
//! (`ON DELETE SET NULL`).

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::Folder;

const FOLDER_SELECT: &str = r#"
    SELECT f.id, f.owner_id, f.name, f.created_at, f.updated_at,
           (SELECT COUNT(*) FROM snippets s WHERE s.folder_id = f.id AND s.deleted_at IS NULL) AS snippet_count
    FROM folders f
"#;

#[derive(Debug, sqlx::FromRow)]
struct FolderRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    snippet_count: i64,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl From<FolderRow> for Folder {
    fn from(row: FolderRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            snippet_count: row.snippet_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn create_folder(pool: &SqlitePool, owner_id: Uuid, name: &str) -> Result<Folder, sqlx::Error> {
    let now = Utc::now();
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO folders (id, owner_id, name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)")
        .bind(id)
        .bind(owner_id)
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

    Ok(Folder {
        id,
        owner_id,
        name: name.to_string(),
        snippet_count: 0,
        created_at: now,
        updated_at: now,
    })
}

/// Caller's folders ordered by name
pub async fn list_folders(pool: &SqlitePool, owner_id: Uuid) -> Result<Vec<Folder>, sqlx::Error> {
    let sql = format!("{FOLDER_SELECT} WHERE f.owner_id = ? ORDER BY f.name COLLATE NOCASE, f.rowid");
    let rows = sqlx::query_as::<_, FolderRow>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Folder::from).collect())
}

pub async fn get_folder(pool: &SqlitePool, owner_id: Uuid, id: Uuid) -> Result<Option<Folder>, sqlx::Error> {
    let sql = format!("{FOLDER_SELECT} WHERE f.id = ? AND f.owner_id = ?");
    let row = sqlx::query_as::<_, FolderRow>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Folder::from))
}

pub async fn owns_folder(pool: &SqlitePool, owner_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM folders WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn rename_folder(
    pool: &SqlitePool,
    owner_id: Uuid,
    id: Uuid,
    name: &str,
) -> Result<Option<Folder>, sqlx::Error> {
    let result = sqlx::query("UPDATE folders SET name = ?, updated_at = ? WHERE id = ? AND owner_id = ?")
        .bind(name)
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_folder(pool, owner_id, id).await
}

pub async fn delete_folder(pool: &SqlitePool, owner_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM folders WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
