/**
 * Snippet Database Operations
 *
 * Every query is scoped: owner-only operations filter on `owner_id`, and
 * `get_visible_snippet` encodes who may read a snippet they do not own
 * (public snippets and snippets shared to one of the reader's groups).
 *
 * Tags are stored as a JSON array and filtered with `json_each`.
 */

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::shared::validation::{escape_like, validate_language};
use crate::shared::{Snippet, SnippetQuery, SnippetSort, SnippetStats};

pub(crate) const SNIPPET_COLUMNS: &str = "id, owner_id, folder_id, title, description, code, language, \
     tags, is_favorite, is_public, created_at, updated_at, deleted_at";

/// Snippet row as stored in the database
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SnippetRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub code: String,
    pub language: String,
    pub tags: Json<Vec<String>>,
    pub is_favorite: bool,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<SnippetRow> for Snippet {
    fn from(row: SnippetRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            folder_id: row.folder_id,
            title: row.title,
            description: row.description,
            code: row.code,
            language: row.language,
            tags: row.tags.0,
            is_favorite: row.is_favorite,
            is_public: row.is_public,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

/// Validated fields of a new snippet
#[derive(Debug, Clone)]
pub struct NewSnippet {
    pub title: String,
    pub description: Option<String>,
    pub code: String,
    pub language: String,
    pub tags: Vec<String>,
    pub folder_id: Option<Uuid>,
    pub is_favorite: bool,
    pub is_public: bool,
}

pub async fn create_snippet(pool: &SqlitePool, owner_id: Uuid, new: NewSnippet) -> Result<Snippet, sqlx::Error> {
    let now = Utc::now();
    let sql = format!(
        r#"
        INSERT INTO snippets (id, owner_id, folder_id, title, description, code, language, tags,
                              is_favorite, is_public, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {SNIPPET_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, SnippetRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(new.folder_id)
        .bind(new.title)
        .bind(new.description)
        .bind(new.code)
        .bind(new.language)
        .bind(Json(new.tags))
        .bind(new.is_favorite)
        .bind(new.is_public)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;
    Ok(row.into())
}

/// Owner's snippet, archived or not
pub async fn get_owned_snippet(pool: &SqlitePool, owner_id: Uuid, id: Uuid) -> Result<Option<Snippet>, sqlx::Error> {
    let sql = format!("SELECT {SNIPPET_COLUMNS} FROM snippets WHERE id = ? AND owner_id = ?");
    let row = sqlx::query_as::<_, SnippetRow>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Snippet::from))
}

/// A snippet the viewer may read
///
/// Owners see their own snippets in any state. Anyone else sees a live
/// snippet when it is public or shared to a group they belong to.
pub async fn get_visible_snippet(pool: &SqlitePool, viewer_id: Uuid, id: Uuid) -> Result<Option<Snippet>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {SNIPPET_COLUMNS} FROM snippets
        WHERE id = ?1
          AND (
            owner_id = ?2
            OR (
              deleted_at IS NULL
              AND (
                is_public = 1
                OR EXISTS (
                  SELECT 1 FROM group_snippets gs
                  JOIN group_members gm ON gm.group_id = gs.group_id
                  WHERE gs.snippet_id = snippets.id AND gm.user_id = ?2
                )
              )
            )
          )
        "#
    );
    let row = sqlx::query_as::<_, SnippetRow>(&sql)
        .bind(id)
        .bind(viewer_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Snippet::from))
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Sqlite>, owner_id: Uuid, query: &'a SnippetQuery) {
    builder.push(" WHERE deleted_at IS NULL AND owner_id = ").push_bind(owner_id);

    if let Some(folder_id) = query.folder_id {
        builder.push(" AND folder_id = ").push_bind(folder_id);
    }
    if let Some(language) = query.language.as_deref().filter(|l| !l.trim().is_empty()) {
        let language = validate_language(language).unwrap_or_else(|_| language.trim().to_lowercase());
        builder.push(" AND language = ").push_bind(language);
    }
    if let Some(tag) = query.tag.as_deref().filter(|t| !t.trim().is_empty()) {
        builder
            .push(" AND EXISTS (SELECT 1 FROM json_each(snippets.tags) WHERE json_each.value = ")
            .push_bind(tag.trim().to_lowercase())
            .push(")");
    }
    if let Some(favorite) = query.favorite {
        builder.push(" AND is_favorite = ").push_bind(favorite);
    }
    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{}%", escape_like(q));
        builder
            .push(" AND (title LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR IFNULL(description, '') LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR code LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

/// Live snippets matching `query`, plus the unpaginated total
pub async fn list_snippets(
    pool: &SqlitePool,
    owner_id: Uuid,
    query: &SnippetQuery,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Snippet>, i64), sqlx::Error> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM snippets");
    push_filters(&mut count, owner_id, query);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {SNIPPET_COLUMNS} FROM snippets"));
    push_filters(&mut select, owner_id, query);
    select.push(match query.sort.unwrap_or_default() {
        SnippetSort::Updated => " ORDER BY updated_at DESC, rowid DESC",
        SnippetSort::Created => " ORDER BY created_at DESC, rowid DESC",
        SnippetSort::Title => " ORDER BY title COLLATE NOCASE ASC, rowid ASC",
    });
    select.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);

    let rows: Vec<SnippetRow> = select.build_query_as().fetch_all(pool).await?;
    Ok((rows.into_iter().map(Snippet::from).collect(), total))
}

/// Persist every editable field of `snippet`
pub async fn save_snippet(pool: &SqlitePool, snippet: &Snippet) -> Result<Snippet, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE snippets
        SET title = ?, description = ?, code = ?, language = ?, tags = ?, folder_id = ?,
            is_public = ?, updated_at = ?
        WHERE id = ? AND owner_id = ?
        RETURNING {SNIPPET_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, SnippetRow>(&sql)
        .bind(&snippet.title)
        .bind(&snippet.description)
        .bind(&snippet.code)
        .bind(&snippet.language)
        .bind(Json(&snippet.tags))
        .bind(snippet.folder_id)
        .bind(snippet.is_public)
        .bind(Utc::now())
        .bind(snippet.id)
        .bind(snippet.owner_id)
        .fetch_one(pool)
        .await?;
    Ok(row.into())
}

/// Flip the favorite flag of a live snippet
pub async fn toggle_favorite(pool: &SqlitePool, owner_id: Uuid, id: Uuid) -> Result<Option<Snippet>, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE snippets SET is_favorite = NOT is_favorite, updated_at = ?
        WHERE id = ? AND owner_id = ? AND deleted_at IS NULL
        RETURNING {SNIPPET_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, SnippetRow>(&sql)
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Snippet::from))
}

/// Move a live snippet to the archive
pub async fn archive_snippet(pool: &SqlitePool, owner_id: Uuid, id: Uuid) -> Result<Option<Snippet>, sqlx::Error> {
    let now = Utc::now();
    let sql = format!(
        r#"
        UPDATE snippets SET deleted_at = ?, updated_at = ?
        WHERE id = ? AND owner_id = ? AND deleted_at IS NULL
        RETURNING {SNIPPET_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, SnippetRow>(&sql)
        .bind(now)
        .bind(now)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Snippet::from))
}

/// Bring an archived snippet back
pub async fn restore_snippet(pool: &SqlitePool, owner_id: Uuid, id: Uuid) -> Result<Option<Snippet>, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE snippets SET deleted_at = NULL, updated_at = ?
        WHERE id = ? AND owner_id = ? AND deleted_at IS NOT NULL
        RETURNING {SNIPPET_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, SnippetRow>(&sql)
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Snippet::from))
}

/// Remove an archived snippet for good
pub async fn delete_archived_snippet(pool: &SqlitePool, owner_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM snippets WHERE id = ? AND owner_id = ? AND deleted_at IS NOT NULL")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Archived snippets, most recently deleted first
pub async fn list_archived(pool: &SqlitePool, owner_id: Uuid) -> Result<Vec<Snippet>, sqlx::Error> {
    let sql = format!(
        "SELECT {SNIPPET_COLUMNS} FROM snippets WHERE owner_id = ? AND deleted_at IS NOT NULL \
         ORDER BY deleted_at DESC, rowid DESC"
    );
    let rows = sqlx::query_as::<_, SnippetRow>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Snippet::from).collect())
}

pub async fn empty_archive(pool: &SqlitePool, owner_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM snippets WHERE owner_id = ? AND deleted_at IS NOT NULL")
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Permanently remove snippets archived before `cutoff`; returns their owners
pub async fn purge_archived_before(pool: &SqlitePool, cutoff: DateTime<Utc>) -> Result<Vec<Uuid>, sqlx::Error> {
    let archived: Vec<(Uuid, Uuid, DateTime<Utc>)> =
        sqlx::query_as("SELECT id, owner_id, deleted_at FROM snippets WHERE deleted_at IS NOT NULL")
            .fetch_all(pool)
            .await?;

    let mut owners = Vec::new();
    for (id, owner_id, deleted_at) in archived {
        if deleted_at >= cutoff {
            continue;
        }
        sqlx::query("DELETE FROM snippets WHERE id = ? AND deleted_at IS NOT NULL")
            .bind(id)
            .execute(pool)
            .await?;
        if !owners.contains(&owner_id) {
            owners.push(owner_id);
        }
    }
    Ok(owners)
}

pub async fn snippet_stats(pool: &SqlitePool, owner_id: Uuid) -> Result<SnippetStats, sqlx::Error> {
    let (total, favorites, archived): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN deleted_at IS NULL THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN deleted_at IS NULL AND is_favorite = 1 THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN deleted_at IS NOT NULL THEN 1 ELSE 0 END), 0)
        FROM snippets WHERE owner_id = ?
        "#,
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await?;

    let folders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE owner_id = ?")
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

    let by_language: Vec<(String, i64)> = sqlx::query_as(
        "SELECT language, COUNT(*) FROM snippets WHERE owner_id = ? AND deleted_at IS NULL GROUP BY language",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(SnippetStats {
        total,
        favorites,
        archived,
        folders,
        by_language: by_language.into_iter().collect::<BTreeMap<_, _>>(),
    })
}
