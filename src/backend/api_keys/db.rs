/**
 * API Key Database Operations
 *
 * Keys look like `cp_<prefix>_<secret>`. The prefix is stored in clear and
 * indexed; the full key is only stored as a SHA-256 hex digest.
 */

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::api_key::{parse_key_prefix, API_KEY_MARKER};
use crate::shared::{ApiKeySummary, CreatedApiKey};

pub const PREFIX_LEN: usize = 8;
pub const SECRET_LEN: usize = 32;
/// Active keys a single user may hold
pub const MAX_ACTIVE_KEYS: i64 = 10;

#[derive(Debug, sqlx::FromRow)]
struct ApiKeyRow {
    id: Uuid,
    name: String,
    prefix: String,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<ApiKeyRow> for ApiKeySummary {
    fn from(row: ApiKeyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            prefix: row.prefix,
            created_at: row.created_at,
            last_used_at: row.last_used_at,
            revoked_at: row.revoked_at,
        }
    }
}

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Fresh `(prefix, full key)` pair
pub fn generate_key() -> (String, String) {
    let prefix = random_alphanumeric(PREFIX_LEN);
    let key = format!("{}{}_{}", API_KEY_MARKER, prefix, random_alphanumeric(SECRET_LEN));
    (prefix, key)
}

/// SHA-256 hex digest of the full key
pub fn hash_key(key: &str) -> String {
    format!("{:x}", Sha256::digest(key.as_bytes()))
}

fn digests_match(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Issue a key unless the user already holds `max_active` active ones.
/// The count and the insert are one statement, so concurrent requests
/// cannot overshoot the cap.
pub async fn create_key(
    pool: &SqlitePool,
    user_id: Uuid,
    name: &str,
    max_active: i64,
) -> Result<Option<CreatedApiKey>, sqlx::Error> {
    let (prefix, key) = generate_key();
    let id = Uuid::new_v4();
    let created_at = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO api_keys (id, user_id, name, prefix, key_hash, created_at)
        SELECT ?1, ?2, ?3, ?4, ?5, ?6
        WHERE (SELECT COUNT(*) FROM api_keys WHERE user_id = ?2 AND revoked_at IS NULL) < ?7
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(name)
    .bind(&prefix)
    .bind(hash_key(&key))
    .bind(created_at)
    .bind(max_active)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    Ok(Some(CreatedApiKey {
        id,
        name: name.to_string(),
        prefix,
        key,
        created_at,
    }))
}

/// All of a user's keys, newest first
pub async fn list_keys(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<ApiKeySummary>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ApiKeyRow>(
        r#"
        SELECT id, name, prefix, created_at, last_used_at, revoked_at
        FROM api_keys WHERE user_id = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(ApiKeySummary::from).collect())
}

pub async fn get_key(pool: &SqlitePool, user_id: Uuid, id: Uuid) -> Result<Option<ApiKeySummary>, sqlx::Error> {
    let row = sqlx::query_as::<_, ApiKeyRow>(
        "SELECT id, name, prefix, created_at, last_used_at, revoked_at FROM api_keys WHERE id = ? AND user_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(ApiKeySummary::from))
}

/// Revoke an active key; false when it does not exist or is already revoked
pub async fn revoke_key(pool: &SqlitePool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE api_keys SET revoked_at = ? WHERE id = ? AND user_id = ? AND revoked_at IS NULL")
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Resolve a presented key to `(key_id, user_id)` if it is valid and active
pub async fn authenticate_key(pool: &SqlitePool, key: &str) -> Result<Option<(Uuid, Uuid)>, sqlx::Error> {
    let Some(prefix) = parse_key_prefix(key) else {
        return Ok(None);
    };

    let row: Option<(Uuid, Uuid, String)> =
        sqlx::query_as("SELECT id, user_id, key_hash FROM api_keys WHERE prefix = ? AND revoked_at IS NULL")
            .bind(prefix)
            .fetch_optional(pool)
            .await?;

    Ok(row
        .filter(|(_, _, stored)| digests_match(stored, &hash_key(key)))
        .map(|(id, user_id, _)| (id, user_id)))
}

pub async fn touch_last_used(pool: &SqlitePool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE api_keys SET last_used_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
