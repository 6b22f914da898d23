/**
 * User Model and Database Operations
 *
 * This module handles user rows and their database operations. `UserRecord`
 * carries the password hash and never leaves the backend; handlers return
 * the shared `User` view instead.
 */

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::{User, UserRole};

pub(crate) const USER_COLUMNS: &str =
    "id, username, email, password_hash, display_name, bio, role, is_disabled, created_at, updated_at";

/// User row as stored in the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    /// Username (unique, 3-30 chars, alphanumeric + underscore)
    pub username: String,
    /// Lower-cased email address (unique)
    pub email: String,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub role: String,
    pub is_disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn role(&self) -> UserRole {
        UserRole::from_str(&self.role).unwrap_or_default()
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            bio: self.bio.clone(),
            role: self.role(),
            is_disabled: self.is_disabled,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        record.to_user()
    }
}

/// Create a new user
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: UserRole,
) -> Result<UserRecord, sqlx::Error> {
    let now = Utc::now();
    let sql = format!(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, is_disabled, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 0, ?, ?)
        RETURNING {USER_COLUMNS}
        "#
    );

    sqlx::query_as::<_, UserRecord>(&sql)
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
}

/// Get user by ID
pub async fn get_user_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<UserRecord>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    sqlx::query_as::<_, UserRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Get user by (lower-cased) email
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRecord>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
    sqlx::query_as::<_, UserRecord>(&sql)
        .bind(email.to_lowercase())
        .fetch_optional(pool)
        .await
}

/// Get user by username, case-insensitively
pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<UserRecord>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ? COLLATE NOCASE");
    sqlx::query_as::<_, UserRecord>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Look up a login identifier, which may be a username or an email
pub async fn get_user_by_login(
    pool: &SqlitePool,
    identifier: &str,
) -> Result<Option<UserRecord>, sqlx::Error> {
    let identifier = identifier.trim();
    if identifier.contains('@') {
        get_user_by_email(pool, identifier).await
    } else {
        get_user_by_username(pool, identifier).await
    }
}

/// Overwrite the editable profile fields
pub async fn update_profile(
    pool: &SqlitePool,
    id: Uuid,
    username: &str,
    display_name: Option<&str>,
    bio: Option<&str>,
) -> Result<UserRecord, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE users SET username = ?, display_name = ?, bio = ?, updated_at = ?
        WHERE id = ?
        RETURNING {USER_COLUMNS}
        "#
    );
    sqlx::query_as::<_, UserRecord>(&sql)
        .bind(username)
        .bind(display_name)
        .bind(bio)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn update_password(pool: &SqlitePool, id: Uuid, password_hash: &str) -> Result<(), sqlx::Error> {
    let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

/// Set role and/or disabled flag
pub async fn update_account_flags(
    pool: &SqlitePool,
    id: Uuid,
    role: Option<UserRole>,
    is_disabled: Option<bool>,
) -> Result<UserRecord, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE users
        SET role = COALESCE(?, role), is_disabled = COALESCE(?, is_disabled), updated_at = ?
        WHERE id = ?
        RETURNING {USER_COLUMNS}
        "#
    );
    sqlx::query_as::<_, UserRecord>(&sql)
        .bind(role.map(|r| r.as_str()))
        .bind(is_disabled)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Delete a user and, through cascades, everything they own
pub async fn delete_user(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
