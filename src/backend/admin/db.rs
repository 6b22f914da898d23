//! Admin queries

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::backend::auth::users::{UserRecord, USER_COLUMNS};
use crate::shared::validation::escape_like;
use crate::shared::{AdminStats, User};

pub async fn admin_stats(pool: &SqlitePool) -> Result<AdminStats, sqlx::Error> {
    let (users, admins, disabled_users): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COALESCE(SUM(CASE WHEN role = 'admin' THEN 1 ELSE 0 END), 0),
               COALESCE(SUM(CASE WHEN is_disabled THEN 1 ELSE 0 END), 0)
        FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    let (snippets, archived_snippets): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(CASE WHEN deleted_at IS NULL THEN 1 ELSE 0 END), 0),
               COALESCE(SUM(CASE WHEN deleted_at IS NOT NULL THEN 1 ELSE 0 END), 0)
        FROM snippets
        "#,
    )
    .fetch_one(pool)
    .await?;

    let groups: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups")
        .fetch_one(pool)
        .await?;
    let active_api_keys: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_keys WHERE revoked_at IS NULL")
        .fetch_one(pool)
        .await?;

    Ok(AdminStats {
        users,
        admins,
        disabled_users,
        snippets,
        archived_snippets,
        groups,
        active_api_keys,
    })
}

/// Accounts, newest first, optionally filtered by username or email substring
pub async fn list_users(pool: &SqlitePool, q: Option<&str>, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {USER_COLUMNS} FROM users"));
    if let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{}%", escape_like(q));
        builder
            .push(" WHERE username LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR email LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\'");
    }
    builder
        .push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let rows: Vec<UserRecord> = builder.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(User::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::{create_user, update_account_flags};
    use crate::backend::server::database::Database;
    use crate::shared::UserRole;

    #[tokio::test]
    async fn test_stats_and_search() {
        let pool = Database::connect("sqlite::memory:").await.unwrap().into_pool();
        let root = create_user(&pool, "root", "root@example.com", "h", UserRole::Admin)
            .await
            .unwrap();
        let cat = create_user(&pool, "cat_lover", "cats@example.com", "h", UserRole::User)
            .await
            .unwrap();
        create_user(&pool, "dog", "dog@example.org", "h", UserRole::User)
            .await
            .unwrap();
        update_account_flags(&pool, cat.id, None, Some(true)).await.unwrap();

        let stats = admin_stats(&pool).await.unwrap();
        assert_eq!(stats.users, 3);
        assert_eq!(stats.admins, 1);
        assert_eq!(stats.disabled_users, 1);
        assert_eq!(stats.snippets, 0);

        let found = list_users(&pool, Some("example.org"), 50, 0).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "dog");

        let underscore = list_users(&pool, Some("t_l"), 50, 0).await.unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].id, cat.id);

        let page = list_users(&pool, None, 2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(list_users(&pool, None, 50, 0).await.unwrap().iter().any(|u| u.id == root.id));
    }
}
