/**
 * Database Connection
 *
 * Opens the SQLite pool and applies the embedded migrations.
 *
 * File databases run in WAL mode with foreign keys enforced. In-memory
 * databases (used by tests) live only as long as their connection, so the
 * pool keeps exactly one connection open forever.
 */

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

/// Database connection manager
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

impl Database {
    /// Open the database at `url` and run pending migrations
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.foreign_keys(true);

        let pool = if is_memory_url(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            let options = options
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
            SqlitePoolOptions::new()
                .max_connections(8)
                .connect_with(options)
                .await?
        };

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database ready ({})", if is_memory_url(url) { "in-memory" } else { "file" });

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn into_pool(self) -> SqlitePool {
        self.pool
    }

    /// Cheap liveness probe for the health endpoint
    pub async fn ping(pool: &SqlitePool) -> bool {
        sqlx::query("SELECT 1").execute(pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_url_detection() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url("sqlite://file.db?mode=memory&cache=shared"));
        assert!(!is_memory_url("sqlite://codepocket.db?mode=rwc"));
    }

    #[tokio::test]
    async fn test_connect_runs_migrations() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        for expected in ["api_keys", "audit_events", "folders", "group_activity", "groups", "snippets", "users"] {
            assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
        }
        assert!(Database::ping(db.pool()).await);
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("pocket.db").display());

        let db = Database::connect(&url).await.unwrap();
        assert!(Database::ping(db.pool()).await);
        assert!(dir.path().join("pocket.db").exists());
    }
}
