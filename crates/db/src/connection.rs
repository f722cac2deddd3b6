use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use taskflow_core::config::MemoryConfig;

pub type DbPool = sqlx::SqlitePool;

pub async fn connect(config: &MemoryConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&config.database_url, config.max_connections, config.timeout_secs).await
}

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                // WAL keeps concurrent memory appends from blocking readers.
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}
