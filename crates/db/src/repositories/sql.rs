use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use taskflow_core::domain::memory::MemoryRecord;

use super::{MemoryRepository, RepositoryError};
use crate::DbPool;

pub struct SqlMemoryRepository {
    pool: DbPool,
}

impl SqlMemoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MemoryRepository for SqlMemoryRepository {
    async fn add_user_memory(&self, record: MemoryRecord) -> Result<(), RepositoryError> {
        let topics = serde_json::to_string(&record.topics)
            .map_err(|source| RepositoryError::Decode(source.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO memories (id, user_id, memory, topics, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.user_id)
        .bind(&record.memory)
        .bind(topics)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<MemoryRecord>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, memory, topics, created_at
            FROM memories
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(memory_record_from_row).collect()
    }
}

fn memory_record_from_row(row: &SqliteRow) -> Result<MemoryRecord, RepositoryError> {
    let id: String = row.get("id");
    let topics: String = row.get("topics");
    let created_at: String = row.get("created_at");

    Ok(MemoryRecord {
        id: Uuid::parse_str(&id)
            .map_err(|source| RepositoryError::Decode(format!("invalid memory id: {source}")))?,
        user_id: row.get("user_id"),
        memory: row.get("memory"),
        topics: serde_json::from_str::<BTreeSet<String>>(&topics)
            .map_err(|source| RepositoryError::Decode(format!("invalid topics: {source}")))?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|source| RepositoryError::Decode(format!("invalid created_at: {source}")))?
            .with_timezone(&Utc),
    })
}
