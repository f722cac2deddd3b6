use async_trait::async_trait;
use thiserror::Error;

use taskflow_core::domain::memory::MemoryRecord;

pub mod memory;
pub mod sql;

pub use memory::InMemoryMemoryRepository;
pub use sql::SqlMemoryRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Storage boundary for generated-document memories. Writes are
/// fire-and-forget appends keyed by user/session id; the query side exists
/// for later retrieval by the same user and is not used by the generation
/// pipeline itself.
#[async_trait]
pub trait MemoryRepository: Send + Sync {
    async fn add_user_memory(&self, record: MemoryRecord) -> Result<(), RepositoryError>;
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<MemoryRecord>, RepositoryError>;
}
