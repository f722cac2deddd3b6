use tokio::sync::RwLock;

use taskflow_core::domain::memory::MemoryRecord;

use super::{MemoryRepository, RepositoryError};

/// In-process memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct InMemoryMemoryRepository {
    records: RwLock<Vec<MemoryRecord>>,
}

impl InMemoryMemoryRepository {
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl MemoryRepository for InMemoryMemoryRepository {
    async fn add_user_memory(&self, record: MemoryRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        records.push(record);
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<MemoryRecord>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|record| record.user_id == user_id).cloned().collect())
    }
}
