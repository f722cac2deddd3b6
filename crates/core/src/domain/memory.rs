use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Topic labels attached to generated PRDs so the same user/session can
/// retrieve them later.
pub const PRD_TOPICS: [&str; 2] = ["PRD", "Product Requirements Document"];

/// A persisted memory entry keyed by the user/session that requested the
/// generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: Uuid,
    pub user_id: String,
    pub memory: String,
    pub topics: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    pub fn new(user_id: impl Into<String>, memory: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            memory: memory.into(),
            topics: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }
}
