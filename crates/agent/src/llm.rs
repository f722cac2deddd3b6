use anyhow::Result;
use async_trait::async_trait;

/// The one operation the pipeline needs from a hosted model: prompt in,
/// free text out. Provider families implement this in `providers`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
