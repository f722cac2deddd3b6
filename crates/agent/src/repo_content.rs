use std::sync::Arc;

use tracing::{error, info};

use taskflow_core::domain::repository::RepositoryContent;
use taskflow_core::errors::GenerationError;
use taskflow_core::extract::extract_fenced_block;

use crate::llm::LlmClient;
use crate::prompt::PromptBuilder;

/// PRD → GitHub repository content (description + README). The prompt
/// embeds the RepositoryContent JSON schema; the response must contain a
/// parseable, constraint-passing JSON payload or the call fails.
pub struct RepoContentGenerator {
    llm: Arc<dyn LlmClient>,
    prompts: PromptBuilder,
}

impl RepoContentGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptBuilder) -> Self {
        Self { llm, prompts }
    }

    pub async fn generate(
        &self,
        repo_name: &str,
        prd: &str,
    ) -> Result<RepositoryContent, GenerationError> {
        info!(event_name = "repo_content.generate.start", repo_name, "generating repository content");

        let outcome = self.run(repo_name, prd).await;
        match &outcome {
            Ok(_) => {
                info!(
                    event_name = "repo_content.generate.success",
                    repo_name, "repository content generated"
                );
            }
            Err(err) => {
                error!(
                    event_name = "repo_content.generate.failed",
                    repo_name, error = %err, "repository content generation failed"
                );
            }
        }
        outcome
    }

    async fn run(&self, repo_name: &str, prd: &str) -> Result<RepositoryContent, GenerationError> {
        let prompt = self.prompts.repo_content_prompt(repo_name, prd)?;

        let response = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|source| GenerationError::Provider(source.to_string()))?;
        if response.trim().is_empty() {
            return Err(GenerationError::provider("model returned empty content"));
        }

        let payload = extract_fenced_block(&response);
        Ok(RepositoryContent::parse(payload)?)
    }
}
