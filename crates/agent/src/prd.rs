use std::sync::Arc;

use tracing::{error, info};

use taskflow_core::domain::generation::{GeneratedPrd, GenerationResult};
use taskflow_core::domain::memory::{MemoryRecord, PRD_TOPICS};
use taskflow_core::errors::GenerationError;
use taskflow_core::extract::extract_fenced_block;
use taskflow_db::repositories::MemoryRepository;

use crate::llm::LlmClient;
use crate::prompt::PromptBuilder;

const DEFAULT_PROJECT_NAME: &str = "Unnamed Project";

/// BRD → PRD orchestration. Strictly linear: build prompt, one awaited
/// model call, extract, record memory, report. Failures surface as typed
/// errors; nothing propagates as a panic.
pub struct PrdGenerator {
    llm: Arc<dyn LlmClient>,
    memory: Arc<dyn MemoryRepository>,
    prompts: PromptBuilder,
}

impl PrdGenerator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        memory: Arc<dyn MemoryRepository>,
        prompts: PromptBuilder,
    ) -> Self {
        Self { llm, memory, prompts }
    }

    pub async fn generate(
        &self,
        brd: &str,
        project_name: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<GeneratedPrd, GenerationError> {
        let project_name = project_name.unwrap_or(DEFAULT_PROJECT_NAME);
        info!(event_name = "prd.generate.start", project_name, "generating PRD");

        let outcome = self.run(brd, project_name, user_id).await;
        match &outcome {
            Ok(_) => {
                info!(event_name = "prd.generate.success", project_name, "PRD generated");
            }
            Err(err) => {
                error!(event_name = "prd.generate.failed", project_name, error = %err, "PRD generation failed");
            }
        }
        outcome
    }

    /// Same as [`generate`](Self::generate), reported as the status-tagged
    /// envelope for callers that serialize the outcome.
    pub async fn generate_report(
        &self,
        brd: &str,
        project_name: Option<&str>,
        user_id: Option<&str>,
    ) -> GenerationResult {
        self.generate(brd, project_name, user_id).await.into()
    }

    async fn run(
        &self,
        brd: &str,
        project_name: &str,
        user_id: Option<&str>,
    ) -> Result<GeneratedPrd, GenerationError> {
        let prompt = self.prompts.prd_prompt(brd)?;

        let response = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|source| GenerationError::Provider(source.to_string()))?;

        let content = extract_fenced_block(&response).to_string();
        if content.is_empty() {
            return Err(GenerationError::provider("model returned empty content"));
        }

        if let Some(user_id) = user_id {
            let record = MemoryRecord::new(
                user_id,
                format!("Project PRD:\n```markdown\n{content}\n```"),
            )
            .with_topics(PRD_TOPICS);
            self.memory
                .add_user_memory(record)
                .await
                .map_err(|source| GenerationError::Persistence(source.to_string()))?;
        }

        Ok(GeneratedPrd { content, project_name: project_name.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use taskflow_core::config::TemplateConfig;
    use taskflow_core::domain::generation::GenerationResult;
    use taskflow_core::domain::memory::PRD_TOPICS;
    use taskflow_core::errors::GenerationError;
    use taskflow_db::repositories::{InMemoryMemoryRepository, MemoryRepository};

    use super::PrdGenerator;
    use crate::llm::LlmClient;
    use crate::prompt::PromptBuilder;

    struct FixedResponseClient(&'static str);

    #[async_trait]
    impl LlmClient for FixedResponseClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingClient;

    #[async_trait]
    impl LlmClient for FailingClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(anyhow!("network unreachable"))
        }
    }

    fn generator(
        llm: impl LlmClient + 'static,
    ) -> (PrdGenerator, Arc<InMemoryMemoryRepository>) {
        let memory = Arc::new(InMemoryMemoryRepository::default());
        let prompts = PromptBuilder::new(&TemplateConfig::default()).expect("prompts");
        (PrdGenerator::new(Arc::new(llm), memory.clone(), prompts), memory)
    }

    #[tokio::test]
    async fn success_returns_trimmed_inner_markdown() {
        let (generator, _memory) = generator(FixedResponseClient(
            "```markdown\n# PRD\n\n## Introduction\nA widget store.\n```  \n",
        ));

        let prd = generator.generate("BRD text", Some("Widget Store"), None).await.expect("prd");
        assert_eq!(prd.content, "# PRD\n\n## Introduction\nA widget store.");
        assert_eq!(prd.project_name, "Widget Store");
    }

    #[tokio::test]
    async fn success_with_user_id_records_memory_with_prd_topics() {
        let (generator, memory) =
            generator(FixedResponseClient("```markdown\n# PRD\n```"));

        generator.generate("BRD text", None, Some("user-7")).await.expect("prd");

        let records = memory.list_for_user("user-7").await.expect("list");
        assert_eq!(records.len(), 1);
        assert!(records[0].memory.contains("# PRD"));
        for topic in PRD_TOPICS {
            assert!(records[0].topics.contains(topic));
        }
    }

    #[tokio::test]
    async fn success_without_user_id_skips_memory() {
        let (generator, memory) =
            generator(FixedResponseClient("```markdown\n# PRD\n```"));

        generator.generate("BRD text", None, None).await.expect("prd");
        assert!(memory.is_empty().await);
    }

    #[tokio::test]
    async fn provider_failure_is_reported_and_memory_is_never_written() {
        let (generator, memory) = generator(FailingClient);

        let err = generator
            .generate("BRD text", None, Some("user-7"))
            .await
            .expect_err("should fail");
        assert!(matches!(err, GenerationError::Provider(_)));
        assert!(err.to_string().contains("network unreachable"));
        assert!(memory.is_empty().await);
    }

    #[tokio::test]
    async fn unfenced_response_degrades_to_raw_text() {
        let (generator, _memory) =
            generator(FixedResponseClient("  # PRD without fences\ncontent  "));

        let prd = generator.generate("BRD text", None, None).await.expect("prd");
        assert_eq!(prd.content, "# PRD without fences\ncontent");
    }

    #[tokio::test]
    async fn default_project_name_applies() {
        let (generator, _memory) = generator(FixedResponseClient("```markdown\n# PRD\n```"));
        let prd = generator.generate("BRD text", None, None).await.expect("prd");
        assert_eq!(prd.project_name, "Unnamed Project");
    }

    #[tokio::test]
    async fn report_envelope_wraps_failures_without_panicking() {
        let (generator, _memory) = generator(FailingClient);
        let result = generator.generate_report("BRD text", None, None).await;

        match result {
            GenerationResult::Error { error } => assert!(error.contains("network unreachable")),
            GenerationResult::Success { .. } => panic!("expected error envelope"),
        }
    }
}
