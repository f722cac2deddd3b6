use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use taskflow_core::config::{LlmConfig, ModelProvider};
use taskflow_core::errors::GenerationError;

use crate::llm::LlmClient;

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Builds the provider client selected by configuration. Groq, OpenAI,
/// Mistral, and OpenAI-compatible endpoints all speak the chat-completions
/// dialect and differ only in base URL; Gemini has its own wire shape.
pub fn client_from_config(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, GenerationError> {
    let http = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|source| GenerationError::Configuration(source.to_string()))?;

    let client: Arc<dyn LlmClient> = match config.provider {
        ModelProvider::Groq => Arc::new(ChatCompletionsClient::new(
            http,
            config.base_url.as_deref().unwrap_or(GROQ_BASE_URL),
            config.model.clone(),
            config.api_key.clone(),
        )),
        ModelProvider::OpenAi => Arc::new(ChatCompletionsClient::new(
            http,
            config.base_url.as_deref().unwrap_or(OPENAI_BASE_URL),
            config.model.clone(),
            config.api_key.clone(),
        )),
        ModelProvider::Mistral => Arc::new(ChatCompletionsClient::new(
            http,
            config.base_url.as_deref().unwrap_or(MISTRAL_BASE_URL),
            config.model.clone(),
            config.api_key.clone(),
        )),
        ModelProvider::OpenAiCompatible => {
            let base_url = config.base_url.as_deref().ok_or_else(|| {
                GenerationError::Configuration(
                    "openai_compatible provider requires llm.base_url".to_string(),
                )
            })?;
            Arc::new(ChatCompletionsClient::new(
                http,
                base_url,
                config.model.clone(),
                config.api_key.clone(),
            ))
        }
        ModelProvider::Gemini => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                GenerationError::Configuration("gemini provider requires llm.api_key".to_string())
            })?;
            Arc::new(GeminiClient::new(
                http,
                config.base_url.as_deref().unwrap_or(GEMINI_BASE_URL),
                config.model.clone(),
                api_key,
            ))
        }
    };

    Ok(client)
}

pub struct ChatCompletionsClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

impl ChatCompletionsClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<SecretString>,
    ) -> Self {
        Self { http, base_url: base_url.into(), model: model.into(), api_key }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("chat completions request to {url} failed"))?
            .error_for_status()
            .context("chat completions request was rejected")?;

        let parsed: ChatResponse =
            response.json().await.context("chat completions response was not valid JSON")?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completions response contained no message content"))
    }
}

pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl GeminiClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: SecretString,
    ) -> Self {
        Self { http, base_url: base_url.into(), model: model.into(), api_key }
    }
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let body =
            GeminiRequest { contents: vec![GeminiContent { parts: vec![GeminiPart { text: prompt }] }] };

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await
            .with_context(|| format!("generateContent request to {url} failed"))?
            .error_for_status()
            .context("generateContent request was rejected")?;

        let parsed: GeminiResponse =
            response.json().await.context("generateContent response was not valid JSON")?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(anyhow!("generateContent response contained no text parts"));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use taskflow_core::config::{LlmConfig, ModelProvider, TemplateConfig};
    use taskflow_core::errors::GenerationError;

    use super::client_from_config;
    use crate::prompt::PromptBuilder;
    use crate::repo_content::RepoContentGenerator;

    fn config(provider: ModelProvider) -> LlmConfig {
        LlmConfig {
            provider,
            model: "test-model".to_string(),
            api_key: Some("sk-test".to_string().into()),
            base_url: None,
            timeout_secs: 30,
        }
    }

    #[test]
    fn chat_completions_providers_construct_without_base_url() {
        for provider in [ModelProvider::Groq, ModelProvider::OpenAi, ModelProvider::Mistral] {
            assert!(client_from_config(&config(provider)).is_ok(), "{provider:?}");
        }
    }

    #[test]
    fn openai_compatible_without_base_url_is_a_configuration_error() {
        let result = client_from_config(&config(ModelProvider::OpenAiCompatible));
        assert!(matches!(result, Err(GenerationError::Configuration(_))));
    }

    #[test]
    fn constructed_client_feeds_a_generator_directly() {
        let client = client_from_config(&config(ModelProvider::Groq)).expect("client");
        let prompts = PromptBuilder::new(&TemplateConfig::default()).expect("prompts");
        let _generator = RepoContentGenerator::new(client, prompts);
    }

    #[test]
    fn gemini_without_api_key_is_a_configuration_error() {
        let mut gemini = config(ModelProvider::Gemini);
        gemini.api_key = None;
        let result = client_from_config(&gemini);
        assert!(matches!(result, Err(GenerationError::Configuration(_))));
    }
}
