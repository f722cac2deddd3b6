use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub memory: MemoryConfig,
    pub templates: TemplateConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: ModelProvider,
    pub model: String,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct MemoryConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Default)]
pub struct TemplateConfig {
    /// Optional on-disk PRD reference template; absence is tolerated.
    pub prd_template_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelProvider {
    Groq,
    Gemini,
    OpenAi,
    OpenAiCompatible,
    Mistral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub provider: Option<ModelProvider>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub database_url: Option<String>,
    pub prd_template_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                provider: ModelProvider::Groq,
                model: "llama-3.3-70b-versatile".to_string(),
                api_key: None,
                base_url: None,
                timeout_secs: 120,
            },
            memory: MemoryConfig {
                database_url: "sqlite://taskflow.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            templates: TemplateConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for ModelProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            "openai_like" | "openai_compatible" => Ok(Self::OpenAiCompatible),
            "mistral" => Ok(Self::Mistral),
            other => Err(ConfigError::Validation(format!(
                "unsupported model provider `{other}` (expected groq|gemini|openai|openai_compatible|mistral)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("taskflow.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(api_key) = llm.api_key {
                self.llm.api_key = Some(api_key.into());
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(memory) = patch.memory {
            if let Some(database_url) = memory.database_url {
                self.memory.database_url = database_url;
            }
            if let Some(max_connections) = memory.max_connections {
                self.memory.max_connections = max_connections;
            }
            if let Some(timeout_secs) = memory.timeout_secs {
                self.memory.timeout_secs = timeout_secs;
            }
        }

        if let Some(templates) = patch.templates {
            if let Some(prd_template_path) = templates.prd_template_path {
                self.templates.prd_template_path = Some(prd_template_path);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("TASKFLOW_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("TASKFLOW_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("TASKFLOW_LLM_API_KEY") {
            self.llm.api_key = Some(value.into());
        }
        if let Some(value) = read_env("TASKFLOW_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("TASKFLOW_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("TASKFLOW_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("TASKFLOW_MEMORY_DATABASE_URL") {
            self.memory.database_url = value;
        }
        if let Some(value) = read_env("TASKFLOW_MEMORY_MAX_CONNECTIONS") {
            self.memory.max_connections = parse_u32("TASKFLOW_MEMORY_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("TASKFLOW_MEMORY_TIMEOUT_SECS") {
            self.memory.timeout_secs = parse_u64("TASKFLOW_MEMORY_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("TASKFLOW_PRD_TEMPLATE_PATH") {
            self.templates.prd_template_path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("TASKFLOW_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("TASKFLOW_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(provider) = overrides.provider {
            self.llm.provider = provider;
        }
        if let Some(model) = overrides.model {
            self.llm.model = model;
        }
        if let Some(api_key) = overrides.api_key {
            self.llm.api_key = Some(api_key.into());
        }
        if let Some(base_url) = overrides.base_url {
            self.llm.base_url = Some(base_url);
        }
        if let Some(database_url) = overrides.database_url {
            self.memory.database_url = database_url;
        }
        if let Some(prd_template_path) = overrides.prd_template_path {
            self.templates.prd_template_path = Some(prd_template_path);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Validation("llm.timeout_secs must be positive".to_string()));
        }
        if self.llm.provider == ModelProvider::OpenAiCompatible && self.llm.base_url.is_none() {
            return Err(ConfigError::Validation(
                "llm.base_url is required for the openai_compatible provider".to_string(),
            ));
        }
        if self.memory.database_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "memory.database_url must not be empty".to_string(),
            ));
        }
        if self.memory.max_connections == 0 {
            return Err(ConfigError::Validation(
                "memory.max_connections must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("taskflow.toml"), PathBuf::from("config/taskflow.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    llm: Option<LlmPatch>,
    memory: Option<MemoryPatch>,
    templates: Option<TemplatePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Deserialize)]
struct LlmPatch {
    provider: Option<ModelProvider>,
    model: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct MemoryPatch {
    database_url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TemplatePatch {
    prd_template_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
