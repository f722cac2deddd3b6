pub mod config;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod logging;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, ModelProvider};
pub use domain::generation::{GeneratedPrd, GenerationResult};
pub use domain::memory::{MemoryRecord, PRD_TOPICS};
pub use domain::repository::RepositoryContent;
pub use errors::{GenerationError, ValidationError};
pub use extract::extract_fenced_block;
