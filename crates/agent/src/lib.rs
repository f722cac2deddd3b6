//! Document generation services - LLM-backed BRD → PRD and PRD → repository
//! content pipelines.
//!
//! Both services share one shape:
//!
//! 1. **Prompt construction** (`prompt`) - tera-rendered instructions with the
//!    source document fenced verbatim
//! 2. **Model invocation** (`llm`, `providers`) - a single completion call
//!    behind the `LlmClient` seam
//! 3. **Extraction** - last fenced block wins, raw text as fallback
//!    (`taskflow_core::extract`)
//! 4. **Validation & reporting** - typed results, no raw faults escape
//!
//! # Key Types
//!
//! - `PrdGenerator` - BRD → PRD markdown, with a memory-store side effect
//! - `RepoContentGenerator` - PRD → validated `RepositoryContent` JSON
//! - `LlmClient` - pluggable completion trait; `client_from_config` selects
//!   a provider family from configuration
//!
//! The LLM does all of the reasoning. These services only shape prompts and
//! police the response format; nothing here retries, branches, or decides
//! content.

pub mod llm;
pub mod prd;
pub mod prompt;
pub mod providers;
pub mod repo_content;

pub use llm::LlmClient;
pub use prd::PrdGenerator;
pub use prompt::PromptBuilder;
pub use providers::client_from_config;
pub use repo_content::RepoContentGenerator;
