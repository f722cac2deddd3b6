use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

/// Success payload of the BRD → PRD flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPrd {
    pub content: String,
    pub project_name: String,
}

/// Status-tagged envelope for callers that want the generation outcome as a
/// serializable value rather than a `Result`. Exactly one variant is ever
/// populated per invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GenerationResult {
    Success { content: String, project_name: String },
    Error { error: String },
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<Result<GeneratedPrd, GenerationError>> for GenerationResult {
    fn from(outcome: Result<GeneratedPrd, GenerationError>) -> Self {
        match outcome {
            Ok(prd) => Self::Success { content: prd.content, project_name: prd.project_name },
            Err(error) => Self::Error { error: error.to_string() },
        }
    }
}
