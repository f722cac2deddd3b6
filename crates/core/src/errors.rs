use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("field `{field}` must not be empty")]
    EmptyField { field: &'static str },
    #[error("description is {len} characters; the limit is {limit}")]
    DescriptionTooLong { len: usize, limit: usize },
}

/// Failure taxonomy for a generation call. Extraction has no variant: it
/// degrades to raw text instead of failing.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("model provider failure: {0}")]
    Provider(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("memory persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl GenerationError {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }
}
