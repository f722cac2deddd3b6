use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

pub const MAX_DESCRIPTION_CHARS: usize = 160;

/// GitHub repository content produced from a PRD: a one-line description
/// plus a full README document. Validated once, immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryContent {
    pub description: String,
    pub readme_content: String,
}

impl RepositoryContent {
    /// Parses an extracted model payload and enforces the schema
    /// constraints. Any violation is a hard failure of the generation call.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let content: Self = serde_json::from_str(raw)
            .map_err(|source| ValidationError::InvalidJson(source.to_string()))?;
        content.validate()?;
        Ok(content)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "description" });
        }
        if self.readme_content.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "readme_content" });
        }
        let len = self.description.chars().count();
        if len > MAX_DESCRIPTION_CHARS {
            return Err(ValidationError::DescriptionTooLong { len, limit: MAX_DESCRIPTION_CHARS });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{RepositoryContent, MAX_DESCRIPTION_CHARS};
    use crate::errors::ValidationError;

    #[test]
    fn parse_accepts_valid_payload() {
        let content =
            RepositoryContent::parse("{\"description\": \"A tool\", \"readme_content\": \"# Title\"}")
                .expect("valid payload");
        assert_eq!(content.description, "A tool");
        assert_eq!(content.readme_content, "# Title");
    }

    #[test]
    fn serde_round_trip_preserves_fields() {
        let content = RepositoryContent {
            description: "A concise summary".to_string(),
            readme_content: "# Project\n\nDetails with `code` and emoji 🎯".to_string(),
        };
        let json = serde_json::to_string(&content).expect("serialize");
        let back: RepositoryContent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, content);
    }

    #[test]
    fn missing_readme_content_is_rejected_with_descriptive_error() {
        let err = RepositoryContent::parse("{\"description\": \"A tool\"}")
            .expect_err("missing field should fail");
        let message = err.to_string();
        assert!(message.contains("readme_content"), "unexpected message: {message}");
    }

    #[test]
    fn overlong_description_is_rejected() {
        let content = RepositoryContent {
            description: "x".repeat(MAX_DESCRIPTION_CHARS + 1),
            readme_content: "# Title".to_string(),
        };
        assert_eq!(
            content.validate(),
            Err(ValidationError::DescriptionTooLong {
                len: MAX_DESCRIPTION_CHARS + 1,
                limit: MAX_DESCRIPTION_CHARS
            })
        );
    }

    #[test]
    fn boundary_length_description_is_accepted() {
        let content = RepositoryContent {
            description: "x".repeat(MAX_DESCRIPTION_CHARS),
            readme_content: "# Title".to_string(),
        };
        assert!(content.validate().is_ok());
    }

    #[test]
    fn whitespace_only_fields_are_rejected() {
        let content = RepositoryContent {
            description: "   ".to_string(),
            readme_content: "# Title".to_string(),
        };
        assert_eq!(
            content.validate(),
            Err(ValidationError::EmptyField { field: "description" })
        );
    }

    #[test]
    fn non_json_payload_is_rejected() {
        let err = RepositoryContent::parse("# Just a markdown title").expect_err("not json");
        assert!(matches!(err, ValidationError::InvalidJson(_)));
    }
}
