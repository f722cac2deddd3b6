use std::fs;

use tera::{Context, Tera};
use tracing::warn;

use taskflow_core::config::TemplateConfig;
use taskflow_core::errors::GenerationError;

const PRD_PROMPT: &str = include_str!("../templates/prd_prompt.tera");
const REPO_CONTENT_PROMPT: &str = include_str!("../templates/repo_content_prompt.tera");

/// JSON schema embedded verbatim into the repository-content prompt so the
/// model can self-validate its output shape.
const REPOSITORY_CONTENT_SCHEMA: &str = r#"{
  "title": "RepositoryContent",
  "type": "object",
  "properties": {
    "description": {
      "type": "string",
      "description": "A concise description of the repository (max 160 chars)"
    },
    "readme_content": {
      "type": "string",
      "description": "Complete README content in markdown format"
    }
  },
  "required": ["description", "readme_content"]
}"#;

/// Pure string composition: fences the source document verbatim into a
/// rendered instruction template. No I/O after construction.
pub struct PromptBuilder {
    tera: Tera,
    prd_template: String,
}

impl PromptBuilder {
    pub fn new(config: &TemplateConfig) -> Result<Self, GenerationError> {
        let mut tera = Tera::default();
        tera.add_raw_templates([
            ("prd_prompt", PRD_PROMPT),
            ("repo_content_prompt", REPO_CONTENT_PROMPT),
        ])
        .map_err(|source| GenerationError::Configuration(source.to_string()))?;

        let prd_template = match &config.prd_template_path {
            Some(path) => match fs::read_to_string(path) {
                Ok(contents) => contents,
                Err(source) => {
                    warn!(
                        event_name = "prompt.template.load_failed",
                        path = %path.display(),
                        error = %source,
                        "PRD template loading failed, proceeding without template"
                    );
                    String::new()
                }
            },
            None => String::new(),
        };

        Ok(Self { tera, prd_template })
    }

    pub fn prd_prompt(&self, brd: &str) -> Result<String, GenerationError> {
        let mut context = Context::new();
        context.insert("prd_template", &self.prd_template);
        context.insert("brd", brd);
        self.render("prd_prompt", &context)
    }

    pub fn repo_content_prompt(&self, repo_name: &str, prd: &str) -> Result<String, GenerationError> {
        let mut context = Context::new();
        context.insert("schema", REPOSITORY_CONTENT_SCHEMA);
        context.insert("repo_name", repo_name);
        context.insert("prd", prd);
        self.render("repo_content_prompt", &context)
    }

    fn render(&self, template: &str, context: &Context) -> Result<String, GenerationError> {
        self.tera
            .render(template, context)
            .map_err(|source| GenerationError::Configuration(source.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use taskflow_core::config::TemplateConfig;

    use super::PromptBuilder;

    #[test]
    fn prd_prompt_fences_the_brd_verbatim() {
        let builder = PromptBuilder::new(&TemplateConfig::default()).expect("builder");
        let prompt = builder.prd_prompt("Goal: build a widget store.").expect("render");

        assert!(prompt.contains("```markdown\nGoal: build a widget store.\n```"));
        assert!(prompt.contains("PRD Template Reference:"));
        assert!(prompt.contains("expert product manager"));
    }

    #[test]
    fn missing_template_file_is_tolerated() {
        let config = TemplateConfig {
            prd_template_path: Some(PathBuf::from("does/not/exist/prd_template.md")),
        };
        let builder = PromptBuilder::new(&config).expect("builder");
        let prompt = builder.prd_prompt("BRD text").expect("render");
        // Reference section renders with an empty template body.
        assert!(prompt.contains("PRD Template Reference:\n```markdown\n\n```"));
    }

    #[test]
    fn on_disk_template_is_embedded() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "## Section From Disk").expect("write template");

        let config = TemplateConfig { prd_template_path: Some(file.path().to_path_buf()) };
        let builder = PromptBuilder::new(&config).expect("builder");
        let prompt = builder.prd_prompt("BRD text").expect("render");
        assert!(prompt.contains("## Section From Disk"));
    }

    #[test]
    fn repo_content_prompt_embeds_schema_and_documents() {
        let builder = PromptBuilder::new(&TemplateConfig::default()).expect("builder");
        let prompt = builder.repo_content_prompt("widget-store", "# PRD\nDetails").expect("render");

        assert!(prompt.contains("\"title\": \"RepositoryContent\""));
        assert!(prompt.contains("\"required\": [\"description\", \"readme_content\"]"));
        assert!(prompt.contains("'widget-store'"));
        assert!(prompt.contains("```markdown\n# PRD\nDetails\n```"));
    }
}
