//! Prompt templates for Lese.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub rag: RagPrompts,
    pub summarize: SummarizePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for grounded question answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// System instruction when document context is available. Expects {{context}}.
    pub grounded_system: String,
    /// System instruction when no document is attached.
    pub general_system: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            grounded_system: r#"You are a helpful AI assistant.
Use the following context to answer the question:

CONTEXT:
{{context}}

INSTRUCTION:
- If the question is unrelated to the context, first say:
  "This question is not related to the attached content."
  Then answer normally."#
                .to_string(),

            general_system: "You are a helpful AI assistant.".to_string(),
        }
    }
}

/// Prompts for summarization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizePrompts {
    /// Instruction wrapping concatenated document text. Expects {{content}}.
    pub content: String,
    /// Instruction wrapping retrieved video transcript fragments. Expects {{content}}.
    pub video: String,
}

impl Default for SummarizePrompts {
    fn default() -> Self {
        Self {
            content: r#"You are a helpful AI assistant. Summarize the following content:

{{content}}"#
                .to_string(),

            video: r#"You are a helpful AI assistant. Summarize the following content of a video.
The fragments may be unrelated to each other, but your summary has to cover
all of them:

{{content}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load RAG prompts if file exists
            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }

            // Load summarize prompts if file exists
            let summarize_path = custom_path.join("summarize.toml");
            if summarize_path.exists() {
                let content = std::fs::read_to_string(&summarize_path)?;
                prompts.summarize = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.rag.grounded_system.contains("{{context}}"));
        assert!(prompts
            .rag
            .grounded_system
            .contains("not related to the attached content"));
        assert!(!prompts.rag.general_system.is_empty());
        assert!(prompts.summarize.content.contains("{{content}}"));
        assert!(prompts.summarize.video.contains("{{content}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_custom_dir_overrides_rag() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("rag.toml"),
            r#"
            grounded_system = "Custom grounded: {{context}}"
            general_system = "Custom general."
            "#,
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.rag.general_system, "Custom general.");
        // Summarize prompts keep their defaults
        assert!(prompts.summarize.content.contains("{{content}}"));
    }
}
