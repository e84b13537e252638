//! Context composition for grounded prompts.

use super::ScoredChunk;
use crate::config::Prompts;
use std::collections::HashMap;

/// Join retrieved chunks into a single context text.
///
/// Chunks stay in retrieval order; no re-sorting, no deduplication.
pub fn compose_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the system instruction for a question.
///
/// With context, the grounded template embeds it verbatim; without,
/// the generic assistant instruction is used as-is.
pub fn build_system_instruction(prompts: &Prompts, context: Option<&str>) -> String {
    match context {
        Some(context) => {
            let mut vars = HashMap::new();
            vars.insert("context".to_string(), context.to_string());
            prompts.render_with_custom(&prompts.rag.grounded_system, &vars)
        }
        None => prompts.rag.general_system.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::TextChunk;

    fn scored(texts: &[&str]) -> Vec<ScoredChunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| ScoredChunk {
                chunk: TextChunk::new(i, t.to_string()),
                score: 1.0 - i as f32 * 0.1,
            })
            .collect()
    }

    #[test]
    fn test_compose_joins_in_retrieval_order() {
        let chunks = scored(&["second half", "first half"]);
        assert_eq!(compose_context(&chunks), "second half\n\nfirst half");
    }

    #[test]
    fn test_compose_empty_is_empty() {
        assert_eq!(compose_context(&[]), "");
    }

    #[test]
    fn test_grounded_instruction_embeds_context() {
        let prompts = Prompts::default();
        let instruction = build_system_instruction(&prompts, Some("Paris facts here."));

        assert!(instruction.contains("Paris facts here."));
        assert!(instruction.contains("not related to the attached content"));
        assert!(!instruction.contains("{{context}}"));
    }

    #[test]
    fn test_general_instruction_without_context() {
        let prompts = Prompts::default();
        let instruction = build_system_instruction(&prompts, None);

        assert_eq!(instruction, prompts.rag.general_system);
    }
}
