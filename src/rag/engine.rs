//! Request orchestration over extraction, retrieval, and generation.

use super::context::{build_system_instruction, compose_context};
use super::conversation::assemble_messages;
use super::index::SimilarityIndex;
use crate::chunking::{chunk_text, ChunkingConfig};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{LeseError, Result};
use crate::extract::extract_text;
use crate::generation::{ChatModel, OpenAIChatModel};
use crate::store::{ChatTurn, DocumentStore};
use crate::transcript::{parse_video_reference, TranscriptProvider, YoutubeTranscriptProvider};
use async_openai::types::{ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Fixed retrieval query used when summarizing a video transcript.
const VIDEO_SUMMARY_QUERY: &str = "Summarize this Content of video";

/// Coordinates stores, capability providers, and prompts for each request.
///
/// The engine is stateless between calls; everything request-scoped (the
/// similarity index in particular) is built and dropped per call.
pub struct RagEngine {
    documents: Arc<dyn DocumentStore>,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn ChatModel>,
    transcripts: Arc<dyn TranscriptProvider>,
    prompts: Prompts,
    chunking: ChunkingConfig,
    top_k: usize,
}

impl RagEngine {
    /// Create an engine with production providers from settings.
    pub fn new(settings: &Settings, documents: Arc<dyn DocumentStore>) -> Result<Self> {
        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        let model = Arc::new(OpenAIChatModel::with_model(&settings.generation.model));
        let transcripts = Arc::new(YoutubeTranscriptProvider::new(&settings.transcript.language));
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let chunking = ChunkingConfig {
            chunk_size: settings.chunking.chunk_size,
            chunk_overlap: settings.chunking.chunk_overlap,
        };

        Ok(Self::with_components(
            documents,
            embedder,
            model,
            transcripts,
            prompts,
            chunking,
            settings.retrieval.top_k,
        ))
    }

    /// Create an engine from explicit components.
    pub fn with_components(
        documents: Arc<dyn DocumentStore>,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn ChatModel>,
        transcripts: Arc<dyn TranscriptProvider>,
        prompts: Prompts,
        chunking: ChunkingConfig,
        top_k: usize,
    ) -> Self {
        Self {
            documents,
            embedder,
            model,
            transcripts,
            prompts,
            chunking,
            top_k,
        }
    }

    /// Answer a question, optionally grounded in a document and continuing
    /// from prior conversation turns.
    ///
    /// The response text is returned verbatim; persisting the exchange is
    /// the caller's concern.
    #[instrument(skip(self, prior_turns), fields(turns = prior_turns.len()))]
    pub async fn ask(
        &self,
        user_id: &str,
        question: &str,
        prior_turns: &[ChatTurn],
        document_id: Option<Uuid>,
    ) -> Result<String> {
        info!("Processing question");

        let context = match document_id {
            Some(id) => Some(self.document_context(user_id, id, question).await?),
            None => None,
        };

        let instruction = build_system_instruction(&self.prompts, context.as_deref());
        let messages = assemble_messages(&instruction, prior_turns, question)?;

        self.model.complete(messages).await
    }

    /// Summarize the concatenated text of the given documents.
    #[instrument(skip(self, document_ids), fields(count = document_ids.len()))]
    pub async fn summarize_documents(
        &self,
        user_id: &str,
        document_ids: &[Uuid],
    ) -> Result<String> {
        let mut combined = String::new();
        for &id in document_ids {
            let doc = self
                .documents
                .get_document(id, user_id)
                .await?
                .ok_or_else(|| LeseError::DocumentNotFound(id.to_string()))?;
            let content = self
                .documents
                .read_content(id, user_id)
                .await?
                .ok_or_else(|| LeseError::DocumentNotFound(id.to_string()))?;

            combined.push_str(&extract_text(&content, &doc.extension)?);
        }

        self.summarize_text(&combined).await
    }

    /// Summarize a raw text.
    #[instrument(skip(self, content), fields(chars = content.len()))]
    pub async fn summarize_text(&self, content: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("content".to_string(), content.to_string());
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.summarize.content, &vars);

        self.complete_single(prompt).await
    }

    /// Summarize a video from its transcript.
    #[instrument(skip(self))]
    pub async fn summarize_video(&self, video: &str) -> Result<String> {
        let video_id = parse_video_reference(video)?;
        let snippets = self.transcripts.fetch_transcript(&video_id).await?;

        let transcript: String = snippets
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        debug!("Transcript has {} characters", transcript.len());

        let chunks = chunk_text(&transcript, &self.chunking)?;
        let index = SimilarityIndex::build(self.embedder.clone(), chunks).await?;
        let retrieved = index.query(VIDEO_SUMMARY_QUERY, self.top_k).await?;
        let context = compose_context(&retrieved);

        let mut vars = HashMap::new();
        vars.insert("content".to_string(), context);
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.summarize.video, &vars);

        self.complete_single(prompt).await
    }

    /// Retrieve the most relevant chunks of a document for a question.
    async fn document_context(
        &self,
        user_id: &str,
        document_id: Uuid,
        question: &str,
    ) -> Result<String> {
        let doc = self
            .documents
            .get_document(document_id, user_id)
            .await?
            .ok_or_else(|| LeseError::DocumentNotFound(document_id.to_string()))?;
        let content = self
            .documents
            .read_content(document_id, user_id)
            .await?
            .ok_or_else(|| LeseError::DocumentNotFound(document_id.to_string()))?;

        let text = extract_text(&content, &doc.extension)?;
        let chunks = chunk_text(&text, &self.chunking)?;
        let index = SimilarityIndex::build(self.embedder.clone(), chunks).await?;
        let retrieved = index.query(question, self.top_k).await?;

        debug!("Retrieved {} context chunks", retrieved.len());
        Ok(compose_context(&retrieved))
    }

    /// Run a completion over a single user message.
    async fn complete_single(&self, prompt: String) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| LeseError::Generation(e.to_string()))?
                .into(),
        ];

        self.model.complete(messages).await
    }
}
