//! Chat completion generation.

mod openai;

pub use openai::OpenAIChatModel;

use crate::error::Result;
use async_openai::types::ChatCompletionRequestMessage;
use async_trait::async_trait;

/// Trait for chat completion generation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run a single completion over a full message sequence.
    ///
    /// The response text is returned verbatim. No retries, no streaming.
    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String>;
}
