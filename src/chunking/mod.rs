//! Fixed-size text chunking.
//!
//! Splits extracted document text into overlapping windows sized for
//! embedding and retrieval.

use crate::error::{LeseError, Result};
use serde::{Deserialize, Serialize};

/// A chunk of text from a document or transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChunk {
    /// Position of this chunk in the source text.
    pub index: usize,
    /// Text content of this chunk.
    pub text: String,
}

impl TextChunk {
    /// Create a new text chunk.
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Split text into overlapping fixed-size chunks.
///
/// Every chunk except possibly the last has exactly `chunk_size`
/// characters, and each chunk starts `chunk_size - chunk_overlap`
/// characters after the previous one. Lengths are counted in characters,
/// so multi-byte text never splits inside a code point.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Result<Vec<TextChunk>> {
    if config.chunk_overlap >= config.chunk_size {
        return Err(LeseError::InvalidChunkConfig(format!(
            "overlap ({}) must be smaller than chunk size ({})",
            config.chunk_overlap, config.chunk_size
        )));
    }

    // Byte offset of every char boundary, plus the end of the text
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = boundaries.len() - 1;

    if char_count == 0 {
        return Ok(Vec::new());
    }

    let step = config.chunk_size - config.chunk_overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + config.chunk_size).min(char_count);
        chunks.push(TextChunk::new(
            chunks.len(),
            text[boundaries[start]..boundaries[end]].to_string(),
        ));
        if end == char_count {
            break;
        }
        start += step;
    }

    Ok(chunks)
}
