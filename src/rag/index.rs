//! Request-scoped similarity index over text chunks.

use crate::chunking::TextChunk;
use crate::embedding::Embedder;
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The matched chunk.
    pub chunk: TextChunk,
    /// Cosine similarity to the query (higher is better).
    pub score: f32,
}

/// An index of embedded chunks, built fresh for each request and dropped
/// afterwards. Nothing is cached across calls.
pub struct SimilarityIndex {
    embedder: Arc<dyn Embedder>,
    entries: Vec<(TextChunk, Vec<f32>)>,
}

impl SimilarityIndex {
    /// Embed every chunk and build an index over them.
    #[instrument(skip(embedder, chunks), fields(count = chunks.len()))]
    pub async fn build(embedder: Arc<dyn Embedder>, chunks: Vec<TextChunk>) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;
        let entries = chunks.into_iter().zip(vectors).collect();

        Ok(Self { embedder, entries })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retrieve the `k` chunks most similar to the question.
    ///
    /// Ordered by descending similarity; equal scores keep their chunk
    /// order. Returns fewer than `k` when the index holds fewer.
    #[instrument(skip(self, question))]
    pub async fn query(&self, question: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(question).await?;

        let mut results: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|(chunk, vector)| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(&query_vector, vector),
            })
            .collect();

        // sort_by is stable, so equal scores stay in chunk order
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        debug!("Retrieved {} of {} chunks", results.len(), self.entries.len());
        Ok(results)
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Embedder returning fixed vectors per known text, zeroes otherwise.
    struct StubEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl StubEmbedder {
        fn new(entries: &[(&str, &[f32])]) -> Self {
            Self {
                vectors: entries
                    .iter()
                    .map(|(text, v)| (text.to_string(), v.to_vec()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| vec![0.0, 0.0]))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn chunks_of(texts: &[&str]) -> Vec<TextChunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextChunk::new(i, t.to_string()))
            .collect()
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &c).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        // Mismatched lengths and zero vectors score zero
        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_query_orders_by_similarity() {
        let embedder = StubEmbedder::new(&[
            ("far", &[0.0, 1.0]),
            ("near", &[1.0, 0.1]),
            ("query", &[1.0, 0.0]),
        ]);
        let index = SimilarityIndex::build(Arc::new(embedder), chunks_of(&["far", "near"]))
            .await
            .unwrap();

        let results = index.query("query", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "near");
        assert_eq!(results[1].chunk.text, "far");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_query_with_k_beyond_size_returns_all() {
        let embedder = StubEmbedder::new(&[
            ("a", &[1.0, 0.0]),
            ("b", &[0.0, 1.0]),
            ("query", &[1.0, 0.0]),
        ]);
        let index = SimilarityIndex::build(Arc::new(embedder), chunks_of(&["a", "b"]))
            .await
            .unwrap();

        let results = index.query("query", 10).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_equal_scores_keep_chunk_order() {
        let embedder = StubEmbedder::new(&[
            ("first", &[1.0, 0.0]),
            ("middle", &[0.0, 1.0]),
            ("last", &[1.0, 0.0]),
            ("query", &[1.0, 0.0]),
        ]);
        let index = SimilarityIndex::build(
            Arc::new(embedder),
            chunks_of(&["first", "middle", "last"]),
        )
        .await
        .unwrap();

        let results = index.query("query", 3).await.unwrap();
        assert_eq!(results[0].chunk.text, "first");
        assert_eq!(results[1].chunk.text, "last");
        assert_eq!(results[2].chunk.text, "middle");
    }

    #[tokio::test]
    async fn test_empty_index_returns_nothing() {
        let embedder = StubEmbedder::new(&[]);
        let index = SimilarityIndex::build(Arc::new(embedder), Vec::new())
            .await
            .unwrap();

        assert!(index.is_empty());
        assert!(index.query("anything", 4).await.unwrap().is_empty());
    }
}
