//! Retrieval-augmented generation core.
//!
//! The pipeline stages live in their own modules: similarity indexing,
//! context composition, conversation assembly, and the engine that wires
//! them to stores and model providers.

mod context;
mod conversation;
mod engine;
mod index;

pub use context::{build_system_instruction, compose_context};
pub use conversation::assemble_messages;
pub use engine::RagEngine;
pub use index::{cosine_similarity, ScoredChunk, SimilarityIndex};
