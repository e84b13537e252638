//! Lese - Document Q&A and Summarization
//!
//! A self-hosted backend for asking questions about your documents and videos.
//!
//! The name "Lese" comes from the Norwegian/Scandinavian word for "read."
//!
//! # Overview
//!
//! Lese allows you to:
//! - Upload documents (PDF, DOCX, CSV, plain text) per user
//! - Ask questions grounded in a document, with chat history
//! - Summarize documents, free-form text, and video transcripts
//! - Serve everything over a small HTTP API
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt management
//! - `extract` - Document text extraction (PDF, DOCX, CSV, plain text)
//! - `chunking` - Text chunking with overlap
//! - `embedding` - Embedding generation
//! - `generation` - Chat completion
//! - `transcript` - Video transcript fetching
//! - `store` - Document and chat history storage
//! - `rag` - Retrieval and answer assembly
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lese::config::Settings;
//! use lese::rag::RagEngine;
//! use lese::store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let engine = RagEngine::new(&settings, Arc::new(MemoryStore::new()))?;
//!
//!     let answer = engine.ask("user-1", "What is this about?", &[], None).await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod generation;
pub mod openai;
pub mod rag;
pub mod store;
pub mod transcript;

pub use error::{LeseError, Result};
