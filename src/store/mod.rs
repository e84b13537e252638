//! Storage for uploaded documents and chat history.
//!
//! Provides trait-based interfaces so the serving layer can run against
//! SQLite or a plain in-memory map.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for an uploaded document.
///
/// Raw content lives alongside it in the store but is fetched separately,
/// since listings never need the bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Unique document ID.
    pub id: Uuid,
    /// Owner of the document.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Original file name.
    pub file_name: String,
    /// Lower-cased extension derived from the file name.
    pub extension: String,
    /// When the document was uploaded.
    pub created_at: DateTime<Utc>,
}

impl StoredDocument {
    /// Create a new document record.
    pub fn new(user_id: String, name: String, file_name: String) -> Self {
        let extension = std::path::Path::new(&file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            file_name,
            extension,
            created_at: Utc::now(),
        }
    }
}

/// One question/response exchange in a chat session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// The user's question.
    pub question: String,
    /// The generated response.
    pub response: String,
    /// Document the question ran against, if any.
    pub document_id: Option<Uuid>,
}

/// A chat session with its full turn history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique session ID.
    pub id: Uuid,
    /// Owner of the session.
    pub user_id: String,
    /// Display title.
    pub title: String,
    /// Turns in chronological order.
    pub turns: Vec<ChatTurn>,
    /// When the session was started.
    pub created_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a new empty session.
    pub fn new(user_id: String, title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            turns: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Session listing entry, without turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSummary {
    /// Unique session ID.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// When the session was started.
    pub created_at: DateTime<Utc>,
}

/// Trait for document storage backends.
///
/// Every lookup is scoped to the owning user; a document that exists but
/// belongs to someone else reads as absent.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a document's metadata and raw content.
    async fn put_document(&self, doc: &StoredDocument, content: &[u8]) -> Result<()>;

    /// Look up a document owned by the given user.
    async fn get_document(&self, id: Uuid, user_id: &str) -> Result<Option<StoredDocument>>;

    /// Read the raw content of a document owned by the given user.
    async fn read_content(&self, id: Uuid, user_id: &str) -> Result<Option<Vec<u8>>>;

    /// List a user's documents, newest first.
    async fn list_documents(&self, user_id: &str) -> Result<Vec<StoredDocument>>;

    /// Delete a document owned by the given user. Returns whether it existed.
    async fn delete_document(&self, id: Uuid, user_id: &str) -> Result<bool>;
}

/// Trait for chat history storage backends.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Persist a new chat session, including any initial turns.
    async fn create_session(&self, session: &ChatSession) -> Result<()>;

    /// Look up a session owned by the given user, turns included.
    async fn get_session(&self, id: Uuid, user_id: &str) -> Result<Option<ChatSession>>;

    /// Append a turn to an existing session.
    async fn append_turn(&self, id: Uuid, turn: &ChatTurn) -> Result<()>;

    /// List a user's sessions, newest first.
    async fn list_sessions(&self, user_id: &str) -> Result<Vec<ChatSummary>>;

    /// Delete a session owned by the given user. Returns whether it existed.
    async fn delete_session(&self, id: Uuid, user_id: &str) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_derived_from_file_name() {
        let doc = StoredDocument::new(
            "user1".to_string(),
            "Report".to_string(),
            "Quarterly.Report.PDF".to_string(),
        );
        assert_eq!(doc.extension, "pdf");

        let doc = StoredDocument::new(
            "user1".to_string(),
            "Notes".to_string(),
            "README".to_string(),
        );
        assert_eq!(doc.extension, "");
    }
}
