//! In-memory storage implementation.
//!
//! Useful for testing and ephemeral deployments.

use super::{ChatSession, ChatStore, ChatSummary, ChatTurn, DocumentStore, StoredDocument};
use crate::error::{LeseError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory document and chat store.
pub struct MemoryStore {
    documents: RwLock<HashMap<Uuid, (StoredDocument, Vec<u8>)>>,
    chats: RwLock<HashMap<Uuid, ChatSession>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            chats: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put_document(&self, doc: &StoredDocument, content: &[u8]) -> Result<()> {
        let mut docs = self.documents.write().unwrap();
        docs.insert(doc.id, (doc.clone(), content.to_vec()));
        Ok(())
    }

    async fn get_document(&self, id: Uuid, user_id: &str) -> Result<Option<StoredDocument>> {
        let docs = self.documents.read().unwrap();
        Ok(docs
            .get(&id)
            .filter(|(doc, _)| doc.user_id == user_id)
            .map(|(doc, _)| doc.clone()))
    }

    async fn read_content(&self, id: Uuid, user_id: &str) -> Result<Option<Vec<u8>>> {
        let docs = self.documents.read().unwrap();
        Ok(docs
            .get(&id)
            .filter(|(doc, _)| doc.user_id == user_id)
            .map(|(_, content)| content.clone()))
    }

    async fn list_documents(&self, user_id: &str) -> Result<Vec<StoredDocument>> {
        let docs = self.documents.read().unwrap();
        let mut result: Vec<StoredDocument> = docs
            .values()
            .filter(|(doc, _)| doc.user_id == user_id)
            .map(|(doc, _)| doc.clone())
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn delete_document(&self, id: Uuid, user_id: &str) -> Result<bool> {
        let mut docs = self.documents.write().unwrap();
        let owned = docs
            .get(&id)
            .map(|(doc, _)| doc.user_id == user_id)
            .unwrap_or(false);
        if owned {
            docs.remove(&id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn create_session(&self, session: &ChatSession) -> Result<()> {
        let mut chats = self.chats.write().unwrap();
        chats.insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, id: Uuid, user_id: &str) -> Result<Option<ChatSession>> {
        let chats = self.chats.read().unwrap();
        Ok(chats
            .get(&id)
            .filter(|s| s.user_id == user_id)
            .cloned())
    }

    async fn append_turn(&self, id: Uuid, turn: &ChatTurn) -> Result<()> {
        let mut chats = self.chats.write().unwrap();
        let session = chats
            .get_mut(&id)
            .ok_or_else(|| LeseError::Store(format!("Chat session {} not found", id)))?;
        session.turns.push(turn.clone());
        Ok(())
    }

    async fn list_sessions(&self, user_id: &str) -> Result<Vec<ChatSummary>> {
        let chats = self.chats.read().unwrap();
        let mut result: Vec<ChatSummary> = chats
            .values()
            .filter(|s| s.user_id == user_id)
            .map(|s| ChatSummary {
                id: s.id,
                title: s.title.clone(),
                created_at: s.created_at,
            })
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn delete_session(&self, id: Uuid, user_id: &str) -> Result<bool> {
        let mut chats = self.chats.write().unwrap();
        let owned = chats
            .get(&id)
            .map(|s| s.user_id == user_id)
            .unwrap_or(false);
        if owned {
            chats.remove(&id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_document_store() {
        let store = MemoryStore::new();

        let doc = StoredDocument::new(
            "user1".to_string(),
            "Notes".to_string(),
            "notes.txt".to_string(),
        );
        store.put_document(&doc, b"some notes").await.unwrap();

        let found = store.get_document(doc.id, "user1").await.unwrap();
        assert_eq!(found.unwrap().name, "Notes");

        // Documents are invisible to other users
        assert!(store.get_document(doc.id, "user2").await.unwrap().is_none());
        assert!(store.read_content(doc.id, "user2").await.unwrap().is_none());

        let content = store.read_content(doc.id, "user1").await.unwrap();
        assert_eq!(content.unwrap(), b"some notes");

        assert!(!store.delete_document(doc.id, "user2").await.unwrap());
        assert!(store.delete_document(doc.id, "user1").await.unwrap());
        assert!(store.list_documents("user1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_chat_store() {
        let store = MemoryStore::new();

        let session = ChatSession::new("user1".to_string(), "First chat".to_string());
        store.create_session(&session).await.unwrap();

        let turn = ChatTurn {
            question: "What is this?".to_string(),
            response: "A test.".to_string(),
            document_id: None,
        };
        store.append_turn(session.id, &turn).await.unwrap();
        store.append_turn(session.id, &turn).await.unwrap();

        let found = store.get_session(session.id, "user1").await.unwrap().unwrap();
        assert_eq!(found.turns.len(), 2);

        assert!(store.get_session(session.id, "user2").await.unwrap().is_none());

        let sessions = store.list_sessions("user1").await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].title, "First chat");

        assert!(!store.delete_session(session.id, "user2").await.unwrap());
        assert!(store.delete_session(session.id, "user1").await.unwrap());
        assert!(store.list_sessions("user1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_to_missing_session_fails() {
        let store = MemoryStore::new();
        let turn = ChatTurn {
            question: "q".to_string(),
            response: "r".to_string(),
            document_id: None,
        };

        let err = store.append_turn(Uuid::new_v4(), &turn).await.unwrap_err();
        assert!(matches!(err, LeseError::Store(_)));
    }
}
