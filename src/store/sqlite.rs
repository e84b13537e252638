//! SQLite-based storage implementation.
//!
//! One database file holds documents (metadata plus raw content) and chat
//! sessions with their turns.

use super::{ChatSession, ChatStore, ChatSummary, ChatTurn, DocumentStore, StoredDocument};
use crate::error::{LeseError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    file_name TEXT NOT NULL,
    extension TEXT NOT NULL,
    content BLOB NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_user_id ON documents(user_id);

CREATE TABLE IF NOT EXISTS chats (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chats_user_id ON chats(user_id);

CREATE TABLE IF NOT EXISTS chat_turns (
    chat_id TEXT NOT NULL,
    turn_order INTEGER NOT NULL,
    question TEXT NOT NULL,
    response TEXT NOT NULL,
    document_id TEXT,
    PRIMARY KEY (chat_id, turn_order)
);
"#;

/// SQLite-backed document and chat store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LeseError::Store(format!("Failed to acquire lock: {}", e)))
    }

    fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredDocument> {
        let id_str: String = row.get(0)?;
        let created_at_str: String = row.get(5)?;

        Ok(StoredDocument {
            id: Uuid::parse_str(&id_str).unwrap_or_default(),
            user_id: row.get(1)?,
            name: row.get(2)?,
            file_name: row.get(3)?,
            extension: row.get(4)?,
            created_at: parse_timestamp(&created_at_str),
        })
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait]
impl DocumentStore for SqliteStore {
    #[instrument(skip(self, doc, content), fields(id = %doc.id))]
    async fn put_document(&self, doc: &StoredDocument, content: &[u8]) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO documents
            (id, user_id, name, file_name, extension, content, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                doc.id.to_string(),
                doc.user_id,
                doc.name,
                doc.file_name,
                doc.extension,
                content,
                doc.created_at.to_rfc3339(),
            ],
        )?;

        debug!("Stored document {} ({} bytes)", doc.id, content.len());
        Ok(())
    }

    async fn get_document(&self, id: Uuid, user_id: &str) -> Result<Option<StoredDocument>> {
        let conn = self.lock()?;

        let result = conn.query_row(
            r#"
            SELECT id, user_id, name, file_name, extension, created_at
            FROM documents
            WHERE id = ?1 AND user_id = ?2
            "#,
            params![id.to_string(), user_id],
            |row| Self::row_to_document(row),
        );

        match result {
            Ok(doc) => Ok(Some(doc)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_content(&self, id: Uuid, user_id: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.lock()?;

        let result = conn.query_row(
            "SELECT content FROM documents WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id],
            |row| row.get::<_, Vec<u8>>(0),
        );

        match result {
            Ok(content) => Ok(Some(content)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn list_documents(&self, user_id: &str) -> Result<Vec<StoredDocument>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, name, file_name, extension, created_at
            FROM documents
            WHERE user_id = ?1
            ORDER BY created_at DESC
            "#,
        )?;

        let docs = stmt.query_map(params![user_id], |row| Self::row_to_document(row))?;
        Ok(docs.filter_map(|d| d.ok()).collect())
    }

    #[instrument(skip(self))]
    async fn delete_document(&self, id: Uuid, user_id: &str) -> Result<bool> {
        let conn = self.lock()?;

        let deleted = conn.execute(
            "DELETE FROM documents WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id],
        )?;

        Ok(deleted > 0)
    }
}

#[async_trait]
impl ChatStore for SqliteStore {
    #[instrument(skip(self, session), fields(id = %session.id))]
    async fn create_session(&self, session: &ChatSession) -> Result<()> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO chats (id, user_id, title, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                session.id.to_string(),
                session.user_id,
                session.title,
                session.created_at.to_rfc3339(),
            ],
        )?;

        for (order, turn) in session.turns.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO chat_turns (chat_id, turn_order, question, response, document_id)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    session.id.to_string(),
                    order as i64,
                    turn.question,
                    turn.response,
                    turn.document_id.map(|d| d.to_string()),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Created chat session {}", session.id);
        Ok(())
    }

    async fn get_session(&self, id: Uuid, user_id: &str) -> Result<Option<ChatSession>> {
        let conn = self.lock()?;

        let result = conn.query_row(
            "SELECT id, user_id, title, created_at FROM chats WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id],
            |row| {
                let id_str: String = row.get(0)?;
                let created_at_str: String = row.get(3)?;
                Ok(ChatSession {
                    id: Uuid::parse_str(&id_str).unwrap_or_default(),
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    turns: Vec::new(),
                    created_at: parse_timestamp(&created_at_str),
                })
            },
        );

        let mut session = match result {
            Ok(session) => session,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT question, response, document_id
            FROM chat_turns
            WHERE chat_id = ?1
            ORDER BY turn_order
            "#,
        )?;

        let turns = stmt.query_map(params![id.to_string()], |row| {
            let document_id: Option<String> = row.get(2)?;
            Ok(ChatTurn {
                question: row.get(0)?,
                response: row.get(1)?,
                document_id: document_id.and_then(|s| Uuid::parse_str(&s).ok()),
            })
        })?;

        session.turns = turns.filter_map(|t| t.ok()).collect();
        Ok(Some(session))
    }

    #[instrument(skip(self, turn))]
    async fn append_turn(&self, id: Uuid, turn: &ChatTurn) -> Result<()> {
        let conn = self.lock()?;

        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chats WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(LeseError::Store(format!("Chat session {} not found", id)));
        }

        let next_order: i64 = conn.query_row(
            "SELECT COALESCE(MAX(turn_order) + 1, 0) FROM chat_turns WHERE chat_id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;

        conn.execute(
            r#"
            INSERT INTO chat_turns (chat_id, turn_order, question, response, document_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                id.to_string(),
                next_order,
                turn.question,
                turn.response,
                turn.document_id.map(|d| d.to_string()),
            ],
        )?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_sessions(&self, user_id: &str) -> Result<Vec<ChatSummary>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, title, created_at
            FROM chats
            WHERE user_id = ?1
            ORDER BY created_at DESC
            "#,
        )?;

        let sessions = stmt.query_map(params![user_id], |row| {
            let id_str: String = row.get(0)?;
            let created_at_str: String = row.get(2)?;
            Ok(ChatSummary {
                id: Uuid::parse_str(&id_str).unwrap_or_default(),
                title: row.get(1)?,
                created_at: parse_timestamp(&created_at_str),
            })
        })?;

        Ok(sessions.filter_map(|s| s.ok()).collect())
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, id: Uuid, user_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let deleted = tx.execute(
            "DELETE FROM chats WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id],
        )?;
        if deleted > 0 {
            tx.execute(
                "DELETE FROM chat_turns WHERE chat_id = ?1",
                params![id.to_string()],
            )?;
        }

        tx.commit()?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_document_store() {
        let store = SqliteStore::in_memory().unwrap();

        let doc = StoredDocument::new(
            "user1".to_string(),
            "Report".to_string(),
            "report.pdf".to_string(),
        );
        store.put_document(&doc, b"%PDF-1.4 fake").await.unwrap();

        let found = store.get_document(doc.id, "user1").await.unwrap().unwrap();
        assert_eq!(found.name, "Report");
        assert_eq!(found.extension, "pdf");

        // Documents are invisible to other users
        assert!(store.get_document(doc.id, "user2").await.unwrap().is_none());

        let content = store.read_content(doc.id, "user1").await.unwrap();
        assert_eq!(content.unwrap(), b"%PDF-1.4 fake");

        let listed = store.list_documents("user1").await.unwrap();
        assert_eq!(listed.len(), 1);

        assert!(!store.delete_document(doc.id, "user2").await.unwrap());
        assert!(store.delete_document(doc.id, "user1").await.unwrap());
        assert!(store.list_documents("user1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_chat_store() {
        let store = SqliteStore::in_memory().unwrap();

        let mut session = ChatSession::new("user1".to_string(), "Planning".to_string());
        session.turns.push(ChatTurn {
            question: "first?".to_string(),
            response: "one".to_string(),
            document_id: None,
        });
        store.create_session(&session).await.unwrap();

        store
            .append_turn(
                session.id,
                &ChatTurn {
                    question: "second?".to_string(),
                    response: "two".to_string(),
                    document_id: Some(Uuid::new_v4()),
                },
            )
            .await
            .unwrap();

        let found = store.get_session(session.id, "user1").await.unwrap().unwrap();
        assert_eq!(found.title, "Planning");
        assert_eq!(found.turns.len(), 2);
        assert_eq!(found.turns[0].question, "first?");
        assert_eq!(found.turns[1].question, "second?");
        assert!(found.turns[1].document_id.is_some());

        assert!(store.get_session(session.id, "user2").await.unwrap().is_none());

        let sessions = store.list_sessions("user1").await.unwrap();
        assert_eq!(sessions.len(), 1);

        assert!(!store.delete_session(session.id, "user2").await.unwrap());
        assert!(store.delete_session(session.id, "user1").await.unwrap());
        assert!(store.get_session(session.id, "user1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_append_to_missing_session_fails() {
        let store = SqliteStore::in_memory().unwrap();
        let turn = ChatTurn {
            question: "q".to_string(),
            response: "r".to_string(),
            document_id: None,
        };

        let err = store.append_turn(Uuid::new_v4(), &turn).await.unwrap_err();
        assert!(matches!(err, LeseError::Store(_)));
    }

    #[tokio::test]
    async fn test_sessions_listed_newest_first() {
        let store = SqliteStore::in_memory().unwrap();

        let mut older = ChatSession::new("user1".to_string(), "Older".to_string());
        older.created_at = Utc::now() - chrono::Duration::seconds(60);
        let newer = ChatSession::new("user1".to_string(), "Newer".to_string());

        store.create_session(&older).await.unwrap();
        store.create_session(&newer).await.unwrap();

        let sessions = store.list_sessions("user1").await.unwrap();
        assert_eq!(sessions[0].title, "Newer");
        assert_eq!(sessions[1].title, "Older");
    }
}
