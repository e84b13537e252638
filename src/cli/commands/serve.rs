//! HTTP API server.
//!
//! Provides REST endpoints for document upload, question answering,
//! chat history, and summarization.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::LeseError;
use crate::rag::RagEngine;
use crate::store::{
    ChatSession, ChatStore, ChatTurn, DocumentStore, MemoryStore, SqliteStore, StoredDocument,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Maximum characters of the first question used as a chat title.
const CHAT_TITLE_MAX_CHARS: usize = 50;

/// Shared application state.
struct AppState {
    engine: RagEngine,
    documents: Arc<dyn DocumentStore>,
    chats: Arc<dyn ChatStore>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let (documents, chats) = open_stores(&settings)?;
    let engine = RagEngine::new(&settings, documents.clone())?;

    let state = Arc::new(AppState {
        engine,
        documents,
        chats,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/ask", post(ask))
        .route("/chats", get(list_chats))
        .route("/chats/{chat_id}", get(get_chat).delete(delete_chat))
        .route("/documents", post(upload_document).get(list_documents))
        .route("/documents/{document_id}", delete(delete_document))
        .route("/summarize/documents", post(summarize_documents))
        .route("/summarize/text", post(summarize_text))
        .route("/summarize/video", post(summarize_video))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Lese API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Ask", "POST   /ask");
    Output::kv("List Chats", "GET    /chats");
    Output::kv("Get Chat", "GET    /chats/{chat_id}");
    Output::kv("Delete Chat", "DELETE /chats/{chat_id}");
    Output::kv("Upload Document", "POST   /documents");
    Output::kv("List Documents", "GET    /documents");
    Output::kv("Delete Document", "DELETE /documents/{document_id}");
    Output::kv("Summarize Documents", "POST   /summarize/documents");
    Output::kv("Summarize Text", "POST   /summarize/text");
    Output::kv("Summarize Video", "POST   /summarize/video");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Open the configured storage backend, shared by both store handles.
fn open_stores(
    settings: &Settings,
) -> crate::error::Result<(Arc<dyn DocumentStore>, Arc<dyn ChatStore>)> {
    match settings.storage.provider.as_str() {
        "memory" => {
            let store = Arc::new(MemoryStore::new());
            Ok((store.clone(), store))
        }
        "sqlite" => {
            let store = Arc::new(SqliteStore::new(&settings.sqlite_path())?);
            Ok((store.clone(), store))
        }
        other => Err(LeseError::Config(format!(
            "Unknown storage provider: {}",
            other
        ))),
    }
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AskRequest {
    user_id: String,
    question: String,
    /// Continue an existing chat session
    #[serde(default)]
    chat_id: Option<Uuid>,
    /// Ground the answer in a specific document
    #[serde(default)]
    document_id: Option<Uuid>,
}

#[derive(Serialize)]
struct AskResponse {
    response: String,
    chat_id: Uuid,
    chat_title: String,
}

#[derive(Deserialize)]
struct UserQuery {
    user_id: String,
}

#[derive(Serialize)]
struct ChatSummaryResponse {
    chat_id: Uuid,
    chat_title: String,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ChatDetailResponse {
    chat_id: Uuid,
    chat_title: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    question: String,
    response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_id: Option<Uuid>,
}

#[derive(Deserialize)]
struct UploadDocumentRequest {
    user_id: String,
    name: String,
    file_name: String,
    /// Raw file content, base64-encoded
    content_base64: String,
}

#[derive(Serialize)]
struct DocumentResponse {
    document_id: Uuid,
    name: String,
    file_name: String,
    extension: String,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct SummarizeDocumentsRequest {
    user_id: String,
    documents: Vec<Uuid>,
}

#[derive(Deserialize)]
struct SummarizeTextRequest {
    content: String,
}

#[derive(Deserialize)]
struct SummarizeVideoRequest {
    /// Video URL or bare video ID
    video: String,
}

#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(Serialize)]
struct DeletedResponse {
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Error Mapping ===

fn error_response(err: LeseError) -> axum::response::Response {
    let status = match &err {
        LeseError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
        LeseError::InvalidVideoReference(_)
        | LeseError::UnsupportedFormat(_)
        | LeseError::InvalidChunkConfig(_) => StatusCode::BAD_REQUEST,
        LeseError::CorruptDocument(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LeseError::Embedding(_) | LeseError::Generation(_) | LeseError::Transcript(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn not_found(message: String) -> axum::response::Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse { error: message })).into_response()
}

/// Truncate a question to a display title, on a char boundary.
fn chat_title(question: &str) -> String {
    question.chars().take(CHAT_TITLE_MAX_CHARS).collect()
}

fn document_response(doc: StoredDocument) -> DocumentResponse {
    DocumentResponse {
        document_id: doc.id,
        name: doc.name,
        file_name: doc.file_name,
        extension: doc.extension,
        created_at: doc.created_at,
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    // Resolve the session before generating so an unknown chat_id
    // fails without a model call
    let session = match req.chat_id {
        Some(chat_id) => match state.chats.get_session(chat_id, &req.user_id).await {
            Ok(Some(session)) => Some(session),
            Ok(None) => return not_found(format!("Chat session not found: {}", chat_id)),
            Err(e) => return error_response(e),
        },
        None => None,
    };

    let prior_turns = session.as_ref().map(|s| s.turns.as_slice()).unwrap_or(&[]);

    let response = match state
        .engine
        .ask(&req.user_id, &req.question, prior_turns, req.document_id)
        .await
    {
        Ok(response) => response,
        Err(e) => return error_response(e),
    };

    let turn = ChatTurn {
        question: req.question.clone(),
        response: response.clone(),
        document_id: req.document_id,
    };

    let (chat_id, title) = match session {
        Some(session) => {
            if let Err(e) = state.chats.append_turn(session.id, &turn).await {
                return error_response(e);
            }
            (session.id, session.title)
        }
        None => {
            let mut session = ChatSession::new(req.user_id, chat_title(&req.question));
            session.turns.push(turn);
            if let Err(e) = state.chats.create_session(&session).await {
                return error_response(e);
            }
            (session.id, session.title)
        }
    };

    Json(AskResponse {
        response,
        chat_id,
        chat_title: title,
    })
    .into_response()
}

async fn list_chats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> impl IntoResponse {
    match state.chats.list_sessions(&query.user_id).await {
        Ok(sessions) => Json(
            sessions
                .into_iter()
                .map(|s| ChatSummaryResponse {
                    chat_id: s.id,
                    chat_title: s.title,
                    created_at: s.created_at,
                })
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn get_chat(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(chat_id): axum::extract::Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> impl IntoResponse {
    match state.chats.get_session(chat_id, &query.user_id).await {
        Ok(Some(session)) => Json(ChatDetailResponse {
            chat_id: session.id,
            chat_title: session.title,
            messages: session
                .turns
                .into_iter()
                .map(|t| ChatMessage {
                    question: t.question,
                    response: t.response,
                    document_id: t.document_id,
                })
                .collect(),
        })
        .into_response(),
        Ok(None) => not_found(format!("Chat session not found: {}", chat_id)),
        Err(e) => error_response(e),
    }
}

async fn delete_chat(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(chat_id): axum::extract::Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> impl IntoResponse {
    match state.chats.delete_session(chat_id, &query.user_id).await {
        Ok(true) => Json(DeletedResponse {
            message: format!("Chat session {} deleted", chat_id),
        })
        .into_response(),
        Ok(false) => not_found(format!("Chat session not found: {}", chat_id)),
        Err(e) => error_response(e),
    }
}

async fn upload_document(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UploadDocumentRequest>,
) -> impl IntoResponse {
    let content = match BASE64_STANDARD.decode(&req.content_base64) {
        Ok(content) => content,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Invalid base64 content: {}", e),
                }),
            )
                .into_response()
        }
    };

    let doc = StoredDocument::new(req.user_id, req.name, req.file_name);
    match state.documents.put_document(&doc, &content).await {
        Ok(()) => Json(document_response(doc)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn list_documents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> impl IntoResponse {
    match state.documents.list_documents(&query.user_id).await {
        Ok(docs) => Json(
            docs.into_iter()
                .map(document_response)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn delete_document(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(document_id): axum::extract::Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> impl IntoResponse {
    match state
        .documents
        .delete_document(document_id, &query.user_id)
        .await
    {
        Ok(true) => Json(DeletedResponse {
            message: format!("Document {} deleted", document_id),
        })
        .into_response(),
        Ok(false) => not_found(format!("Document not found: {}", document_id)),
        Err(e) => error_response(e),
    }
}

async fn summarize_documents(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarizeDocumentsRequest>,
) -> impl IntoResponse {
    match state
        .engine
        .summarize_documents(&req.user_id, &req.documents)
        .await
    {
        Ok(summary) => Json(SummaryResponse { summary }).into_response(),
        Err(e) => error_response(e),
    }
}

async fn summarize_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarizeTextRequest>,
) -> impl IntoResponse {
    match state.engine.summarize_text(&req.content).await {
        Ok(summary) => Json(SummaryResponse { summary }).into_response(),
        Err(e) => error_response(e),
    }
}

async fn summarize_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarizeVideoRequest>,
) -> impl IntoResponse {
    match state.engine.summarize_video(&req.video).await {
        Ok(summary) => Json(SummaryResponse { summary }).into_response(),
        Err(e) => error_response(e),
    }
}
