//! Turn API — axum HTTP surface over the dialogue session.
//!
//! Submit a question, clear the conversation, toggle whether retrieved
//! chunks appear in responses, and generate assessment questions for a
//! course outcome. The session sits behind an
//! async mutex so turns against the same conversation are strictly
//! serialized; chunk visibility is a process-wide flag that a request may
//! override for itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AssistantError;
use crate::generation::Generator;
use crate::retrieval::Retriever;
use crate::session::DialogueSession;
use crate::taxonomy::CognitiveLevel;

/// The session type served by this API. Gateways are held behind their
/// traits so tests can drive handlers with stub backends.
pub type AppSession = DialogueSession<Box<dyn Retriever>, Box<dyn Generator>>;

/// Shared application state.
///
/// The mutex enforces the one-turn-in-flight rule; it is held across the
/// whole retrieval+generation cycle on purpose.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<tokio::sync::Mutex<AppSession>>,
    pub show_chunks: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(session: AppSession) -> Self {
        Self {
            session: Arc::new(tokio::sync::Mutex::new(session)),
            show_chunks: Arc::new(AtomicBool::new(false)),
        }
    }
}

// ── Error mapping ─────────────────────────────────────────────────────────────

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request — missing or invalid parameters.
    BadRequest(String),
    /// 500 Internal Server Error — retrieval or generation failure.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };
        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

// ── Request / response types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: Option<String>,
    /// Per-request override of the global chunk-visibility toggle.
    pub show_chunks: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub cognitive_level: String,
    pub cognitive_description: String,
    pub sentiment: String,
    pub chunks: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleChunksRequest {
    pub show_chunks: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuestionsRequest {
    pub course_outcome: Option<String>,
    pub bloom_level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_chunks: Option<bool>,
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// POST /api/chat — run one conversation turn.
async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let question = req
        .question
        .ok_or_else(|| ApiError::BadRequest("Missing question in request".to_string()))?;

    let show_chunks = req
        .show_chunks
        .unwrap_or_else(|| state.show_chunks.load(Ordering::Relaxed));

    let request_id = Uuid::new_v4();
    info!(%request_id, "chat_request");

    let mut session = state.session.lock().await;
    let outcome = session.process_turn(&question).await?;

    // Chunks are computed regardless; visibility is decided here.
    let chunks = if show_chunks {
        outcome.chunks.into_iter().map(|c| c.text).collect()
    } else {
        Vec::new()
    };

    Ok(Json(ChatResponse {
        answer: outcome.answer,
        cognitive_level: outcome.level.label().to_string(),
        cognitive_description: outcome.level.description().to_string(),
        sentiment: outcome.sentiment.label().to_string(),
        chunks,
    }))
}

/// POST /api/clear — reset conversation state.
async fn clear(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    let mut session = state.session.lock().await;
    session.reset();
    Ok(Json(MessageResponse {
        message: "Conversation history cleared".to_string(),
        show_chunks: None,
    }))
}

/// POST /api/toggle-chunks — set the global chunk-visibility flag.
async fn toggle_chunks(
    State(state): State<AppState>,
    Json(req): Json<ToggleChunksRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let value = req.show_chunks.ok_or_else(|| {
        ApiError::BadRequest("Missing or invalid show_chunks parameter".to_string())
    })?;

    state.show_chunks.store(value, Ordering::Relaxed);
    Ok(Json(MessageResponse {
        message: format!("Show chunks set to {value}"),
        show_chunks: Some(value),
    }))
}

/// POST /api/generate-questions — produce assessment questions for a course
/// outcome at a given cognitive level.
async fn generate_questions(
    State(state): State<AppState>,
    Json(req): Json<GenerateQuestionsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let course_outcome = req
        .course_outcome
        .ok_or_else(|| ApiError::BadRequest("Missing course_outcome in request".to_string()))?;
    let bloom_level = req
        .bloom_level
        .ok_or_else(|| ApiError::BadRequest("Missing bloom_level in request".to_string()))?;
    let level = CognitiveLevel::from_label(&bloom_level)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown bloom_level: {bloom_level}")))?;

    let session = state.session.lock().await;
    let quiz = session.generate_questions(&course_outcome, level).await?;

    Ok(Json(serde_json::json!({
        "bloom_level": level.label(),
        "course_outcome": course_outcome,
        "questions": {
            "objective": {
                "question": quiz.objective_question,
                "options": quiz.options,
            },
            "subjective": quiz.subjective,
        },
        "raw_text": quiz.raw_text,
    })))
}

/// GET /health — liveness check.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ── Router / server ───────────────────────────────────────────────────────────

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Browser frontend runs on a separate origin; allow all origins.
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/clear", post(clear))
        .route("/api/toggle-chunks", post(toggle_chunks))
        .route("/api/generate-questions", post(generate_questions))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server on the configured address.
pub async fn start_server(config: &Config, state: AppState) -> Result<(), AssistantError> {
    let addr = format!("127.0.0.1:{}", config.server_port);
    let router = create_router(state);

    info!("Starting Turn API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
