//! JSON API handlers.
//!
//! Thin 1:1 wrappers over `ConversationManager`; all conversation behavior
//! lives in the core. Errors map to HTTP statuses by kind.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use banter_core::{BanterError, ConversationManager, ConversationStats, Message};

/// Shared application state: one conversation behind a lock.
#[derive(Clone)]
pub struct AppState {
    manager: Arc<Mutex<ConversationManager>>,
}

impl AppState {
    pub fn new(manager: ConversationManager) -> Self {
        Self {
            manager: Arc::new(Mutex::new(manager)),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_page))
        .route("/api/personas", get(list_personas))
        .route("/api/persona", post(set_persona))
        .route("/api/chat", post(chat))
        .route("/api/clear", post(clear_history))
        .route("/api/history", get(get_history))
        .route("/api/stats", get(get_stats))
        .route("/api/save", post(save_snapshot))
        .route("/api/load", post(load_snapshot))
        .with_state(state)
}

type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(err: BanterError) -> ApiError {
    let status = if err.is_unknown_persona() {
        StatusCode::NOT_FOUND
    } else if err.is_format() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else if err.is_api() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

async fn serve_page() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

#[derive(Serialize)]
struct PersonaView {
    key: String,
    name: String,
    prompt: String,
    active: bool,
}

async fn list_personas(State(state): State<AppState>) -> Json<Vec<PersonaView>> {
    let manager = state.manager.lock().await;
    let active = manager.active_persona().key.clone();

    let personas = manager
        .registry()
        .personas()
        .iter()
        .map(|p| PersonaView {
            key: p.key.clone(),
            name: p.name.clone(),
            prompt: p.prompt.clone(),
            active: p.key == active,
        })
        .collect();

    Json(personas)
}

#[derive(Deserialize)]
struct PersonaRequest {
    key: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

async fn set_persona(
    State(state): State<AppState>,
    Json(request): Json<PersonaRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut manager = state.manager.lock().await;

    let confirmation = manager
        .set_persona(&request.key)
        .map_err(error_response)?;

    Ok(Json(MessageResponse {
        message: confirmation,
    }))
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    // The UI filters empty input; the core would record it as a turn.
    if request.message.trim().is_empty() {
        return Err(bad_request("message must not be empty"));
    }

    let mut manager = state.manager.lock().await;
    let reply = manager.chat(&request.message).await.map_err(error_response)?;

    Ok(Json(ChatResponse { reply }))
}

async fn clear_history(State(state): State<AppState>) -> Json<MessageResponse> {
    let mut manager = state.manager.lock().await;
    manager.clear_history();

    Json(MessageResponse {
        message: "Conversation history cleared".to_string(),
    })
}

async fn get_history(State(state): State<AppState>) -> Json<Vec<Message>> {
    let manager = state.manager.lock().await;
    Json(manager.history())
}

async fn get_stats(State(state): State<AppState>) -> Json<ConversationStats> {
    let manager = state.manager.lock().await;
    Json(manager.stats())
}

#[derive(Deserialize)]
struct SaveRequest {
    path: Option<String>,
}

#[derive(Serialize)]
struct SaveResponse {
    path: String,
}

async fn save_snapshot(
    State(state): State<AppState>,
    Json(request): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, ApiError> {
    let manager = state.manager.lock().await;

    let path = manager
        .save_snapshot(request.path.as_deref().map(Path::new))
        .map_err(error_response)?;

    Ok(Json(SaveResponse {
        path: path.display().to_string(),
    }))
}

#[derive(Deserialize)]
struct LoadRequest {
    path: PathBuf,
}

#[derive(Serialize)]
struct LoadResponse {
    persona: String,
    messages: usize,
}

async fn load_snapshot(
    State(state): State<AppState>,
    Json(request): Json<LoadRequest>,
) -> Result<Json<LoadResponse>, ApiError> {
    let mut manager = state.manager.lock().await;

    manager
        .load_snapshot(&request.path)
        .map_err(error_response)?;

    Ok(Json(LoadResponse {
        persona: manager.active_persona().key.clone(),
        messages: manager.stats().total_messages,
    }))
}
