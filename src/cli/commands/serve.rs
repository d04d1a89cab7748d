//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints to open chat sessions and run turns in them.

use super::build_tool_context;
use crate::agent::{
    manifest, render, ChatModel, ChatSession, ConversationTurn, OpenAIChatModel, RenderItem,
    ToolContext,
};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use uuid::Uuid;

/// An open session and when it was last looked up.
struct SessionEntry {
    session: Arc<Mutex<ChatSession>>,
    last_used: Instant,
}

/// Shared application state.
struct AppState {
    model: Arc<dyn ChatModel>,
    tools: Arc<ToolContext>,
    prompts: Prompts,
    greeting: String,
    max_tool_rounds: usize,
    session_idle: Duration,
    max_sessions: usize,
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
}

impl AppState {
    fn new_session(&self) -> ChatSession {
        ChatSession::new(self.model.clone(), self.tools.clone(), self.prompts.clone())
            .with_max_tool_rounds(self.max_tool_rounds)
    }

    /// Register a new session, evicting the least recently used ones at the cap.
    async fn open_session(&self) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.lock().await;

        while sessions.len() >= self.max_sessions.max(1) {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            info!("Evicted session {} (limit {})", oldest, self.max_sessions);
        }

        sessions.insert(
            id,
            SessionEntry {
                session: Arc::new(Mutex::new(self.new_session())),
                last_used: Instant::now(),
            },
        );
        id
    }

    async fn session(&self, id: Uuid) -> Option<Arc<Mutex<ChatSession>>> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_used = Instant::now();
        Some(entry.session.clone())
    }

    /// Drop sessions idle for longer than `session_idle`. Sessions mid-turn stay.
    async fn sweep_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();

        sessions.retain(|_, entry| {
            now.duration_since(entry.last_used) < self.session_idle
                || entry.session.try_lock().is_err()
        });

        before - sessions.len()
    }
}

/// Periodically drop idle sessions.
fn spawn_sweeper(state: Arc<AppState>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let dropped = state.sweep_idle().await;
            if dropped > 0 {
                info!("Dropped {} idle sessions", dropped);
            }
        }
    });
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let state = Arc::new(AppState {
        model: Arc::new(OpenAIChatModel::new(&settings.model)?),
        tools: build_tool_context(&settings)?,
        prompts: Prompts::from_settings(&settings.prompts),
        greeting: settings.general.greeting.clone(),
        max_tool_rounds: settings.model.max_tool_rounds,
        session_idle: Duration::from_secs(settings.server.session_idle_secs),
        max_sessions: settings.server.max_sessions,
        sessions: Mutex::new(HashMap::new()),
    });
    spawn_sweeper(
        state.clone(),
        Duration::from_secs(settings.server.sweep_interval_secs.max(1)),
    );

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Reelchat API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Tools", "GET    /tools");
    Output::kv("New session", "POST   /sessions");
    Output::kv("Transcript", "GET    /sessions/{id}");
    Output::kv("Send message", "POST   /sessions/{id}/messages");
    Output::kv("End session", "DELETE /sessions/{id}");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/sessions", axum::routing::post(create_session))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .route("/sessions/{id}/messages", axum::routing::post(send_message))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Serialize)]
struct SessionCreated {
    id: Uuid,
    greeting: String,
}

#[derive(Serialize)]
struct TranscriptResponse {
    id: Uuid,
    turns: Vec<ConversationTurn>,
    items: Vec<RenderItem>,
}

#[derive(Deserialize)]
struct MessageRequest {
    text: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

fn session_not_found(id: Uuid) -> Response {
    error(StatusCode::NOT_FOUND, format!("Session not found: {}", id))
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_tools() -> impl IntoResponse {
    let tools: Vec<serde_json::Value> = manifest()
        .iter()
        .map(|t| {
            serde_json::json!({
                "name": t.name,
                "description": t.description,
                "parameters": t.json_schema(),
            })
        })
        .collect();
    Json(serde_json::json!({ "tools": tools }))
}

async fn create_session(State(state): State<Arc<AppState>>) -> Response {
    let id = state.open_session().await;
    info!("Opened session {}", id);

    (
        StatusCode::CREATED,
        Json(SessionCreated {
            id,
            greeting: state.greeting.clone(),
        }),
    )
        .into_response()
}

async fn get_session(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    let Some(session) = state.session(id).await else {
        return session_not_found(id);
    };
    let session = session.lock().await;
    let turns = session.conversation().turns();

    Json(TranscriptResponse {
        id,
        turns: turns.to_vec(),
        items: render(turns),
    })
    .into_response()
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<MessageRequest>,
) -> Response {
    let text = req.text.trim();
    if text.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Message text is empty".to_string());
    }

    let Some(session) = state.session(id).await else {
        return session_not_found(id);
    };

    // One turn at a time per session; other sessions are unaffected.
    let mut session = session.lock().await;
    let reply = session.send_message(text).await;
    Json(reply).into_response()
}

async fn delete_session(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    match state.sessions.lock().await.remove(&id) {
        Some(_) => {
            info!("Closed session {}", id);
            StatusCode::NO_CONTENT.into_response()
        }
        None => session_not_found(id),
    }
}
