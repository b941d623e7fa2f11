//! HTTP surface for the helpdesk-bot.
//!
//! One conversational endpoint plus a health probe:
//! - `POST /chat` runs a full turn: load history, invoke the agent, persist
//!   both sides of the exchange, shape the response.
//! - `GET /health` reports liveness and the configured model.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, instrument};

use crate::{
    base::types::{ChatRequest, ChatResponse, Err, HealthResponse, Res, Role, Void},
    interaction::chat::ConversationalAgent,
    runtime::Runtime,
};

/// Build the application router.
pub fn router(runtime: Runtime) -> Router {
    Router::new().route("/chat", post(chat)).route("/health", get(health)).with_state(runtime)
}

/// Serve the router on the configured bind address until ctrl-c.
#[instrument(skip_all)]
pub async fn serve(runtime: Runtime) -> Void {
    let bind_address = runtime.config.bind_address.clone();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Listening on {bind_address} ...");

    axum::serve(listener, router(runtime)).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received.");
}

/// Handle one conversational turn.
///
/// The agent sees the history as it was *before* this turn; the incoming
/// message and the reply are both appended so the next turn sees the full
/// exchange. The ticket, if any, comes from the first extraction tool
/// invocation of the turn.
#[instrument(name = "server::chat", skip_all, fields(user_id = %req.user_id))]
pub async fn chat(State(runtime): State<Runtime>, Json(req): Json<ChatRequest>) -> Result<Json<ChatResponse>, ApiError> {
    let response = chat_internal(&runtime, &req).await?;

    Ok(Json(response))
}

async fn chat_internal(runtime: &Runtime, req: &ChatRequest) -> Res<ChatResponse> {
    let history = runtime.history.read(&req.user_id).await?;
    runtime.history.append(&req.user_id, Role::User, &req.message).await?;

    let agent = ConversationalAgent::new(runtime.llm.clone());
    let turn = agent.respond(&req.message, &history).await?;

    let ticket = turn
        .tool_invocations
        .into_iter()
        .find(|invocation| invocation.tool == crate::base::prompts::CREATE_TICKET_TOOL)
        .map(|invocation| invocation.result);

    runtime.history.append(&req.user_id, Role::Assistant, &turn.reply).await?;

    Ok(ChatResponse {
        reply: turn.reply,
        ticket,
        timestamp: Utc::now(),
    })
}

/// Report liveness and the configured model.
#[instrument(name = "server::health", skip_all)]
pub async fn health(State(runtime): State<Runtime>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: runtime.config.openai_model.clone(),
    })
}

// Error mapping.

/// Internal failure surfaced to the HTTP caller as a 500 with the underlying message.
#[derive(Debug)]
pub struct ApiError(Err);

impl From<Err> for ApiError {
    fn from(err: Err) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);

        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}
