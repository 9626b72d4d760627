use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::agent::prompts::ERROR_MARKER;
use crate::chat::proxy::{send_chat, ChatContext};
use crate::errors::{AppError, AppJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// Anything other than `"profile"`, including null, is CV mode.
    #[serde(default)]
    pub context: Option<ChatContext>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub profile_updated: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    /// Whether the session had a thread before the reset.
    pub found: bool,
}

#[derive(Debug, Serialize)]
pub struct AgentStatusResponse {
    pub connected: bool,
    pub agent_url: String,
}

fn require_session_id(session_id: Option<String>) -> Result<String, AppError> {
    session_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("session_id is required".to_string()))
}

/// POST /api/v1/chat
///
/// Agent failures still answer with a chat-shaped body so the sidebar can show the
/// error inline as an assistant message.
pub async fn handle_chat(
    State(state): State<AppState>,
    AppJson(req): AppJson<ChatRequest>,
) -> Result<Response, AppError> {
    let session_id = require_session_id(req.session_id)?;
    if req.message.trim().is_empty() {
        return Err(AppError::BadRequest("message cannot be empty".to_string()));
    }

    match send_chat(
        &state.sessions,
        state.agent.as_ref(),
        &session_id,
        req.message.trim(),
        req.context.unwrap_or_default(),
    )
    .await
    {
        Ok(reply) => Ok(Json(ChatResponse {
            response: reply.response,
            profile_updated: reply.profile_updated,
        })
        .into_response()),
        Err(e) => {
            error!("Chat error for session {session_id}: {e}");
            let body = ChatResponse {
                response: format!("{ERROR_MARKER} {e}"),
                profile_updated: false,
            };
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response())
        }
    }
}

/// POST /api/v1/chat/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    AppJson(req): AppJson<ResetRequest>,
) -> Result<Json<ResetResponse>, AppError> {
    let session_id = require_session_id(req.session_id)?;
    let found = state.sessions.delete_session(&session_id).await;
    Ok(Json(ResetResponse {
        success: true,
        found,
    }))
}

/// GET /api/v1/agent/status
pub async fn handle_agent_status(State(state): State<AppState>) -> Json<AgentStatusResponse> {
    let connected = state.agent.info().await.is_ok();
    Json(AgentStatusResponse {
        connected,
        agent_url: state.config.agent_url.clone(),
    })
}
