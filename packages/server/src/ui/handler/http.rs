//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};

use crate::{
    domain::{ChatId, Message, UserId},
    infrastructure::dto::http::{ErrorDto, SessionDto},
    ui::state::AppState,
    usecase::GetChatHistoryError,
};

type ApiError = (StatusCode, Json<ErrorDto>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorDto {
            error: error.to_string(),
        }),
    )
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint listing connected sessions
pub async fn debug_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionDto>> {
    let sessions = state.message_pusher.connected_sessions().await;

    // Domain Model から DTO への変換
    Json(sessions.into_iter().map(SessionDto::from).collect())
}

/// Chat history, newest first. Requires `Authorization: Bearer <jwt>` of a participant.
pub async fn get_chat_history(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Message>>, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "missing bearer token"))?;

    let claims = state
        .jwt_verifier
        .verify(token)
        .map_err(|e| api_error(StatusCode::UNAUTHORIZED, e))?;
    let requester =
        UserId::try_from(claims.sub).map_err(|e| api_error(StatusCode::UNAUTHORIZED, e))?;
    let chat_id = ChatId::try_from(chat_id).map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;

    match state
        .get_chat_history_usecase
        .execute(&requester, &chat_id)
        .await
    {
        Ok(messages) => Ok(Json(messages)),
        Err(e @ GetChatHistoryError::NotParticipant { .. }) => {
            Err(api_error(StatusCode::FORBIDDEN, e))
        }
        Err(e @ GetChatHistoryError::ChatNotFound(_)) => Err(api_error(StatusCode::NOT_FOUND, e)),
        Err(e @ GetChatHistoryError::Gateway(_)) => {
            tracing::error!("Failed to fetch history of chat '{}': {}", chat_id, e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}
