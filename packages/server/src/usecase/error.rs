//! UseCase error types.

use thiserror::Error;

use crate::domain::GatewayError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FanoutError {
    #[error("failed to resolve chat participants: {0}")]
    Participants(#[source] GatewayError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendChatMessageError {
    #[error("failed to persist message: {0}")]
    Persist(#[source] GatewayError),

    #[error("message persisted but fan-out failed: {0}")]
    Fanout(#[from] FanoutError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkMessageReadError {
    #[error("failed to mark message as read: {0}")]
    Persist(#[source] GatewayError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetChatHistoryError {
    #[error("user '{user_id}' is not a participant of chat '{chat_id}'")]
    NotParticipant { user_id: String, chat_id: String },

    #[error("chat '{0}' not found")]
    ChatNotFound(String),

    #[error(transparent)]
    Gateway(GatewayError),
}

impl From<GatewayError> for GetChatHistoryError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::ChatNotFound(chat_id) => GetChatHistoryError::ChatNotFound(chat_id),
            other => GetChatHistoryError::Gateway(other),
        }
    }
}
