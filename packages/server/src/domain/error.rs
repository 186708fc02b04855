//! Domain error types.

use thiserror::Error;

use super::entity::MessageStatus;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{name} must be at most {max} characters (got {actual})")]
    TooLong {
        name: &'static str,
        max: usize,
        actual: usize,
    },
}

/// A status change that would move a message backwards
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal message status transition: {from:?} -> {to:?}")]
pub struct StatusTransitionError {
    pub from: MessageStatus,
    pub to: MessageStatus,
}

/// Errors reported by the persistence gateway
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("chat '{0}' not found")]
    ChatNotFound(String),

    #[error("message '{0}' not found")]
    MessageNotFound(String),

    #[error("user '{user_id}' is not a participant of chat '{chat_id}'")]
    NotParticipant { user_id: String, chat_id: String },

    #[error(transparent)]
    IllegalStatusTransition(#[from] StatusTransitionError),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors reported when pushing a payload to one connected user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' is not connected")]
    ClientNotFound(String),

    #[error("outbound queue of client '{0}' is full")]
    QueueFull(String),

    #[error("outbound queue of client '{0}' is closed")]
    QueueClosed(String),

    #[error("failed to serialize envelope: {0}")]
    Serialization(String),
}
