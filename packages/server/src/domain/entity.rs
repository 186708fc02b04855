//! Domain entities.

use serde::{Deserialize, Serialize};

use super::{
    error::StatusTransitionError,
    value_object::{ChatId, MessageId, Timestamp, UserId},
};

/// Delivery status of a persisted message
///
/// Statuses are ordered: `Sending < Sent < Delivered < Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    Sending,
    Sent,
    Delivered,
    Read,
}

impl MessageStatus {
    /// Whether a message in `self` may move to `next`.
    ///
    /// Forward moves and repeats are legal, regressions are not.
    pub fn can_transition_to(self, next: MessageStatus) -> bool {
        next >= self
    }
}

/// Content type of a persisted message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Text,
    Image,
    Video,
    Document,
    Info,
}

/// A message as recorded by the persistence gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub content: String,
    pub timestamp: Timestamp,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub status: MessageStatus,
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<MessageId>,
}

impl Message {
    /// A freshly created message, status `Sent`
    pub fn new(
        id: MessageId,
        chat_id: ChatId,
        sender_id: UserId,
        content: String,
        message_type: MessageType,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            chat_id,
            sender_id,
            content,
            timestamp,
            message_type,
            status: MessageStatus::Sent,
            is_deleted: false,
            reply_to_id: None,
        }
    }

    /// Move the message to `next`, rejecting regressions.
    pub fn advance_status(&mut self, next: MessageStatus) -> Result<(), StatusTransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(StatusTransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// A classified inbound event received on a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A new chat message for `chat_id`
    Chat { chat_id: ChatId, content: String },
    /// The sender has read `message_id`
    ReadReceipt { message_id: MessageId },
    /// Any other `type`; ignored
    Unknown { kind: String },
}
