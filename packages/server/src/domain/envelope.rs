//! Outbound envelopes and delivery accounting.

use serde::Serialize;
use serde_json::Value;

use super::{entity::Message, value_object::ChatId};

/// What an outbound envelope represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// A chat message delivered to a chat participant
    ChatDelivery,
    /// A human-facing notification
    Notification,
    /// A global announcement to every connected user
    StatusBroadcast,
    /// A status change of a message the recipient sent
    StatusUpdate,
}

/// A typed message sent outward to connected clients
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub kind: EnvelopeKind,
    pub chat_id: Option<ChatId>,
    pub subtype: Option<String>,
    pub content: String,
    pub data: Value,
}

impl Envelope {
    pub fn new(kind: EnvelopeKind, content: impl Into<String>, data: Value) -> Self {
        Self {
            kind,
            chat_id: None,
            subtype: None,
            content: content.into(),
            data,
        }
    }

    pub fn with_chat(mut self, chat_id: ChatId) -> Self {
        self.chat_id = Some(chat_id);
        self
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    /// The `chat` envelope for a freshly persisted message
    pub fn chat_delivery(message: &Message) -> Self {
        Self::new(
            EnvelopeKind::ChatDelivery,
            message.content.clone(),
            message_payload(message),
        )
        .with_chat(message.chat_id.clone())
    }

    /// The `notification` envelope that accompanies a chat delivery
    pub fn new_message_notification(message: &Message) -> Self {
        Self::new(
            EnvelopeKind::Notification,
            format!("New message: {}", message.content),
            message_payload(message),
        )
        .with_chat(message.chat_id.clone())
    }

    /// The `status_update` envelope sent to a message's author after a read receipt
    pub fn read_receipt(message: &Message) -> Self {
        Self::new(
            EnvelopeKind::StatusUpdate,
            "Message has been read",
            message_payload(message),
        )
        .with_chat(message.chat_id.clone())
    }
}

fn message_payload(message: &Message) -> Value {
    payload_value(&message.id, message)
}

/// JSON payload of `value`; a serialization failure is logged and sent as `null`.
fn payload_value<T: Serialize>(label: impl std::fmt::Display, value: &T) -> Value {
    match serde_json::to_value(value) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Failed to serialize payload of {}: {}", label, e);
            Value::Null
        }
    }
}

/// Outcome of one fan-out call, for logging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Enqueued on the recipient's outbound queue
    pub delivered: usize,
    /// Recipient had no session
    pub offline: usize,
    /// Recipient's queue was full or closed
    pub dropped: usize,
}

impl DeliveryReport {
    pub fn merge(self, other: DeliveryReport) -> Self {
        Self {
            delivered: self.delivered + other.delivered,
            offline: self.offline + other.offline,
            dropped: self.dropped + other.dropped,
        }
    }
}
