//! Conversion logic between DTOs and domain types.

use thiserror::Error;

use chathub_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ChatId, Envelope, EnvelopeKind, InboundEvent, MessageId, SessionInfo, ValueObjectError,
};
use crate::infrastructure::dto::{http, websocket as dto};

/// Why an inbound frame could not be turned into an event
#[derive(Debug, Error)]
pub enum FrameDecodeError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid chat reference: {0}")]
    InvalidChat(ValueObjectError),

    #[error("read receipt must carry a message id string in `data`")]
    MissingMessageReference,

    #[error("invalid message reference: {0}")]
    InvalidMessage(ValueObjectError),
}

// ========================================
// DTO → Domain
// ========================================

/// Decode a text frame into a classified inbound event.
pub fn decode_inbound(text: &str) -> Result<InboundEvent, FrameDecodeError> {
    let frame: dto::InboundFrame = serde_json::from_str(text)?;
    InboundEvent::try_from(frame)
}

impl TryFrom<dto::InboundFrame> for InboundEvent {
    type Error = FrameDecodeError;

    fn try_from(frame: dto::InboundFrame) -> Result<Self, Self::Error> {
        match frame.r#type.as_str() {
            dto::INBOUND_CHAT => Ok(InboundEvent::Chat {
                chat_id: ChatId::new(frame.chat_id).map_err(FrameDecodeError::InvalidChat)?,
                content: frame.content,
            }),
            dto::INBOUND_READ_RECEIPT => {
                let raw = frame
                    .data
                    .as_str()
                    .ok_or(FrameDecodeError::MissingMessageReference)?;
                Ok(InboundEvent::ReadReceipt {
                    message_id: MessageId::try_from(raw)
                        .map_err(FrameDecodeError::InvalidMessage)?,
                })
            }
            _ => Ok(InboundEvent::Unknown { kind: frame.r#type }),
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<EnvelopeKind> for dto::OutboundType {
    fn from(kind: EnvelopeKind) -> Self {
        match kind {
            EnvelopeKind::ChatDelivery => dto::OutboundType::Chat,
            EnvelopeKind::Notification => dto::OutboundType::Notification,
            EnvelopeKind::StatusBroadcast | EnvelopeKind::StatusUpdate => {
                dto::OutboundType::StatusUpdate
            }
        }
    }
}

impl From<&Envelope> for dto::OutboundFrame {
    fn from(envelope: &Envelope) -> Self {
        Self {
            r#type: envelope.kind.into(),
            chat_id: envelope
                .chat_id
                .as_ref()
                .map(|id| id.as_str().to_string())
                .unwrap_or_default(),
            subtype: envelope.subtype.clone(),
            content: envelope.content.clone(),
            data: envelope.data.clone(),
        }
    }
}

/// Serialize an envelope into the JSON text frame sent to clients.
pub fn encode_envelope(envelope: &Envelope) -> Result<String, serde_json::Error> {
    serde_json::to_string(&dto::OutboundFrame::from(envelope))
}

impl From<SessionInfo> for http::SessionDto {
    fn from(info: SessionInfo) -> Self {
        Self {
            user_id: info.user_id.into_string(),
            session_id: info.session_id.to_string(),
            connected_at: timestamp_to_rfc3339(info.connected_at.value()),
        }
    }
}
