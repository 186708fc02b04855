//! WebSocket frame DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound frame `type` for a chat message
pub const INBOUND_CHAT: &str = "chat";
/// Inbound frame `type` for a read receipt
pub const INBOUND_READ_RECEIPT: &str = "read_receipt";

/// Frame sent by a client.
///
/// `type` is kept as a plain string so unknown kinds still decode and can be
/// classified (and ignored) by the dispatcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundFrame {
    pub r#type: String,
    #[serde(default)]
    pub chat_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub data: Value,
}

/// Frame `type` sent to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundType {
    Chat,
    Notification,
    StatusUpdate,
}

/// Frame sent to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundFrame {
    pub r#type: OutboundType,
    pub chat_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    pub content: String,
    pub data: Value,
}
