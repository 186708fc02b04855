//! Persistence gateway trait 定義
//!
//! ハブが永続化層に求めるインターフェースをドメイン層自身が定義します。
//! ハブはこの trait に依存し、具体的なストレージ実装には依存しません。
//!
//! ゲートウェイの応答は常に正とみなされ、チャット宛てのファンアウトは
//! 毎回 `list_participants` を呼び直して宛先を決定します。

use async_trait::async_trait;

use super::{
    entity::{Message, MessageStatus, MessageType},
    error::GatewayError,
    value_object::{ChatId, MessageId, UserId},
};

/// Durable store for messages, chats and participants
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Persist a new message from `sender_id` in `chat_id`
    async fn create_message(
        &self,
        sender_id: &UserId,
        chat_id: &ChatId,
        content: &str,
        message_type: MessageType,
    ) -> Result<Message, GatewayError>;

    /// Messages of `chat_id`, newest first
    async fn fetch_chat_history(&self, chat_id: &ChatId) -> Result<Vec<Message>, GatewayError>;

    /// Set the status of `message_id` and return the updated record
    async fn update_message_status(
        &self,
        message_id: &MessageId,
        status: MessageStatus,
    ) -> Result<Message, GatewayError>;

    /// Current participants of `chat_id`
    async fn list_participants(&self, chat_id: &ChatId) -> Result<Vec<UserId>, GatewayError>;
}
