//! UseCase: チャットメッセージ送信処理
//!
//! ## 責務
//!
//! 1. メッセージを TEXT として永続化する
//! 2. `chat` envelope を全参加者（送信者を含む）へ配信する
//! 3. `notification` envelope を送信者以外の参加者へ配信する
//!
//! 永続化に失敗したイベントは破棄され、何も配信されません。

use std::sync::Arc;

use crate::domain::{
    ChatId, DeliveryReport, Envelope, Message, MessageGateway, MessageType, UserId,
};

use super::{error::SendChatMessageError, fanout::FanoutRouter};

/// Result of a successful chat send
#[derive(Debug, Clone, PartialEq)]
pub struct ChatDelivery {
    pub message: Message,
    pub chat: DeliveryReport,
    pub notification: DeliveryReport,
}

/// チャットメッセージ送信のユースケース
pub struct SendChatMessageUseCase {
    message_gateway: Arc<dyn MessageGateway>,
    router: Arc<FanoutRouter>,
}

impl SendChatMessageUseCase {
    pub fn new(message_gateway: Arc<dyn MessageGateway>, router: Arc<FanoutRouter>) -> Self {
        Self {
            message_gateway,
            router,
        }
    }

    pub async fn execute(
        &self,
        sender: &UserId,
        chat_id: &ChatId,
        content: &str,
    ) -> Result<ChatDelivery, SendChatMessageError> {
        let message = self
            .message_gateway
            .create_message(sender, chat_id, content, MessageType::Text)
            .await
            .map_err(SendChatMessageError::Persist)?;

        let chat = self
            .router
            .deliver_to_chat(&message.chat_id, &Envelope::chat_delivery(&message), None)
            .await?;
        let notification = self
            .router
            .deliver_to_chat(
                &message.chat_id,
                &Envelope::new_message_notification(&message),
                Some(sender),
            )
            .await?;

        tracing::info!(
            "Message {} from '{}' in chat '{}' fanned out (chat: {:?}, notification: {:?})",
            message.id,
            sender,
            message.chat_id,
            chat,
            notification
        );

        Ok(ChatDelivery {
            message,
            chat,
            notification,
        })
    }
}
