//! UseCase: チャット履歴取得

use std::sync::Arc;

use crate::domain::{ChatId, Message, MessageGateway, UserId};

use super::error::GetChatHistoryError;

pub struct GetChatHistoryUseCase {
    message_gateway: Arc<dyn MessageGateway>,
}

impl GetChatHistoryUseCase {
    pub fn new(message_gateway: Arc<dyn MessageGateway>) -> Self {
        Self { message_gateway }
    }

    /// Messages of `chat_id`, newest first. Only participants may read them.
    pub async fn execute(
        &self,
        requester: &UserId,
        chat_id: &ChatId,
    ) -> Result<Vec<Message>, GetChatHistoryError> {
        let participants = self.message_gateway.list_participants(chat_id).await?;
        if !participants.contains(requester) {
            return Err(GetChatHistoryError::NotParticipant {
                user_id: requester.to_string(),
                chat_id: chat_id.to_string(),
            });
        }

        Ok(self.message_gateway.fetch_chat_history(chat_id).await?)
    }
}
