//! UseCase: 既読処理
//!
//! メッセージのステータスを READ に更新し、元の送信者にだけ
//! `status_update` を配信します。

use std::sync::Arc;

use crate::domain::{DeliveryReport, Envelope, MessageGateway, MessageId, MessageStatus, UserId};

use super::{error::MarkMessageReadError, fanout::FanoutRouter};

/// 既読処理のユースケース
pub struct MarkMessageReadUseCase {
    message_gateway: Arc<dyn MessageGateway>,
    router: Arc<FanoutRouter>,
}

impl MarkMessageReadUseCase {
    pub fn new(message_gateway: Arc<dyn MessageGateway>, router: Arc<FanoutRouter>) -> Self {
        Self {
            message_gateway,
            router,
        }
    }

    /// `reader` is only used for logging; readers are not checked for participation.
    pub async fn execute(
        &self,
        reader: &UserId,
        message_id: &MessageId,
    ) -> Result<DeliveryReport, MarkMessageReadError> {
        let message = self
            .message_gateway
            .update_message_status(message_id, MessageStatus::Read)
            .await
            .map_err(MarkMessageReadError::Persist)?;

        let report = self
            .router
            .deliver_to_user(&message.sender_id, &Envelope::read_receipt(&message))
            .await;

        tracing::info!(
            "Message {} read by '{}', sender '{}' notified: {:?}",
            message.id,
            reader,
            message.sender_id,
            report
        );
        Ok(report)
    }
}
