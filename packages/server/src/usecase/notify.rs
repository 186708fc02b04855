//! UseCase: 外部コラボレーター向けの通知 API
//!
//! 他のバックエンド処理（ステータス投稿、連絡先変更など）から呼び出され、
//! 接続中のユーザーへ通知を届けます。配信はベストエフォートです。

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{ChatId, DeliveryReport, Envelope, EnvelopeKind, UserId};

use super::{error::FanoutError, fanout::FanoutRouter};

pub struct NotifyUseCase {
    router: Arc<FanoutRouter>,
}

impl NotifyUseCase {
    pub fn new(router: Arc<FanoutRouter>) -> Self {
        Self { router }
    }

    /// `notification` with `subtype` to a single user
    pub async fn notify_user(
        &self,
        user_id: &UserId,
        subtype: &str,
        message: &str,
        payload: Value,
    ) -> DeliveryReport {
        let envelope =
            Envelope::new(EnvelopeKind::Notification, message, payload).with_subtype(subtype);
        self.router.deliver_to_user(user_id, &envelope).await
    }

    /// `notification` to every participant of `chat_id` except `exclude`
    pub async fn notify_chat_except(
        &self,
        chat_id: &ChatId,
        exclude: &UserId,
        message: &str,
        payload: Value,
    ) -> Result<DeliveryReport, FanoutError> {
        let envelope = Envelope::new(EnvelopeKind::Notification, message, payload)
            .with_chat(chat_id.clone());
        self.router
            .deliver_to_chat(chat_id, &envelope, Some(exclude))
            .await
    }

    /// Global announcement to every connected user
    pub async fn broadcast_all(&self, message: &str, payload: Value) -> DeliveryReport {
        let envelope = Envelope::new(EnvelopeKind::StatusBroadcast, message, payload);
        let report = self.router.broadcast_all(&envelope).await;
        tracing::info!("Broadcast '{}' to all sessions: {:?}", message, report);
        report
    }
}
