//! Fan-out Router
//!
//! Resolves the audience of an envelope and enqueues it on every connected
//! member's outbound queue. Chat audiences are always re-resolved from the
//! gateway at delivery time; the gateway is awaited before the session
//! registry is touched.

use std::sync::Arc;

use crate::domain::{
    ChatId, DeliveryReport, Envelope, MessageGateway, MessagePushError, MessagePusher, UserId,
};

use super::error::FanoutError;

pub struct FanoutRouter {
    message_gateway: Arc<dyn MessageGateway>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl FanoutRouter {
    pub fn new(
        message_gateway: Arc<dyn MessageGateway>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            message_gateway,
            message_pusher,
        }
    }

    /// Deliver `envelope` to every connected participant of `chat_id`, except `exclude`.
    pub async fn deliver_to_chat(
        &self,
        chat_id: &ChatId,
        envelope: &Envelope,
        exclude: Option<&UserId>,
    ) -> Result<DeliveryReport, FanoutError> {
        let participants = self
            .message_gateway
            .list_participants(chat_id)
            .await
            .map_err(FanoutError::Participants)?;

        let targets: Vec<UserId> = participants
            .into_iter()
            .filter(|participant| Some(participant) != exclude)
            .collect();

        let report = self.message_pusher.broadcast(&targets, envelope).await;
        tracing::debug!("Fan-out to chat '{}': {:?}", chat_id, report);
        Ok(report)
    }

    /// Deliver `envelope` to one user. Offline users are a silent no-op.
    pub async fn deliver_to_user(&self, user_id: &UserId, envelope: &Envelope) -> DeliveryReport {
        match self.message_pusher.push_to(user_id, envelope).await {
            Ok(()) => DeliveryReport {
                delivered: 1,
                ..Default::default()
            },
            Err(MessagePushError::ClientNotFound(_)) => {
                tracing::debug!("'{}' not connected, skipping", user_id);
                DeliveryReport {
                    offline: 1,
                    ..Default::default()
                }
            }
            Err(e) => {
                tracing::warn!("Dropped envelope for '{}': {}", user_id, e);
                DeliveryReport {
                    dropped: 1,
                    ..Default::default()
                }
            }
        }
    }

    /// Deliver `envelope` to every connected user.
    pub async fn broadcast_all(&self, envelope: &Envelope) -> DeliveryReport {
        let report = self.message_pusher.broadcast_all(envelope).await;
        tracing::debug!("Broadcast to all sessions: {:?}", report);
        report
    }
}
