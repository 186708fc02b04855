//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - `SessionRegistry` を通じた接続中セッションの管理
//! - envelope の JSON 化（宛先バッチごとに 1 回）と各セッションキューへの投入
//!
//! ## 設計ノート
//!
//! キューへの投入は常に `try_send` で行い、満杯のキューは待たずに破棄します。
//! WebSocket への実際の書き込みは各接続の write loop（UI 層）だけが行います。

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;

use crate::{
    domain::{
        DeliveryReport, Envelope, MessagePushError, MessagePusher, PusherChannel, Session,
        SessionId, SessionInfo, UserId,
    },
    infrastructure::dto::conversion::encode_envelope,
};

use super::registry::SessionRegistry;

/// MessagePusher backed by the in-process session registry
#[derive(Debug, Clone)]
pub struct WebSocketMessagePusher {
    registry: SessionRegistry,
}

impl WebSocketMessagePusher {
    pub fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }
}

fn enqueue(
    user_id: &UserId,
    channel: &PusherChannel,
    payload: String,
) -> Result<(), MessagePushError> {
    channel.try_send(payload).map_err(|e| match e {
        TrySendError::Full(_) => MessagePushError::QueueFull(user_id.as_str().to_string()),
        TrySendError::Closed(_) => MessagePushError::QueueClosed(user_id.as_str().to_string()),
    })
}

fn tally(report: &mut DeliveryReport, user_id: &UserId, result: Result<(), MessagePushError>) {
    match result {
        Ok(()) => {
            report.delivered += 1;
            tracing::debug!("Pushed envelope to '{}'", user_id);
        }
        Err(e) => {
            report.dropped += 1;
            tracing::warn!("Dropped envelope for '{}': {}", user_id, e);
        }
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_session(&self, session: Session) -> Option<SessionInfo> {
        let user_id = session.user_id.clone();
        let replaced = self.registry.register(session).await.map(|s| s.info());
        tracing::debug!(
            "Session for '{}' registered to MessagePusher ({} connected)",
            user_id,
            self.registry.len().await
        );
        replaced
    }

    async fn unregister_session(&self, user_id: &UserId, session_id: SessionId) -> bool {
        let removed = self.registry.unregister(user_id, session_id).await;
        if removed {
            tracing::debug!(
                "Session {} of '{}' unregistered ({} connected)",
                session_id,
                user_id,
                self.registry.len().await
            );
        } else {
            tracing::debug!(
                "Session {} of '{}' already replaced, registry left untouched",
                session_id,
                user_id
            );
        }
        removed
    }

    async fn push_to(&self, user_id: &UserId, envelope: &Envelope) -> Result<(), MessagePushError> {
        let session = self
            .registry
            .lookup(user_id)
            .await
            .ok_or_else(|| MessagePushError::ClientNotFound(user_id.as_str().to_string()))?;
        let payload =
            encode_envelope(envelope).map_err(|e| MessagePushError::Serialization(e.to_string()))?;
        enqueue(user_id, &session.channel, payload)?;
        tracing::debug!("Pushed envelope to '{}'", user_id);
        Ok(())
    }

    async fn broadcast(&self, targets: &[UserId], envelope: &Envelope) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let payload = match encode_envelope(envelope) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to serialize envelope: {}", e);
                report.dropped = targets.len();
                return report;
            }
        };

        let sessions = self.registry.lookup_many(targets).await;
        for (target, session) in targets.iter().zip(sessions) {
            match session {
                Some(session) => {
                    let result = enqueue(target, &session.channel, payload.clone());
                    tally(&mut report, target, result);
                }
                None => {
                    report.offline += 1;
                    tracing::debug!("'{}' not connected, skipping", target);
                }
            }
        }

        report
    }

    async fn broadcast_all(&self, envelope: &Envelope) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let payload = match encode_envelope(envelope) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to serialize envelope: {}", e);
                return report;
            }
        };

        self.registry
            .for_each(|session| {
                let result = enqueue(&session.user_id, &session.channel, payload.clone());
                tally(&mut report, &session.user_id, result);
            })
            .await;

        report
    }

    async fn connected_sessions(&self) -> Vec<SessionInfo> {
        let mut sessions = Vec::new();
        self.registry
            .for_each(|session| sessions.push(session.info()))
            .await;
        sessions.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        sessions
    }
}
