//! MessagePusher trait 定義
//!
//! 接続中のクライアントへ envelope を届けるためのインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    envelope::{DeliveryReport, Envelope},
    error::MessagePushError,
    session::{Session, SessionId, SessionInfo},
    value_object::UserId,
};

/// Producer half of a session's bounded outbound queue
pub type PusherChannel = mpsc::Sender<String>;

/// Consumer half of a session's bounded outbound queue, drained by the write loop
pub type PusherReceiver = mpsc::Receiver<String>;

/// Delivery of envelopes to connected users.
///
/// Every push is non-blocking: a full queue drops the payload.
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register `session`, replacing any session of the same user.
    /// Returns the replaced session.
    async fn register_session(&self, session: Session) -> Option<SessionInfo>;

    /// Remove the session of `user_id` only if it is still `session_id`.
    async fn unregister_session(&self, user_id: &UserId, session_id: SessionId) -> bool;

    /// Push `envelope` to one user.
    async fn push_to(&self, user_id: &UserId, envelope: &Envelope) -> Result<(), MessagePushError>;

    /// Push `envelope` to every connected user in `targets`, serializing it once.
    async fn broadcast(&self, targets: &[UserId], envelope: &Envelope) -> DeliveryReport;

    /// Push `envelope` to every connected user.
    async fn broadcast_all(&self, envelope: &Envelope) -> DeliveryReport;

    /// Snapshot of the connected sessions.
    async fn connected_sessions(&self) -> Vec<SessionInfo>;
}
