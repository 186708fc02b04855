//! UseCase: セッション接続処理
//!
//! 有界の送信キューを確保し、セッションをレジストリへ登録します。
//! 同じユーザーの既存セッションは上書きされ、古い接続は自身の write loop が
//! キューのクローズを検知して終了します。

use std::sync::Arc;

use tokio::sync::mpsc;

use chathub_shared::time::Clock;

use crate::domain::{MessagePusher, PusherReceiver, Session, SessionInfo, Timestamp, UserId};

/// Default capacity of a session's outbound queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// セッション接続のユースケース
pub struct ConnectSessionUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    queue_capacity: usize,
}

impl ConnectSessionUseCase {
    /// `queue_capacity` must be non-zero; it is clamped to 1 otherwise.
    pub fn new(
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        queue_capacity: usize,
    ) -> Self {
        Self {
            message_pusher,
            clock,
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Allocate the outbound queue and register a session for `user_id`.
    ///
    /// Returns the session's info and the consumer half of its queue, which the
    /// connection's write loop drains.
    pub async fn execute(&self, user_id: UserId) -> (SessionInfo, PusherReceiver) {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let session = Session::new(user_id, tx, Timestamp::new(self.clock.now_millis()));
        let info = session.info();

        if let Some(replaced) = self.message_pusher.register_session(session).await {
            tracing::info!(
                "Session {} of '{}' replaced by {}",
                replaced.session_id,
                info.user_id,
                info.session_id
            );
        }

        (info, rx)
    }
}
