//! UseCase: セッション切断処理

use std::sync::Arc;

use crate::domain::{MessagePusher, SessionInfo};

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectSessionUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// Remove `session` from the registry if it is still the user's current one.
    ///
    /// Returns `false` when a newer session already took its place.
    pub async fn execute(&self, session: &SessionInfo) -> bool {
        self.message_pusher
            .unregister_session(&session.user_id, session.session_id)
            .await
    }
}
