//! Connected session records.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::{
    pusher::PusherChannel,
    value_object::{Timestamp, UserId},
};

/// Unique identity of one live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Server-side record of one live client connection
///
/// The registry holds the only long-lived clone of `channel`; once the entry
/// is removed or overwritten the connection's write loop sees a closed queue.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub channel: PusherChannel,
    pub connected_at: Timestamp,
}

impl Session {
    pub fn new(user_id: UserId, channel: PusherChannel, connected_at: Timestamp) -> Self {
        Self {
            id: SessionId::generate(),
            user_id,
            channel,
            connected_at,
        }
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            user_id: self.user_id.clone(),
            session_id: self.id,
            connected_at: self.connected_at,
        }
    }
}

/// Channel-free view of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub connected_at: Timestamp,
}
