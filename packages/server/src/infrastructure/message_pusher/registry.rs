//! Session registry: user identity → active session.
//!
//! One lock guards the whole map. Every operation is an O(1) map access or a
//! snapshot copy, never I/O, so holding the lock is always brief.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::domain::{Session, SessionId, UserId};

/// In-memory registry of connected sessions, one per user
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<UserId, Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `session.user_id`.
    ///
    /// The replaced session, if any, is returned. It is not closed here; its
    /// queue sender is dropped with it, which ends its write loop.
    pub async fn register(&self, session: Session) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.user_id.clone(), session)
    }

    /// Remove the entry for `user_id` only if it still belongs to `session_id`.
    pub async fn unregister(&self, user_id: &UserId, session_id: SessionId) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(user_id) {
            Some(current) if current.id == session_id => {
                sessions.remove(user_id);
                true
            }
            _ => false,
        }
    }

    pub async fn lookup(&self, user_id: &UserId) -> Option<Session> {
        let sessions = self.sessions.lock().await;
        sessions.get(user_id).cloned()
    }

    /// Sessions of `user_ids`, in order, from one snapshot taken under the lock.
    pub async fn lookup_many(&self, user_ids: &[UserId]) -> Vec<Option<Session>> {
        let sessions = self.sessions.lock().await;
        user_ids.iter().map(|id| sessions.get(id).cloned()).collect()
    }

    /// Call `f` for every session in a snapshot taken under the lock.
    pub async fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Session),
    {
        let snapshot: Vec<Session> = {
            let sessions = self.sessions.lock().await;
            sessions.values().cloned().collect()
        };
        for session in &snapshot {
            f(session);
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
