//! InMemory Message Gateway 実装
//!
//! ドメイン層が定義する `MessageGateway` trait の具体的な実装。
//! チャット・参加者・メッセージを HashMap に保持します。
//!
//! ステータス更新は `Message::advance_status` のポリシーに従い、後退する
//! 遷移は `GatewayError::IllegalStatusTransition` で拒否されます。

use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
    sync::Arc,
};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use chathub_shared::time::{Clock, SystemClock};

use crate::domain::{
    ChatId, GatewayError, Message, MessageGateway, MessageId, MessageStatus, MessageType,
    Timestamp, UserId,
};

/// One chat in a seed file
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSeed {
    pub id: ChatId,
    pub participants: Vec<UserId>,
}

/// Seed file contents: `{"chats": [{"id": "c1", "participants": ["u1", "u2"]}]}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewaySeed {
    #[serde(default)]
    pub chats: Vec<ChatSeed>,
}

/// Errors while loading a seed file
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
struct Store {
    chats: HashMap<ChatId, BTreeSet<UserId>>,
    /// Insertion order
    messages: Vec<Message>,
    index: HashMap<MessageId, usize>,
}

/// インメモリ Message Gateway 実装
pub struct InMemoryMessageGateway {
    store: Mutex<Store>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryMessageGateway {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl InMemoryMessageGateway {
    /// 新しい InMemoryMessageGateway を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            clock,
        }
    }

    /// Build a gateway pre-populated with `seed`
    pub async fn from_seed(seed: GatewaySeed, clock: Arc<dyn Clock>) -> Self {
        let gateway = Self::new(clock);
        for chat in seed.chats {
            gateway.create_chat(chat.id, chat.participants).await;
        }
        gateway
    }

    /// Read a JSON seed file
    pub fn load_seed(path: &Path) -> Result<GatewaySeed, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Create (or replace) a chat with the given participants
    pub async fn create_chat(&self, chat_id: ChatId, participants: impl IntoIterator<Item = UserId>) {
        let mut store = self.store.lock().await;
        store.chats.insert(chat_id, participants.into_iter().collect());
    }

    pub async fn add_participant(&self, chat_id: &ChatId, user_id: UserId) -> Result<(), GatewayError> {
        let mut store = self.store.lock().await;
        let members = store
            .chats
            .get_mut(chat_id)
            .ok_or_else(|| GatewayError::ChatNotFound(chat_id.as_str().to_string()))?;
        members.insert(user_id);
        Ok(())
    }

    pub async fn remove_participant(&self, chat_id: &ChatId, user_id: &UserId) -> Result<(), GatewayError> {
        let mut store = self.store.lock().await;
        let members = store
            .chats
            .get_mut(chat_id)
            .ok_or_else(|| GatewayError::ChatNotFound(chat_id.as_str().to_string()))?;
        members.remove(user_id);
        Ok(())
    }

    pub async fn get_message(&self, message_id: &MessageId) -> Option<Message> {
        let store = self.store.lock().await;
        store
            .index
            .get(message_id)
            .map(|&position| store.messages[position].clone())
    }

    pub async fn count_messages(&self) -> usize {
        self.store.lock().await.messages.len()
    }
}

fn generate_message_id() -> Result<MessageId, GatewayError> {
    MessageId::new(Uuid::new_v4().to_string()).map_err(|e| GatewayError::Storage(e.to_string()))
}

#[async_trait]
impl MessageGateway for InMemoryMessageGateway {
    async fn create_message(
        &self,
        sender_id: &UserId,
        chat_id: &ChatId,
        content: &str,
        message_type: MessageType,
    ) -> Result<Message, GatewayError> {
        let mut store = self.store.lock().await;
        let members = store
            .chats
            .get(chat_id)
            .ok_or_else(|| GatewayError::ChatNotFound(chat_id.as_str().to_string()))?;
        if !members.contains(sender_id) {
            return Err(GatewayError::NotParticipant {
                user_id: sender_id.as_str().to_string(),
                chat_id: chat_id.as_str().to_string(),
            });
        }

        let message = Message::new(
            generate_message_id()?,
            chat_id.clone(),
            sender_id.clone(),
            content.to_string(),
            message_type,
            Timestamp::new(self.clock.now_millis()),
        );
        let position = store.messages.len();
        store.index.insert(message.id.clone(), position);
        store.messages.push(message.clone());
        Ok(message)
    }

    async fn fetch_chat_history(&self, chat_id: &ChatId) -> Result<Vec<Message>, GatewayError> {
        let store = self.store.lock().await;
        if !store.chats.contains_key(chat_id) {
            return Err(GatewayError::ChatNotFound(chat_id.as_str().to_string()));
        }
        // newest insertion first, so equal timestamps keep a stable order
        let mut history: Vec<Message> = store
            .messages
            .iter()
            .rev()
            .filter(|m| &m.chat_id == chat_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(history)
    }

    async fn update_message_status(
        &self,
        message_id: &MessageId,
        status: MessageStatus,
    ) -> Result<Message, GatewayError> {
        let mut store = self.store.lock().await;
        let position = *store
            .index
            .get(message_id)
            .ok_or_else(|| GatewayError::MessageNotFound(message_id.as_str().to_string()))?;
        let message = &mut store.messages[position];
        message.advance_status(status)?;
        Ok(message.clone())
    }

    async fn list_participants(&self, chat_id: &ChatId) -> Result<Vec<UserId>, GatewayError> {
        let store = self.store.lock().await;
        store
            .chats
            .get(chat_id)
            .map(|members| members.iter().cloned().collect())
            .ok_or_else(|| GatewayError::ChatNotFound(chat_id.as_str().to_string()))
    }
}
