//! Helpers shared by the usecase tests.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    domain::{
        ChatId, Message, MessageId, MessagePusher, MessageType, PusherReceiver, Session,
        Timestamp, UserId,
    },
    infrastructure::message_pusher::{SessionRegistry, WebSocketMessagePusher},
};

pub(crate) fn user(id: &str) -> UserId {
    UserId::try_from(id).unwrap()
}

pub(crate) fn chat(id: &str) -> ChatId {
    ChatId::try_from(id).unwrap()
}

pub(crate) fn message(id: &str, chat_id: &str, sender: &str, content: &str) -> Message {
    Message::new(
        MessageId::try_from(id).unwrap(),
        chat(chat_id),
        user(sender),
        content.to_string(),
        MessageType::Text,
        Timestamp::new(1000),
    )
}

pub(crate) fn pusher() -> Arc<WebSocketMessagePusher> {
    Arc::new(WebSocketMessagePusher::new(SessionRegistry::new()))
}

pub(crate) async fn connect(pusher: &WebSocketMessagePusher, id: &str) -> PusherReceiver {
    let (tx, rx) = mpsc::channel(16);
    pusher
        .register_session(Session::new(user(id), tx, Timestamp::new(1000)))
        .await;
    rx
}

/// Everything currently queued, decoded as JSON frames
pub(crate) fn drain(rx: &mut PusherReceiver) -> Vec<Value> {
    let mut frames = Vec::new();
    while let Ok(payload) = rx.try_recv() {
        frames.push(serde_json::from_str(&payload).unwrap());
    }
    frames
}
