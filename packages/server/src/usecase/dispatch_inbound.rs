//! Inbound Dispatcher
//!
//! Routes a decoded inbound event to the chat-send or read-receipt handler.
//! Persistence failures end the event, never the connection.

use std::sync::Arc;

use crate::domain::{DeliveryReport, InboundEvent, UserId};

use super::{
    mark_message_read::MarkMessageReadUseCase,
    send_chat_message::{ChatDelivery, SendChatMessageUseCase},
};

/// What happened to one inbound event
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    ChatSent(ChatDelivery),
    ReadReceiptSent(DeliveryReport),
    Ignored,
    Dropped,
}

pub struct InboundDispatcher {
    send_chat_message: Arc<SendChatMessageUseCase>,
    mark_message_read: Arc<MarkMessageReadUseCase>,
}

impl InboundDispatcher {
    pub fn new(
        send_chat_message: Arc<SendChatMessageUseCase>,
        mark_message_read: Arc<MarkMessageReadUseCase>,
    ) -> Self {
        Self {
            send_chat_message,
            mark_message_read,
        }
    }

    pub async fn dispatch(&self, sender: &UserId, event: InboundEvent) -> DispatchOutcome {
        match event {
            InboundEvent::Chat { chat_id, content } => {
                match self
                    .send_chat_message
                    .execute(sender, &chat_id, &content)
                    .await
                {
                    Ok(delivery) => DispatchOutcome::ChatSent(delivery),
                    Err(e) => {
                        tracing::warn!("Dropped chat event from '{}': {}", sender, e);
                        DispatchOutcome::Dropped
                    }
                }
            }
            InboundEvent::ReadReceipt { message_id } => {
                match self.mark_message_read.execute(sender, &message_id).await {
                    Ok(report) => DispatchOutcome::ReadReceiptSent(report),
                    Err(e) => {
                        tracing::warn!("Dropped read receipt from '{}': {}", sender, e);
                        DispatchOutcome::Dropped
                    }
                }
            }
            InboundEvent::Unknown { kind } => {
                tracing::info!("Ignoring inbound event of type '{}' from '{}'", kind, sender);
                DispatchOutcome::Ignored
            }
        }
    }
}
