//! UseCase layer: the hub's application logic.
//!
//! - 接続・切断: `ConnectSessionUseCase`, `DisconnectSessionUseCase`
//! - 受信イベント: `InboundDispatcher` → `SendChatMessageUseCase` / `MarkMessageReadUseCase`
//! - 配信: `FanoutRouter`
//! - 外部向け通知 API: `NotifyUseCase`
//! - 履歴取得: `GetChatHistoryUseCase`

pub mod connect_session;
pub mod disconnect_session;
pub mod dispatch_inbound;
pub mod error;
pub mod fanout;
pub mod get_chat_history;
pub mod mark_message_read;
pub mod notify;
pub mod send_chat_message;

#[cfg(test)]
pub(crate) mod test_support;

pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use dispatch_inbound::{DispatchOutcome, InboundDispatcher};
pub use error::{FanoutError, GetChatHistoryError, MarkMessageReadError, SendChatMessageError};
pub use fanout::FanoutRouter;
pub use get_chat_history::GetChatHistoryUseCase;
pub use mark_message_read::MarkMessageReadUseCase;
pub use notify::NotifyUseCase;
pub use send_chat_message::{ChatDelivery, SendChatMessageUseCase};
