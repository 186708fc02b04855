//! メッセージ送信（通知）の実装
//!
//! - `registry`: 接続中セッションのレジストリ（単一ロック）
//! - `websocket`: レジストリ上のセッションキューへ envelope を積む実装

pub mod registry;
pub mod websocket;

pub use registry::SessionRegistry;
pub use websocket::WebSocketMessagePusher;
