//! Request handlers.

mod http;
mod websocket;

pub use http::{debug_sessions, get_chat_history, health_check};
pub use websocket::websocket_handler;
