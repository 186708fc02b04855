//! Real-time connection hub for a chat backend.
//!
//! Tracks which users are connected over WebSocket, accepts inbound chat and
//! read-receipt events, records them through a persistence gateway and fans
//! them out to the currently connected recipients on a best-effort basis.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
