//! Infrastructure layer: concrete implementations of the domain interfaces
//! plus wire-format DTOs and credential verification.

pub mod auth;
pub mod dto;
pub mod gateway;
pub mod message_pusher;
