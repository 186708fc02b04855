//! Shared utilities for the chathub workspace: logging setup and time helpers.

pub mod logger;
pub mod time;
