//! Command-line and environment configuration of the hub.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use thiserror::Error;

use crate::usecase::connect_session::DEFAULT_QUEUE_CAPACITY;

pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("outbound queue capacity must be greater than 0")]
    ZeroQueueCapacity,

    #[error("JWT secret must not be empty")]
    EmptyJwtSecret,

    #[error(
        "idle timeout ({idle_timeout}s) must be longer than the heartbeat interval ({heartbeat_interval}s)"
    )]
    IdleTimeoutTooShort {
        idle_timeout: u64,
        heartbeat_interval: u64,
    },
}

#[derive(Parser, Debug, Clone)]
#[command(name = "chathub-server")]
#[command(about = "Real-time WebSocket connection hub for a chat backend", long_about = None)]
pub struct Config {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "CHATHUB_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// HS256 secret used to verify client tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Capacity of each session's outbound queue
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub outbound_queue_capacity: usize,

    /// Seconds between WebSocket pings (0 disables)
    #[arg(long, default_value_t = DEFAULT_HEARTBEAT_INTERVAL_SECS)]
    pub heartbeat_interval_secs: u64,

    /// Close a connection after this many silent seconds (0 disables)
    #[arg(long, default_value_t = DEFAULT_IDLE_TIMEOUT_SECS)]
    pub idle_timeout_secs: u64,

    /// JSON file with chats and participants to preload
    #[arg(long)]
    pub seed_file: Option<PathBuf>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.outbound_queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::EmptyJwtSecret);
        }
        if self.heartbeat_interval_secs > 0
            && self.idle_timeout_secs > 0
            && self.idle_timeout_secs <= self.heartbeat_interval_secs
        {
            return Err(ConfigError::IdleTimeoutTooShort {
                idle_timeout: self.idle_timeout_secs,
                heartbeat_interval: self.heartbeat_interval_secs,
            });
        }
        Ok(())
    }

    pub fn hub_settings(&self) -> HubSettings {
        HubSettings {
            outbound_queue_capacity: self.outbound_queue_capacity,
            heartbeat_interval: non_zero_secs(self.heartbeat_interval_secs),
            idle_timeout: non_zero_secs(self.idle_timeout_secs),
        }
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Per-connection tuning shared by every session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubSettings {
    pub outbound_queue_capacity: usize,
    /// `None` disables pings
    pub heartbeat_interval: Option<Duration>,
    /// `None` disables the idle timeout
    pub idle_timeout: Option<Duration>,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            heartbeat_interval: non_zero_secs(DEFAULT_HEARTBEAT_INTERVAL_SECS),
            idle_timeout: non_zero_secs(DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }
}
