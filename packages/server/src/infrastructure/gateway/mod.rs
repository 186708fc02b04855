//! Persistence gateway implementations.
//!
//! - `inmemory`: HashMap-backed gateway used by the binary and tests
//! - 将来的に: リレーショナル DB 実装

pub mod inmemory;

pub use inmemory::{ChatSeed, GatewaySeed, InMemoryMessageGateway, SeedError};
