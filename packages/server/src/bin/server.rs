//! chathub server: real-time WebSocket connection hub.
//!
//! Run with:
//! ```not_rust
//! JWT_SECRET=dev-secret cargo run --bin chathub-server
//! cargo run --bin chathub-server -- --host 0.0.0.0 --port 3000 --jwt-secret dev-secret --seed-file chats.json
//! ```

use std::sync::Arc;

use chathub_server::{
    config::Config,
    infrastructure::{
        auth::JwtVerifier,
        gateway::{GatewaySeed, InMemoryMessageGateway},
        message_pusher::{SessionRegistry, WebSocketMessagePusher},
    },
    ui::{AppState, Server},
};
use chathub_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};
use clap::Parser;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // Initialize dependencies in order:
    // 1. Gateway
    // 2. MessagePusher
    // 3. AppState (UseCases)
    // 4. Server

    // 1. Create Gateway (in-memory persistence)
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let seed = match &config.seed_file {
        Some(path) => match InMemoryMessageGateway::load_seed(path) {
            Ok(seed) => seed,
            Err(e) => {
                tracing::error!("Failed to load seed file {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => GatewaySeed::default(),
    };
    tracing::info!("Loaded {} chat(s) into the gateway", seed.chats.len());
    let gateway = Arc::new(InMemoryMessageGateway::from_seed(seed, clock.clone()).await);

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new(SessionRegistry::new()));

    // 3. Create UseCases
    let state = AppState::new(
        gateway,
        message_pusher,
        JwtVerifier::new(config.jwt_secret.as_bytes()),
        config.hub_settings(),
        clock,
    );

    // 4. Create and run the server
    let server = Server::new(Arc::new(state));
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
