//! Board chat server.
//!
//! Serves one chat room per board over WebSocket, with history replay from
//! the managed REST store.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin boardchat-server
//! cargo run --bin boardchat-server -- --port 9092 --presence-notices
//! SUPABASE_URL=https://xyz.supabase.co SUPABASE_KEY=... cargo run --bin boardchat-server
//! ```

use std::{sync::Arc, time::Duration};

use boardchat_server::{
    config::{ChatConfig, RoomConfig, STORE_REQUEST_TIMEOUT},
    domain::{IdentityValidator, MessageStore},
    infrastructure::{
        hub::Hub,
        identity::{SupabaseIdentityValidator, TrustedQueryIdentity},
        store::{InMemoryMessageStore, SupabaseMessageStore},
        supabase::SupabaseClient,
    },
    ui::{AppState, Server},
};
use boardchat_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "boardchat-server")]
#[command(about = "Real-time chat server for task boards", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "9092")]
    port: u16,

    /// Base URL of the managed REST store
    #[arg(long, env = "SUPABASE_URL")]
    supabase_url: Option<String>,

    /// API key of the managed REST store
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    supabase_key: Option<String>,

    /// Seconds before a request to the managed store or identity service is abandoned
    #[arg(long, env = "STORE_TIMEOUT_SECS", default_value_t = STORE_REQUEST_TIMEOUT.as_secs())]
    store_timeout_secs: u64,

    /// Require a bearer token validated by the identity service
    #[arg(long, env = "REQUIRE_TOKEN")]
    require_token: bool,

    /// Seconds an empty room lingers before it is retired (0 keeps rooms forever)
    #[arg(long, env = "ROOM_IDLE_TIMEOUT_SECS", default_value = "300")]
    room_idle_timeout_secs: u64,

    /// Maximum number of stored messages replayed to a joining participant
    #[arg(long, env = "HISTORY_LIMIT")]
    history_limit: Option<usize>,

    /// Broadcast join/leave notices when participants come and go
    #[arg(long, env = "PRESENCE_NOTICES")]
    presence_notices: bool,
}

#[tokio::main]
async fn main() {
    // .env may carry RUST_LOG, so load it before the logger
    let dotenv = dotenvy::dotenv();

    setup_logger(env!("CARGO_BIN_NAME"), "info");

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let args = Args::parse();

    let config = ChatConfig {
        room_idle_timeout: (args.room_idle_timeout_secs > 0)
            .then(|| Duration::from_secs(args.room_idle_timeout_secs)),
        presence_notices: args.presence_notices,
        history_limit: args.history_limit,
        ..ChatConfig::default()
    };

    // 1. Store and identity
    let (store, identity_validator): (Arc<dyn MessageStore>, Arc<dyn IdentityValidator>) =
        match (args.supabase_url, args.supabase_key) {
            (Some(url), Some(key)) => {
                let timeout = Duration::from_secs(args.store_timeout_secs);
                let client = match SupabaseClient::new(url, key, timeout) {
                    Ok(client) => client,
                    Err(e) => {
                        tracing::error!("Failed to build the Supabase HTTP client: {}", e);
                        std::process::exit(1);
                    }
                };
                let identity_validator: Arc<dyn IdentityValidator> = if args.require_token {
                    Arc::new(SupabaseIdentityValidator::new(client.clone()))
                } else {
                    Arc::new(TrustedQueryIdentity)
                };
                (Arc::new(SupabaseMessageStore::new(client)), identity_validator)
            }
            _ => {
                if args.require_token {
                    tracing::error!("--require-token needs SUPABASE_URL and SUPABASE_KEY");
                    std::process::exit(1);
                }
                tracing::warn!(
                    "SUPABASE_URL or SUPABASE_KEY not set; messages are kept in memory only"
                );
                (
                    Arc::new(InMemoryMessageStore::new()),
                    Arc::new(TrustedQueryIdentity),
                )
            }
        };

    // 2. Hub
    let hub = Arc::new(Hub::new(RoomConfig::from(&config)));

    // 3. Use cases and server
    let state = AppState::new(hub, identity_validator, store, Arc::new(SystemClock), config);
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
