//! Web front end for banter.
//!
//! Serves a single embedded page and a JSON API that wraps one
//! `ConversationManager` 1:1. One conversation per process; per-session
//! managers are the scaling path if that scope ever changes.

mod api;

use std::net::SocketAddr;

use banter_core::{ApiConfig, ConversationManager, OpenAiClient, PersonaRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banter=info".into()),
        )
        .init();

    let registry = PersonaRegistry::load_default()?;
    // Missing credentials are startup-fatal here, not a core concern.
    let config = ApiConfig::from_env()?;
    let backend = OpenAiClient::new(&config)?;
    let manager = ConversationManager::new(registry, Box::new(backend));

    let port: u16 = std::env::var("BANTER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8787);

    let state = api::AppState::new(manager);
    let app = api::create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!(%addr, "banter web UI listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
