mod agent;
mod chat;
mod config;
mod documents;
mod errors;
mod markdown;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::agent::{AgentClient, AgentService};
use crate::chat::SessionRegistry;
use crate::config::Config;
use crate::documents::DocumentStore;
use crate::render::{PdfRenderer, ProfilePdf};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Studio API v{}", env!("CARGO_PKG_VERSION"));

    // Agent client
    let agent: Arc<dyn AgentService> = Arc::new(AgentClient::new(
        config.agent_url.clone(),
        config.agent_assistant_id.clone(),
        config.agent_timeout,
    )?);
    info!(
        "Agent client initialized ({}, assistant {})",
        config.agent_url, config.agent_assistant_id
    );
    if agent.info().await.is_err() {
        warn!("Agent at {} is not reachable yet", config.agent_url);
    }

    // Documents and PDF generation
    let store = DocumentStore::new(&config.data_dir);
    info!("Document store at {}", config.data_dir.display());
    let renderer = PdfRenderer::from_config(&config);

    let state = AppState {
        store,
        renderer,
        agent,
        sessions: Arc::new(SessionRegistry::new()),
        profile_pdf: Arc::new(ProfilePdf::new()),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
