mod access;
mod config;
mod db;
mod directory;
mod errors;
mod models;
mod routes;
mod scan;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StoreBackend};
use crate::db::create_pool;
use crate::directory::memory::InMemoryDirectoryStore;
use crate::directory::postgres::PgDirectoryStore;
use crate::directory::service::Directory;
use crate::directory::store::DirectoryStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Placement API v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn DirectoryStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let pool = create_pool(url, config.db_max_connections).await?;
            Arc::new(PgDirectoryStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory directory store; data is lost on restart");
            Arc::new(InMemoryDirectoryStore::new())
        }
    };

    info!("Identity header: {}", config.identity_header);

    let state = AppState {
        directory: Directory::new(store),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the dashboard origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
