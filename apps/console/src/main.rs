mod backend;
mod config;
mod contact;
mod errors;
mod manager;
mod models;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend::HttpBackend;
use crate::config::Config;
use crate::manager::{ApplicationsManager, ApplicationsService};
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

    info!("Starting Hiring Console v{}", env!("CARGO_PKG_VERSION"));

    let backend = HttpBackend::new(
        &config.backend_url,
        config.backend_token.clone(),
        Duration::from_secs(config.backend_timeout_secs),
    )
    .context("Failed to build HTTP client for the applications backend")?;
    info!("Applications backend: {}", config.backend_url);

    let applications = Arc::new(ApplicationsService::new(
        Arc::new(backend),
        ApplicationsManager::new(config.page_size, config.login_path.clone()),
        config.company_name.clone(),
    ));

    // Initial load; failures are surfaced as notifications, the console still starts.
    {
        let applications = Arc::clone(&applications);
        tokio::spawn(async move {
            if let Err(e) = applications.load_applications(true).await {
                warn!("Initial load of job applications failed: {e}");
            }
        });
    }

    let state = AppState {
        applications,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the admin front end's origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
