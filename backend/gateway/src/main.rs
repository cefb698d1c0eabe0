//! Crowdfund gateway — entry point.
//!
//! Opens the durable project store, builds the lifecycle engine, and
//! exposes every protocol operation over a small Axum REST API.

mod api;
mod config;
mod errors;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crowdfund_protocol::{ProjectRegistry, ProjectStore, SystemClock};

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    // Load config from environment.
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Open the durable project store and run migrations.
    let store = ProjectStore::connect(&config.database_url).await?;
    let registry = ProjectRegistry::new(store, Arc::new(SystemClock));

    let state = Arc::new(api::ApiState { registry });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/projects", post(api::create_project).get(api::get_projects))
        .route(
            "/projects/:id",
            get(api::get_project).put(api::update_project),
        )
        .route("/projects/:id/contributions", post(api::contribute))
        .route("/projects/:id/contributors", get(api::get_contributors))
        .route("/projects/:id/status", put(api::update_status))
        .route("/projects/:id/cancel", post(api::cancel_project))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
