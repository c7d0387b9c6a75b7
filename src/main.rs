// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! fitlog API Server
//!
//! Serves the activity log and progress reports over HTTP for the `fitlog`
//! CLI in cloud mode.

use fitlog::{
    config::Config,
    db::{ActivityStore, FirestoreDb, MemoryStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    config.require_api_key_digest()?;
    tracing::info!(
        port = config.port,
        timezone = %config.timezone,
        "Starting fitlog API"
    );

    // Firestore when a project is configured, otherwise an in-memory store
    let store: Arc<dyn ActivityStore> = match config.gcp_project_id.as_deref() {
        Some(project_id) => Arc::new(
            FirestoreDb::new(project_id)
                .await
                .expect("Failed to connect to Firestore"),
        ),
        None => {
            tracing::warn!("GCP_PROJECT_ID not set, records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store)?);

    // Build router
    let app = fitlog::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fitlog=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
