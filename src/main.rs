// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HabitFlow API Server
//!
//! Serves the challenge, completion, chat and statistics API backed by
//! Firestore or an in-memory store.

use habitflow::{
    config::{Config, StorageBackend},
    db::{FirestoreDb, MemoryDb, Store},
    services::seed::seed_sample_challenges,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        storage = ?config.storage,
        "Starting HabitFlow API"
    );

    let db: Arc<dyn Store> = match config.storage {
        StorageBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Arc::new(MemoryDb::new())
        }
    };

    if config.seed_sample_challenges {
        seed_sample_challenges(db.as_ref()).await?;
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
    });

    // Build router
    let app = habitflow::routes::create_router(state);

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

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("habitflow=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
