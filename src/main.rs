// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Runcrew API Server
//!
//! Social running community backend: workouts, crews, events, challenges
//! and messaging over a REST + SSE API.

use runcrew::{config::Config, db::Database, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Runcrew API");

    // Open the database and apply migrations
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database ready");

    tracing::info!(
        google = config.google.is_some(),
        kakao = config.kakao.is_some(),
        naver = config.naver.is_some(),
        "OAuth providers configured"
    );

    // Build shared state
    let port = config.port;
    let state = Arc::new(AppState::with_disk_storage(config, db));
    tracing::info!(upload_dir = %state.config.upload_dir, "Disk storage initialized");

    // Build router
    let app = runcrew::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("runcrew=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
