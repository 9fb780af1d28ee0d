//! Timataka API
//!
//! REST API and CLI for Icelandic road-race results scraped from
//! timataka.net, with a file cache and a static mock fallback.

mod cli;
mod config;
mod error;
mod retry;
mod routes;
mod scraper;
mod search;
mod service;
mod types;

use axum::{routing::get, Router};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::routes::AppState;
use crate::service::ScrapeService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => run_server(host, port).await,
        Commands::Events { limit } => cli::run_events(limit).await,
        Commands::Races { event_id } => cli::run_races(event_id).await,
        Commands::Results { race_id, category } => cli::run_results(race_id, category).await,
        Commands::Search { query } => cli::run_search(query).await,
    }
}

/// Run the API server.
async fn run_server(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timataka_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = AppConfig::load()?;

    // Override with CLI args
    if let Some(h) = host {
        config.server.host = h;
    }
    if let Some(p) = port {
        config.server.port = p;
    }

    tracing::info!("Configuration loaded");
    if config.scraper.mock {
        tracing::info!("Mock mode on; serving the static dataset");
    }
    if !config.scraper.cache {
        tracing::info!("Response cache disabled");
    }

    // Create application state
    let service = ScrapeService::new(&config.scraper)?;
    let state = Arc::new(AppState { service });

    // Build router
    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/events", get(routes::events))
        .route("/races", get(routes::races))
        .route("/contestants/{id}", get(routes::contestant))
        .route("/search", get(routes::search))
        .route("/data-source", get(routes::data_source))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
