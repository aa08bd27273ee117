//! Shelfsync Server - Main entry point

use anyhow::Result;
use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::json;
use shelfsync_common::logging::{init_logging, LogConfig};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

use shelfsync_server::{
    api,
    commands::{CreateRecordCommand, DispatchCommand, ResolveIdCommand},
    config::Config,
    extract::{DoubanBookExtractor, Extractor, ZhongduExtractor},
    notion::NotionClient,
    store::{BookSchema, Database, PersonSchema, PodcastSchema, SourceSchema},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment; the default
    // filter keeps our own modules chatty without drowning in hyper noise.
    let mut log_config = LogConfig::from_env().with_file_prefix("shelfsync-server");
    if log_config.filter_directives.is_none() {
        log_config = log_config
            .with_filter_directives("shelfsync_server=debug,tower_http=debug,axum=trace");
    }

    init_logging(&log_config)?;

    info!("Starting Shelfsync Server");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    // Notion client and the four collection gateways
    let client = match &config.notion.base_url {
        Some(base_url) => NotionClient::with_base_url(&config.notion.token, base_url)?,
        None => NotionClient::new(&config.notion.token)?,
    };
    info!("Notion client initialized");

    let sources = Arc::new(Database::<SourceSchema>::new(
        client.clone(),
        &config.notion.source_database_id,
    ));
    let people = Arc::new(Database::<PersonSchema>::new(
        client.clone(),
        &config.notion.person_database_id,
    ));
    let podcasts = Arc::new(Database::<PodcastSchema>::new(
        client.clone(),
        &config.notion.podcast_database_id,
    ));
    let books = Arc::new(Database::<BookSchema>::new(
        client,
        &config.notion.book_database_id,
    ));

    // Command wiring: shared resolvers, one creation command per kind
    let resolve_source = Arc::new(ResolveIdCommand::for_sources(sources));
    let resolve_person = Arc::new(ResolveIdCommand::for_people(people));

    let create_podcast = Arc::new(CreateRecordCommand::new(
        resolve_source.clone(),
        resolve_person.clone(),
        podcasts,
    ));
    let create_book = Arc::new(CreateRecordCommand::new(
        resolve_source,
        resolve_person,
        books,
    ));

    let extractors: Vec<Box<dyn Extractor>> = vec![
        Box::new(ZhongduExtractor::new()),
        Box::new(DoubanBookExtractor::new()?),
    ];
    let dispatch = Arc::new(DispatchCommand::new(extractors, create_podcast, create_book));

    let state = api::AppState { dispatch };

    // Build the application router
    let app = create_router(state);

    // Create socket address
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_router(state: api::AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api::router(state))
        .layer(TraceLayer::new_for_http())
}

/// Health check handler
async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give ongoing requests time to complete
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
