//! Landing chat server.
//!
//! Serves `POST /api/chat` for the landing site.
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY`: provider key; without it every chat request fails with 500
//! - `OPENAI_BASE_URL`, `CHAT_MODEL`, `CHAT_TEMPERATURE`, `CHAT_MAX_TOKENS`
//! - `HOST` / `PORT`: bind address (default `0.0.0.0:3000`)
//! - `WORKER_THREADS`: tokio worker threads (default: logical CPU count)
//! - `RUST_LOG`: log filter

use std::net::SocketAddr;

use moliyachi_client::chat::{ChatState, router};
use moliyachi_client::config::ChatConfig;
use moliyachi_client::telemetry;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

fn parse_worker_threads() -> Option<usize> {
    let raw = std::env::var("WORKER_THREADS").ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<usize>() {
        Ok(0) => {
            eprintln!("Warning: WORKER_THREADS=0 is invalid, using default");
            None
        }
        Ok(threads) => Some(threads),
        Err(error) => {
            eprintln!(
                "Warning: WORKER_THREADS='{trimmed}' is not a valid number ({error}), using default"
            );
            None
        }
    }
}

fn main() {
    dotenvy::dotenv().ok();

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(threads) = parse_worker_threads() {
        builder.worker_threads(threads);
    }

    let runtime = match builder.build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("Failed to create tokio runtime: {error}");
            std::process::exit(1);
        }
    };
    runtime.block_on(async_main());
}

async fn async_main() {
    telemetry::init(telemetry::DEFAULT_FILTER);

    tracing::info!("Starting Moliyachi chat server");

    let config = match ChatConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };
    if config.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; chat requests will fail");
    }
    tracing::info!(model = %config.model, "Chat configuration loaded");

    let address: SocketAddr = match config.bind_address().parse() {
        Ok(address) => address,
        Err(error) => {
            tracing::error!(%error, "Invalid server address: {}", config.bind_address());
            std::process::exit(1);
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let application = router(ChatState::from_config(config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "Failed to bind to address {}", address);
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    if let Err(error) = axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

/// Completes on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
