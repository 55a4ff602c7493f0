//! chatvault CLI and REST API entry point.
//!
//! Parses CLI arguments, loads configuration, initializes the database and
//! services, then either applies migrations or starts the REST API server.

mod cli;
mod http;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use chatvault_infra::config::load_config;
use chatvault_infra::sqlite::pool::DatabasePool;
use chatvault_observe::tracing_setup::{
    filter_for_verbosity, init_tracing, shutdown_tracing, TracingOptions,
};
use chatvault_types::config::LogFormat;

use cli::{Cli, Commands};
use http::middleware::rate_limit::spawn_window_pruner;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).await?;

    init_tracing(&TracingOptions {
        default_filter: filter_for_verbosity(cli.verbose).to_string(),
        json: cli.json_logs || config.log.format == LogFormat::Json,
        enable_otel: config.log.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = match cli.command {
        Commands::Migrate => migrate(&config.database.url).await,
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
    };

    shutdown_tracing();
    result
}

async fn migrate(database_url: &str) -> anyhow::Result<()> {
    // Opening the pool applies any pending migrations.
    let pool = DatabasePool::new(database_url)
        .await
        .context("failed to migrate database")?;
    pool.close().await;
    tracing::info!("migrations applied");
    Ok(())
}

async fn serve(config: chatvault_types::config::ServiceConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::init(config).await?;

    if let Some(limiter) = &state.limiter {
        spawn_window_pruner(Arc::clone(limiter));
    } else {
        tracing::warn!("rate limiting is disabled");
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "chatvault API listening");

    let db_pool = state.db_pool.clone();
    let router = http::router::build_router(state);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    db_pool.close().await;
    tracing::info!("server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
