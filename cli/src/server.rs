//! Console HTTP server assembly.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use quarterdeck_core::{
    application::apps::AppOps,
    domain::console_config::ConsoleConfig,
    infrastructure::{
        audit::TracingAuditSink, cluster_registry::StaticClusterRegistry,
        directory::UserDirectory, remote::HttpRemoteCaller,
    },
    presentation::api::{self, AppState},
};

pub async fn start_server(config_path: Option<PathBuf>, host: &str, port: u16) -> Result<()> {
    // Load configuration
    let config = ConsoleConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    info!(
        "Configuration loaded: {} clusters, {} users",
        config.spec.clusters.len(),
        config.spec.users.len()
    );

    // Initialize the proxy pipeline
    let registry = Arc::new(StaticClusterRegistry::from_config(&config));
    if registry.is_empty() {
        warn!("No clusters configured; every operation will fail cluster resolution");
    }
    let directory = UserDirectory::from_config(&config);
    if directory.is_empty() {
        warn!("No users configured; every request will be rejected as unauthenticated");
    }

    let ops = AppOps::new(
        registry,
        Arc::new(HttpRemoteCaller::new()),
        Arc::new(TracingAuditSink::new()),
    );

    let state = AppState {
        ops,
        directory,
        start_time: std::time::Instant::now(),
    };

    // Build HTTP router
    let app = api::app(Arc::new(state)).layer(TraceLayer::new_for_http());

    // Start HTTP server
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Console listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Console shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
