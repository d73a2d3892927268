use std::net::SocketAddr;
use std::process::ExitCode;

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tnppt_gate::{AppState, Config, build_router, utils};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting TNPPT gate v{}", env!("CARGO_PKG_VERSION"));

    match run().await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

/// Run the server, returning an exit code on error.
async fn run() -> Result<(), exitcode::ExitCode> {
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {e}");
        exitcode::CONFIG
    })?;
    info!(
        host = %config.host,
        port = %config.port,
        ttl_ms = config.auth_ttl_millis,
        users = config.users.len(),
        api_keys = config.api_keys.len(),
        "Configuration loaded"
    );

    if config.users.is_empty() && config.api_keys.is_empty() {
        warn!("No AUTH_USERS or AUTH_API_KEYS configured; every gated request will be denied");
    }

    if let Some(metrics_addr) = config.metrics_addr() {
        tnppt_gate::metrics::try_init_metrics(metrics_addr);
    }

    // A gate that fails to build must never serve traffic
    let state = AppState::new(config.clone());
    let app = build_router(state).map_err(|e| {
        error!("Failed to build router: {e}");
        exitcode::CONFIG
    })?;

    let addr: SocketAddr = config.server_addr().parse().map_err(|e| {
        error!("Invalid server address: {e}");
        exitcode::CONFIG
    })?;
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to {addr}: {e}");
        exitcode::UNAVAILABLE
    })?;

    info!("Server listening on http://{addr}");
    info!("  GET  /health       - Health check (no authentication)");
    info!("  POST /login        - Body-hash scheme (TNPPT_* JSON fields)");
    info!("  GET  /hmac/whoami  - HMAC-header scheme (HMAC_* headers)");
    info!("  GET  /api/whoami   - API-key scheme (API_KEY header)");

    axum::serve(listener, app)
        .with_graceful_shutdown(utils::shutdown_signal())
        .await
        .map_err(|e| {
            error!("Server error: {e}");
            exitcode::SOFTWARE
        })?;

    info!("Server shutdown complete");
    Ok(())
}
