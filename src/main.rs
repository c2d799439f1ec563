use std::net::SocketAddr;
use std::process::ExitCode;

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use prosepolish::{AppState, Config, SigningSecret, build_router, metrics, utils};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting prosepolish v{}", env!("CARGO_PKG_VERSION"));

    match run().await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

/// Run the application, returning an exit code on error.
async fn run() -> Result<(), exitcode::ExitCode> {
    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {e}");
        exitcode::CONFIG
    })?;
    info!(
        host = %config.host,
        port = %config.port,
        session_ttl = ?config.session_ttl,
        request_token_ttl = ?config.request_token_ttl,
        "Configuration loaded"
    );

    if !config.login_enabled() {
        warn!("ADMIN_USER/ADMIN_PASSWORD not set; login will answer 403 until configured");
    }

    // Resolve the signing secret once, before serving traffic
    let secret = SigningSecret::resolve(config.signing_secret.as_deref(), &config.secret_file);
    if secret.is_ephemeral() {
        warn!("Signing secret is ephemeral; all sessions expire at process exit");
    }

    // Start metrics exporter (optional)
    if let Some(metrics_addr) = config.metrics_addr() {
        metrics::try_init_metrics(metrics_addr);
    } else {
        info!("Metrics disabled (METRICS_PORT=0)");
    }

    // Build application state and router
    let state = AppState::new(secret, config.clone());
    let app = build_router(state);

    // Start server
    let addr: SocketAddr = config.server_addr().parse().map_err(|e| {
        error!("Invalid server address: {e}");
        exitcode::CONFIG
    })?;
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to {addr}: {e}");
        exitcode::UNAVAILABLE
    })?;

    info!("Server listening on http://{addr}");
    info!("API endpoints:");
    info!("  GET  /api/health   - Health check (public)");
    info!("  POST /api/login    - Exchange credentials for a session");
    info!("  POST /api/logout   - Clear session cookies");
    info!("  GET  /api/token    - Issue an action token (session required)");
    info!("  POST /api/rewrite  - Rewrite text (session + CSRF + action token)");

    // Start server with graceful shutdown
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
