use std::net::SocketAddr;
use std::process::ExitCode;

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use gamehub::{AppState, Config, build_router, metrics, utils};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting GameHub v{}", env!("CARGO_PKG_VERSION"));

    match run().await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

/// Run the application, returning an exit code on error.
async fn run() -> Result<(), exitcode::ExitCode> {
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {e}");
        exitcode::CONFIG
    })?;
    info!(
        host = %config.host,
        port = %config.port,
        rawg_base_url = %config.rawg_base_url,
        page_size = config.page_size,
        log_level = %config.log_level,
        "Configuration loaded"
    );

    if !config.has_api_key() {
        warn!("RAWG_API_KEY is not set; every game request will fail until it is configured");
    }

    if let Some(metrics_addr) = config.metrics_addr() {
        metrics::try_init_metrics(metrics_addr);
    }

    let state = AppState::from_config(config.clone()).map_err(|e| {
        error!("Failed to initialize upstream client: {e}");
        exitcode::CONFIG
    })?;
    let app = build_router(state);

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
    info!("  GET  /games            - Game collection");
    info!("  GET  /games/latest     - Newest releases");
    info!("  GET  /games/popular    - Highest rated");
    info!("  GET  /games/metacritic - Highest Metacritic score");
    info!("  GET  /games/upcoming   - Upcoming releases");
    info!("  GET  /games/search?q=  - Search");
    info!("  GET  /games/{{id}}       - Game details");

    utils::serve_with_grace(
        listener,
        app,
        utils::shutdown_signal(),
        config.shutdown_grace,
    )
    .await
    .map_err(|e| {
        error!("Server error: {e}");
        exitcode::SOFTWARE
    })?;

    info!("Server shutdown complete");
    Ok(())
}
