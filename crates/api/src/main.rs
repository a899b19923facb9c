use anyhow::Result;
use tracing::{info, warn};

use seaguard_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging and metrics
    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting SeaGuard v{}", env!("CARGO_PKG_VERSION"));

    let addr = config.socket_addr()?;
    let state = app::AppState::from_config(config).await?;
    let monitor = state.monitor.clone();

    if state.config.monitoring.enabled {
        match monitor.start_monitoring(state.source.clone()).await {
            Ok(session) => info!(session_id = %session.id, "Monitoring enabled at startup"),
            Err(e) => warn!(error = %e, "Could not start monitoring at startup"),
        }
    }

    // Build application
    let app = app::create_app(state);

    // Start server
    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Close the session and flush pending history writes
    monitor.shutdown().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
