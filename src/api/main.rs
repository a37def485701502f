use anyhow::Context;
use cases_api::config::ApiConfig;
use cases_api::middleware::init_tracing;
use cases_api::routes::{AppState, create_app};
use std::net::SocketAddr;
use tracing::info;

// Panic hook to catch and log panics
fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        match panic_info.location() {
            Some(location) => tracing::error!(
                "Panic at {}:{}:{}: {}",
                location.file(),
                location.line(),
                location.column(),
                message
            ),
            None => tracing::error!("Panic: {}", message),
        }
    }));
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing().map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;
    setup_panic_hook();
    info!("Application starting...");

    let config = ApiConfig::load().context("Failed to load configuration")?;
    let storage = AppState::init_storage(&config)
        .await
        .context("Failed to initialize storage")?;
    let port = config.port;
    let app_state = AppState::new(config, storage).context("Invalid configuration")?;
    let app = create_app(app_state);

    // Run server on configurable port (default 8081)
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind listener on {}", addr))?;
    info!("Server listening on {} (port {})", addr, port);
    info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

// Handle both SIGINT (Ctrl+C) and SIGTERM (Docker stop)
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("SIGINT received, shutting down gracefully");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received, shutting down gracefully");
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
