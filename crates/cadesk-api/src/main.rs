//! # cadesk-api: binary entry point
//!
//! Reads configuration from the environment, picks the reminder sweep's
//! deadline store, and serves until SIGINT/SIGTERM.

use cadesk_api::state::{AppConfig, AppState};
use cadesk_backend::{BackendClient, BackendConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    // Missing backend settings are not fatal: the sweep fails at selection
    // and the /v1 routes answer 503.
    let backend_config = BackendConfig::from_env();
    let backend_complete = backend_config.is_complete();
    let backend = BackendClient::new(backend_config).map_err(|e| {
        tracing::error!("Failed to create backend client: {e}");
        e
    })?;

    let db_pool = cadesk_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let store = cadesk_api::db::sweep_store(db_pool.as_ref(), backend.clone());

    let mut state = AppState::new(config.clone(), store);
    if backend_complete {
        state = state.with_backend(backend);
    } else {
        tracing::warn!("Backend not configured; /v1 routes will return 503");
    }
    if let Some(pool) = db_pool {
        state = state.with_db_pool(pool);
    }
    tracing::info!(policy = %config.reminder_policy, "reminder preference policy");

    let app = cadesk_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("cadesk API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
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
}
