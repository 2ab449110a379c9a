//! Lease broker server entry point.
//!
//! Bootstraps the resource store from the seed YAML, then starts the Axum
//! HTTP server with graceful shutdown. A background expirer runs alongside
//! the server on the same store and is cancelled on shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use leasebroker_core::{bootstrap, expirer, BootstrapError, SystemClock};
use leasebroker_server::config::{ServerConfig, StorageBackendType};
use leasebroker_server::state::AppState;
use leasebroker_storage::{MemoryStore, ResourceStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = ?config.storage_backend, "lease broker starting");

    let state = build_app_state(&config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let expirer_handle = {
        let store = Arc::clone(&state.store);
        let clock = Arc::clone(&state.clock);
        let period = Duration::from_millis(config.sweep_interval_ms);
        let rx = shutdown_rx.clone();
        tokio::spawn(async move {
            expirer::run(store, clock, period, rx).await;
        })
    };

    let app = leasebroker_server::build_router(Arc::clone(&state));

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "lease broker listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("server error")?;

    info!("waiting for expirer to stop");
    let _ = tokio::time::timeout(Duration::from_secs(10), expirer_handle).await;

    info!("lease broker stopped");
    Ok(())
}

/// Build the shared application state: open the store, seed it from the
/// bootstrap YAML, and fail startup on any validation error (§4.7b).
async fn build_app_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let store: Arc<dyn ResourceStore> = match &config.storage_backend {
        StorageBackendType::Memory => {
            info!("using in-memory store (data will not persist)");
            Arc::new(MemoryStore::new())
        }
        #[cfg(feature = "postgres-backend")]
        StorageBackendType::Postgres { database_url } => {
            info!("using Postgres store");
            Arc::new(
                leasebroker_storage::PostgresStore::connect(database_url)
                    .await
                    .context("failed to connect to Postgres store")?,
            )
        }
        #[cfg(not(feature = "postgres-backend"))]
        StorageBackendType::Postgres { .. } => {
            anyhow::bail!("Postgres storage requested but feature 'postgres-backend' is not enabled");
        }
    };

    let yaml_path = config.resource_yaml_path.clone().ok_or(BootstrapError::MissingPath)?;
    let seeded = bootstrap::load(&yaml_path, store.as_ref()).await?;
    info!(count = seeded, "resource catalog seeded");

    Ok(Arc::new(AppState { store, clock: Arc::new(SystemClock) }))
}

/// Wait for SIGINT or SIGTERM, then broadcast shutdown.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
    let _ = shutdown_tx.send(true);
}
