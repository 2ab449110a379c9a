//! Server configuration for the lease broker.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `LEASEBROKER_*` environment variables.

use std::net::SocketAddr;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Storage backend type.
    pub storage_backend: StorageBackendType,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Path to the resource catalog YAML, per §6.3's `RESOURCE_YAML_PATH`.
    pub resource_yaml_path: Option<String>,
    /// Expirer sweep period, in milliseconds.
    pub sweep_interval_ms: u64,
}

/// Supported storage backend types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (development only, data lost on restart).
    Memory,
    /// Postgres-backed, durable across restarts.
    Postgres { database_url: String },
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on (binds to `0.0.0.0`)
    /// - `LEASEBROKER_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:8300`)
    /// - `LEASEBROKER_STORAGE` — `memory` or `postgres` (default: `memory`)
    /// - `LEASEBROKER_DATABASE_URL` — Postgres connection string, required when storage is `postgres`
    /// - `LEASEBROKER_LOG_LEVEL` — log filter (default: `info`)
    /// - `RESOURCE_YAML_PATH` — path to the resource catalog
    /// - `LEASEBROKER_SWEEP_INTERVAL_MS` — expirer sweep period (default: `1000`, per §4.5)
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr = if let Ok(addr) = std::env::var("LEASEBROKER_BIND_ADDR") {
            addr.parse().unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8300)))
        } else if let Ok(port_str) = std::env::var("PORT") {
            let port: u16 = port_str.parse().unwrap_or(8300);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], 8300))
        };

        let storage_backend = match std::env::var("LEASEBROKER_STORAGE")
            .unwrap_or_else(|_| "memory".to_owned())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StorageBackendType::Postgres {
                database_url: std::env::var("LEASEBROKER_DATABASE_URL").unwrap_or_default(),
            },
            _ => StorageBackendType::Memory,
        };

        let log_level = std::env::var("LEASEBROKER_LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());

        let resource_yaml_path = std::env::var("RESOURCE_YAML_PATH").ok();

        let sweep_interval_ms =
            std::env::var("LEASEBROKER_SWEEP_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(
                leasebroker_core::expirer::DEFAULT_SWEEP_INTERVAL_MS,
            );

        Self { bind_addr, storage_backend, log_level, resource_yaml_path, sweep_interval_ms }
    }
}
