//! Kiosk binary for the Kultoura festival scoring kiosk.
//!
//! Wires configuration, the event catalog, the state store, the score
//! sink and the HTTP API together, then serves until `Ctrl-C`.
//!
//! With `storage.backend: http` the process is a judge station for a kiosk
//! running elsewhere: instead of serving, it polls that kiosk and logs the
//! views a judge tablet would show.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `kultoura-config.yaml` (or `KULTOURA_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build and validate the event catalog
//! 4. Open the state store and score sink
//! 5. Start the API server, or the station loop
//! 6. Wait for `Ctrl-C` and shut down cleanly

mod backends;
mod error;
mod station;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kultoura_core::config::{KioskConfig, LogFormat, LoggingConfig, StorageBackendKind};
use kultoura_scoring::ScoreSink;
use kultoura_server::{AppState, spawn_server};
use kultoura_store::EventStateStore;

use crate::backends::build_backends;
use crate::error::KioskError;
use crate::station::{LogViewCallback, StationSettings, run_station};

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "kultoura-config.yaml";

/// Application entry point for the kiosk.
///
/// # Errors
///
/// Returns an error if any startup step fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let (config, config_path) = load_config().context("loading configuration")?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging)?;
    info!(
        config = %config_path.display(),
        backend = ?config.storage.backend,
        sink = ?config.scores.sink,
        "kultoura-kiosk starting"
    );

    // 3. Build the catalog.
    let catalog = config.catalog().map_err(KioskError::from)?;
    info!(events = catalog.len(), "Event catalog loaded");

    // 4. Open the store and sink.
    let backends = build_backends(&config)
        .await
        .context("opening storage backends")?;
    info!(
        store = backends.store.name(),
        sink = backends.sink.name(),
        "Storage backends ready"
    );

    // 5. Serve, or run as a remote station.
    if config.storage.backend == StorageBackendKind::Http {
        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::spawn(async move {
            wait_for_ctrl_c().await;
            let _ = stop_tx.send(true);
        });

        info!(remote = %config.storage.remote_url, "Running as judge station");
        let settings = StationSettings::from_config(&config);
        let mut callback = LogViewCallback::default();
        run_station(&backends.store, &catalog, &settings, &mut callback, stop_rx).await;
    } else {
        let pool = backends.pool.clone();
        let state = Arc::new(AppState::with_capacity(
            backends.store,
            backends.sink,
            catalog,
            config.server.broadcast_capacity,
        ));
        let server = spawn_server(&config.server, state)
            .await
            .map_err(KioskError::from)?;
        info!(addr = %server.local_addr(), "Kiosk API server started");

        // 6. Wait for shutdown.
        wait_for_ctrl_c().await;
        server.shutdown().await.map_err(KioskError::from)?;

        if let Some(pool) = pool {
            pool.close().await;
        }
    }

    info!("kultoura-kiosk shutdown complete");
    Ok(())
}

/// Load the kiosk configuration.
///
/// Reads `KULTOURA_CONFIG` if set, otherwise `kultoura-config.yaml` in the
/// working directory. A missing file means defaults plus env overrides.
fn load_config() -> Result<(KioskConfig, PathBuf), KioskError> {
    let path = std::env::var("KULTOURA_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        let config = KioskConfig::from_file(&path)?;
        Ok((config, path))
    } else {
        let mut config = KioskConfig::default();
        config.apply_env_overrides();
        Ok((config, path))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<(), KioskError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match logging.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| KioskError::Logging {
        message: e.to_string(),
    })
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
    }
}
