//! Kiosk HTTP server lifecycle management.
//!
//! [`start_server`] binds the configured address and serves until the
//! shutdown future resolves. [`bind`] and [`serve`] are split out so a
//! caller can learn the bound address (port `0` in tests) before serving.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use kultoura_core::config::ServerConfig;

use crate::router::build_router;
use crate::state::AppState;

/// Start the kiosk HTTP server.
///
/// # Errors
///
/// Returns an error if the address is invalid, the listener cannot bind
/// or the server hits a fatal I/O error.
pub async fn start_server<F>(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind(config).await?;
    serve(listener, state, shutdown).await
}

/// Bind a listener on the configured host and port.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address does not parse or is
/// already in use.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))?;

    TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))
}

/// Serve the kiosk router on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] on a fatal I/O error.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;
    let router = build_router(state);

    info!(%addr, "Kiosk server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!(%addr, "Kiosk server stopped");
    Ok(())
}

/// Errors that can occur when starting or running the kiosk server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
