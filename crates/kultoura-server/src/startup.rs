//! Run the kiosk server on a background task.
//!
//! [`spawn_server`] binds eagerly, so a bad address or a port in use is
//! reported to the caller instead of inside the task, then serves on a
//! spawned Tokio task until [`ServerHandle::shutdown`] is called.
//!
//! # Usage
//!
//! ```rust,ignore
//! let handle = spawn_server(&config.server, state).await?;
//! tokio::signal::ctrl_c().await?;
//! handle.shutdown().await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use kultoura_core::config::ServerConfig;

use crate::server::{ServerError, bind, serve};
use crate::state::AppState;

/// Errors that can occur when spawning or stopping the server task.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or exited with an error.
    #[error("server error: {0}")]
    Server(#[from] ServerError),

    /// The server task panicked or was aborted.
    #[error("server task failed: {0}")]
    Join(String),
}

/// A running server task.
#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Result<(), ServerError>>,
}

impl ServerHandle {
    /// The address the server is bound to.
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL for HTTP clients, e.g. `http://127.0.0.1:8080`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop accepting connections, drain in-flight requests and wait for
    /// the task to finish.
    ///
    /// # Errors
    ///
    /// Returns the server's own error, or [`StartupError::Join`] if the
    /// task did not complete normally.
    pub async fn shutdown(self) -> Result<(), StartupError> {
        let _ = self.shutdown.send(true);
        self.task
            .await
            .map_err(|e| StartupError::Join(e.to_string()))??;
        Ok(())
    }
}

/// Bind `config` and serve the kiosk API on a background task.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the listener cannot bind.
pub async fn spawn_server(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<ServerHandle, StartupError> {
    let listener = bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let (shutdown, mut rx) = watch::channel(false);
    let task = tokio::spawn(serve(listener, state, async move {
        let _ = rx.wait_for(|stop| *stop).await;
    }));

    tracing::info!(%addr, "Kiosk server spawned on background task");
    Ok(ServerHandle {
        addr,
        shutdown,
        task,
    })
}
