//! Kiosk API server for the Kultoura scoring kiosk.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Judge endpoints** for the polled reads (active events, one event's
//!   activation, one event's current team) and score submission
//! - **Admin endpoints** for activation and current-team control, checked
//!   against the event catalog
//! - **Catalog endpoints** serving the event definitions
//! - **`WebSocket` endpoint** (`/ws/state`) pushing a notice after every
//!   admin write via [`tokio::sync::broadcast`]
//!
//! # Architecture
//!
//! Handlers share one [`AppState`] holding the configured
//! [`StateBackend`](kultoura_store::StateBackend) and
//! [`ScoreBackend`](kultoura_store::ScoreBackend). A remote judge station
//! pointed at this server through `HttpStateStore` sees exactly what a
//! station embedded in the kiosk sees.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use startup::{ServerHandle, StartupError, spawn_server};
pub use state::{AppState, StateNotice};
