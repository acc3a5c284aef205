//! Axum router construction for the kiosk API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete router: REST endpoints under `/api`, the state
/// notice stream at `/ws/state`.
///
/// CORS allows any origin so judge tablets can load the presentation
/// layer from another host.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws/state", get(ws::ws_state))
        .route("/api/health", get(handlers::health))
        // Catalog
        .route("/api/catalog", get(handlers::get_catalog))
        .route("/api/catalog/{event_id}", get(handlers::get_catalog_event))
        // Judge reads
        .route("/api/state", get(handlers::get_state))
        .route("/api/events/active", get(handlers::active_events))
        .route("/api/events/{event_id}/active", get(handlers::event_active))
        .route(
            "/api/events/{event_id}/current-team",
            get(handlers::event_current_team),
        )
        .route("/api/events/{event_id}/scores", post(handlers::submit_scores))
        // Admin
        .route("/api/admin/overview", get(handlers::admin_overview))
        .route(
            "/api/admin/events/{event_id}/active",
            post(handlers::set_event_active),
        )
        .route(
            "/api/admin/events/{event_id}/toggle",
            post(handlers::toggle_event),
        )
        .route(
            "/api/admin/events/{event_id}/current-team",
            post(handlers::set_current_team),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
