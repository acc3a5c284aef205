//! REST API endpoint handlers for the kiosk server.
//!
//! Reads go through the fail-open store reads, so a damaged state file
//! shows up as "nothing active" rather than as an error. Admin writes go
//! through the [`AdminConsole`](kultoura_core::admin::AdminConsole) and
//! are broadcast to `WebSocket` subscribers once they succeed.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/health` | Liveness and backend names |
//! | `GET` | `/api/catalog` | Full event catalog |
//! | `GET` | `/api/catalog/{event_id}` | One event definition |
//! | `GET` | `/api/state` | The whole activation record |
//! | `GET` | `/api/events/active` | Active event ids |
//! | `GET` | `/api/events/{event_id}/active` | Whether one event is active |
//! | `GET` | `/api/events/{event_id}/current-team` | Current team of one event |
//! | `POST` | `/api/events/{event_id}/scores` | Submit a score sheet |
//! | `GET` | `/api/admin/overview` | Status of every event |
//! | `POST` | `/api/admin/events/{event_id}/active` | Activate or deactivate |
//! | `POST` | `/api/admin/events/{event_id}/toggle` | Flip activation |
//! | `POST` | `/api/admin/events/{event_id}/current-team` | Set or clear the current team |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{info, warn};

use kultoura_scoring::{ScoreSink, ScoringEngine};
use kultoura_store::EventStateStore;
use kultoura_types::{EventDefinition, EventOverview, ScoreSubmission};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Request body for `POST /api/admin/events/{event_id}/active`.
#[derive(Debug, serde::Deserialize)]
pub struct SetActiveRequest {
    /// Whether judges may see the event.
    pub active: bool,
}

/// Request body for `POST /api/admin/events/{event_id}/current-team`.
#[derive(Debug, serde::Deserialize)]
pub struct SetCurrentTeamRequest {
    /// The team to score next; `null` or `""` clears the selection.
    pub team_id: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Report liveness and which backends the kiosk runs with.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "store": state.store.name(),
        "sink": state.sink.name(),
        "events": state.catalog.len(),
    }))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// List every event definition in catalog order.
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let events = state.catalog.events();
    Json(serde_json::json!({
        "count": events.len(),
        "events": events,
    }))
}

/// Return one event definition.
pub async fn get_catalog_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<Json<EventDefinition>, ApiError> {
    state
        .catalog
        .get(&event_id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound(event_id))
}

// ---------------------------------------------------------------------------
// Judge-side reads
// ---------------------------------------------------------------------------

/// Return the whole activation record, empty if it cannot be read.
pub async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.state_or_default().await)
}

/// List the active event ids.
pub async fn active_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let active = state.store.active_events().await;
    Json(serde_json::json!({ "active_events": active }))
}

/// Report whether one event is active.
pub async fn event_active(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    known_event(&state, &event_id)?;
    let active = state.store.is_event_active(&event_id).await;
    Ok(Json(serde_json::json!({
        "event_id": event_id,
        "active": active,
    })))
}

/// Report the current team of one event, `null` when none is selected.
pub async fn event_current_team(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    known_event(&state, &event_id)?;
    let team_id = state.store.event_current_team(&event_id).await;
    Ok(Json(serde_json::json!({
        "event_id": event_id,
        "team_id": team_id,
    })))
}

// ---------------------------------------------------------------------------
// POST /api/events/{event_id}/scores
// ---------------------------------------------------------------------------

/// Validate a submitted sheet against the catalog and hand it to the sink.
///
/// Every score is replayed through a [`ScoringEngine`], so unknown teams,
/// unknown criteria and out-of-range values are rejected with 400. Totals
/// and the scoring mode are recomputed on the server.
pub async fn submit_scores(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
    payload: Result<Json<ScoreSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(mut submission) = payload?;
    let event = known_event(&state, &event_id)?;
    if submission.event_id.as_str() != event_id {
        return Err(ApiError::BadRequest(format!(
            "submission is for {}, not {event_id}",
            submission.event_id
        )));
    }

    let mut engine = ScoringEngine::new(event.clone());
    for (team_id, scores) in &submission.sheet.0 {
        for (criterion_id, value) in scores {
            engine.set_score(team_id.as_str(), criterion_id.as_str(), *value)?;
        }
    }
    submission.scoring_mode = event.scoring_mode;
    submission.totals = engine.totals();

    if let Err(e) = state.sink.submit(&submission).await {
        warn!(event_id = %event_id, sink = state.sink.name(), error = %e, "Score submission failed");
        return Err(e.into());
    }

    info!(
        submission_id = %submission.id,
        event_id = %event_id,
        station = ?submission.station,
        "Score submission accepted"
    );
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "id": submission.id,
            "event_id": event_id,
            "totals": submission.totals,
        })),
    ))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// Status of every catalog event.
pub async fn admin_overview(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let events = state.admin.overview().await;
    Json(serde_json::json!({
        "count": events.len(),
        "events": events,
    }))
}

/// Activate or deactivate an event.
pub async fn set_event_active(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
    payload: Result<Json<SetActiveRequest>, JsonRejection>,
) -> Result<Json<EventOverview>, ApiError> {
    let Json(request) = payload?;
    let overview = state.admin.set_event_active(&event_id, request.active).await?;
    state.broadcast(&overview);
    Ok(Json(overview))
}

/// Flip an event's activation.
pub async fn toggle_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<Json<EventOverview>, ApiError> {
    let overview = state.admin.toggle_event(&event_id).await?;
    state.broadcast(&overview);
    Ok(Json(overview))
}

/// Set or clear an event's current team.
pub async fn set_current_team(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
    payload: Result<Json<SetCurrentTeamRequest>, JsonRejection>,
) -> Result<Json<EventOverview>, ApiError> {
    let Json(request) = payload?;
    let overview = match request.team_id.as_deref() {
        Some(team_id) if !team_id.is_empty() => {
            state.admin.set_current_team(&event_id, team_id).await?
        }
        _ => state.admin.clear_current_team(&event_id).await?,
    };
    state.broadcast(&overview);
    Ok(Json(overview))
}

fn known_event<'a>(state: &'a AppState, event_id: &str) -> Result<&'a EventDefinition, ApiError> {
    state
        .catalog
        .get(event_id)
        .ok_or_else(|| ApiError::NotFound(event_id.to_owned()))
}
