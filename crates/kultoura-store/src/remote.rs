//! HTTP adapters for judge stations that talk to a remote kiosk host.
//!
//! [`HttpStateStore`] implements [`EventStateStore`] against the kiosk's
//! `/api` surface and [`HttpScoreSink`] forwards saved sheets to it, so a
//! station on another machine runs the same reconciliation and save code
//! as one embedded in the kiosk.

use std::time::Duration;

use serde::de::DeserializeOwned;

use kultoura_scoring::{SaveError, ScoreSink};
use kultoura_types::{EventId, EventState, ScoreSubmission, TeamId};

use crate::{EventStateStore, StoreError};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2500;

// ---------------------------------------------------------------------------
// Shared client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct KioskClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl KioskClient {
    fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let response = self
            .client
            .get(self.url(path))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| format!("GET {path} failed: {e}"))?;

        let response = check_status(path, response).await?;
        response
            .json()
            .await
            .map_err(|e| format!("GET {path} response parse failed: {e}"))
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<(), String> {
        let response = self
            .client
            .post(self.url(path))
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("POST {path} failed: {e}"))?;

        check_status(path, response).await.map(|_| ())
    }
}

async fn check_status(path: &str, response: reqwest::Response) -> Result<reqwest::Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_owned());
    Err(format!("{path} returned {status}: {error_body}"))
}

// ---------------------------------------------------------------------------
// State store
// ---------------------------------------------------------------------------

/// An [`EventStateStore`] that reads and writes through a kiosk host.
#[derive(Debug, Clone)]
pub struct HttpStateStore {
    client: KioskClient,
}

impl HttpStateStore {
    /// Create a store for the kiosk at `base_url` (e.g. `http://kiosk:8080`).
    pub fn new(base_url: &str) -> Self {
        Self {
            client: KioskClient::new(base_url),
        }
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client.timeout = timeout;
        self
    }
}

impl EventStateStore for HttpStateStore {
    async fn snapshot(&self) -> Result<EventState, StoreError> {
        self.client
            .get("/api/state")
            .await
            .map_err(StoreError::Remote)
    }

    async fn set_event_active(&self, event_id: &EventId, active: bool) -> Result<(), StoreError> {
        let path = format!("/api/admin/events/{event_id}/active");
        self.client
            .post(&path, &serde_json::json!({ "active": active }))
            .await
            .map_err(StoreError::Remote)
    }

    async fn set_current_team(
        &self,
        event_id: &EventId,
        team_id: Option<&TeamId>,
    ) -> Result<(), StoreError> {
        let path = format!("/api/admin/events/{event_id}/current-team");
        self.client
            .post(&path, &serde_json::json!({ "team_id": team_id }))
            .await
            .map_err(StoreError::Remote)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

// ---------------------------------------------------------------------------
// Score sink
// ---------------------------------------------------------------------------

/// A [`ScoreSink`] that posts submissions to a kiosk host.
#[derive(Debug, Clone)]
pub struct HttpScoreSink {
    client: KioskClient,
}

impl HttpScoreSink {
    /// Create a sink for the kiosk at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: KioskClient::new(base_url),
        }
    }
}

impl ScoreSink for HttpScoreSink {
    async fn submit(&self, submission: &ScoreSubmission) -> Result<(), SaveError> {
        let body =
            serde_json::to_value(submission).map_err(|e| SaveError::Encoding(e.to_string()))?;
        let path = format!("/api/events/{}/scores", submission.event_id);
        self.client
            .post(&path, &body)
            .await
            .map_err(SaveError::Backend)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
