//! Shared application state for the kiosk API server.
//!
//! [`AppState`] owns the state store, the score sink and the catalog the
//! handlers serve, plus the broadcast channel that pushes
//! [`StateNotice`]s to `WebSocket` subscribers after every admin write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use kultoura_core::admin::AdminConsole;
use kultoura_core::catalog::EventCatalog;
use kultoura_store::{ScoreBackend, StateBackend};
use kultoura_types::EventOverview;

/// Default capacity of the state notice channel.
///
/// A subscriber that falls further behind receives
/// [`broadcast::error::RecvError::Lagged`] and skips ahead.
pub const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Pushed to `WebSocket` clients after an admin write.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StateNotice {
    /// The event's status after the write.
    pub event: EventOverview,
    /// When the write was applied.
    pub changed_at: DateTime<Utc>,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
pub struct AppState {
    /// The shared activation record.
    pub store: Arc<StateBackend>,
    /// Where submitted score sheets go.
    pub sink: ScoreBackend,
    /// The event catalog.
    pub catalog: Arc<EventCatalog>,
    /// Catalog-checked admin operations over `store`.
    pub admin: AdminConsole<StateBackend>,
    /// Broadcast sender for state notices.
    pub tx: broadcast::Sender<StateNotice>,
}

impl AppState {
    /// Create the application state with the default channel capacity.
    pub fn new(store: StateBackend, sink: ScoreBackend, catalog: EventCatalog) -> Self {
        Self::with_capacity(store, sink, catalog, DEFAULT_BROADCAST_CAPACITY)
    }

    /// Create the application state with a custom channel capacity.
    pub fn with_capacity(
        store: StateBackend,
        sink: ScoreBackend,
        catalog: EventCatalog,
        capacity: usize,
    ) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        let store = Arc::new(store);
        let catalog = Arc::new(catalog);
        let admin = AdminConsole::new(Arc::clone(&store), Arc::clone(&catalog));
        Self {
            store,
            sink,
            catalog,
            admin,
            tx,
        }
    }

    /// Subscribe to state notices.
    pub fn subscribe(&self) -> broadcast::Receiver<StateNotice> {
        self.tx.subscribe()
    }

    /// Publish the new status of an event to all connected clients.
    ///
    /// Returns the number of receivers reached; 0 when nobody listens.
    pub fn broadcast(&self, event: &EventOverview) -> usize {
        let notice = StateNotice {
            event: event.clone(),
            changed_at: Utc::now(),
        };
        self.tx.send(notice).unwrap_or(0)
    }
}
