//! Event state store and score sinks for the Kultoura scoring kiosk.
//!
//! The store persists one [`EventState`] record: which events judges may
//! see and which team each event is scoring. Every backend implements
//! [`EventStateStore`]; the kiosk picks one at startup through
//! [`StateBackend`].
//!
//! # Backends
//!
//! ```text
//! EventStateStore
//!     |-- MemoryStore      (RwLock, tests and ephemeral kiosks)
//!     |-- JsonFileStore    (data/admin-state.json)
//!     |-- PostgresStore    (event_activation table)
//!     +-- HttpStateStore   (remote kiosk host)
//!
//! ScoreSink (kultoura-scoring)
//!     |-- LogScoreSink     (log only)
//!     |-- ScoreArchive     (score_submissions table)
//!     +-- HttpScoreSink    (remote kiosk host)
//! ```
//!
//! # Failure Semantics
//!
//! [`EventStateStore::snapshot`] is the only fallible read. The derived
//! reads (`active_events`, `is_event_active`, `event_current_team`) are
//! fail-open: a read fault is logged and answered from an empty record.
//! Writes always surface their [`StoreError`].
//!
//! Deactivating an event clears its current team inside the same write in
//! every backend.

use std::collections::BTreeSet;
use std::future::Future;

use tracing::warn;

use kultoura_types::{EventId, EventState, TeamId};

pub mod archive;
pub mod backend;
pub mod error;
pub mod json_file;
pub mod memory;
pub mod postgres;
pub mod remote;

// Re-export primary types for convenience.
pub use archive::{ScoreArchive, SubmissionRow};
pub use backend::{ScoreBackend, StateBackend};
pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use postgres::{PostgresConfig, PostgresPool, PostgresStore};
pub use remote::{HttpScoreSink, HttpStateStore};

/// Persistence of the shared [`EventState`] record.
///
/// Implementors provide the full read and the two mutations; the
/// fail-open convenience reads are built on [`Self::snapshot`].
pub trait EventStateStore: Send + Sync {
    /// Read the whole record.
    fn snapshot(&self) -> impl Future<Output = Result<EventState, StoreError>> + Send;

    /// Add `event_id` to the active set, or remove it and clear its
    /// current team.
    fn set_event_active(
        &self,
        event_id: &EventId,
        active: bool,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite the current team of `event_id`. `None` clears it.
    fn set_current_team(
        &self,
        event_id: &EventId,
        team_id: Option<&TeamId>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Short backend name for logs and health checks.
    fn name(&self) -> &'static str;

    /// Read the whole record, degrading to an empty one on failure.
    fn state_or_default(&self) -> impl Future<Output = EventState> + Send {
        async move {
            match self.snapshot().await {
                Ok(state) => state,
                Err(e) => {
                    warn!(store = self.name(), error = %e, "Failed to read event state, using defaults");
                    EventState::default()
                }
            }
        }
    }

    /// The active event set.
    fn active_events(&self) -> impl Future<Output = BTreeSet<EventId>> + Send {
        async move { self.state_or_default().await.active_events }
    }

    /// Whether `event_id` is active.
    fn is_event_active(&self, event_id: &str) -> impl Future<Output = bool> + Send {
        async move { self.state_or_default().await.is_active(event_id) }
    }

    /// The current team of `event_id`, if one is selected.
    fn event_current_team(&self, event_id: &str) -> impl Future<Output = Option<TeamId>> + Send {
        async move {
            self.state_or_default()
                .await
                .current_team(event_id)
                .cloned()
        }
    }
}
