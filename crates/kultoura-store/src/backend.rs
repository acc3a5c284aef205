//! Runtime-selected backends.
//!
//! Async trait methods are not dyn-compatible, so the kiosk picks its store
//! and sink through enum dispatch instead of trait objects.

use kultoura_scoring::{LogScoreSink, SaveError, ScoreSink};
use kultoura_types::{EventId, EventState, ScoreSubmission, TeamId};

use crate::{
    EventStateStore, HttpScoreSink, HttpStateStore, JsonFileStore, MemoryStore, PostgresStore,
    ScoreArchive, StoreError,
};

// ---------------------------------------------------------------------------
// State store
// ---------------------------------------------------------------------------

/// The state store a kiosk runs with.
#[derive(Debug)]
pub enum StateBackend {
    /// Process memory.
    Memory(MemoryStore),
    /// A JSON file on disk.
    JsonFile(JsonFileStore),
    /// The `event_activation` table.
    Postgres(PostgresStore),
    /// A remote kiosk host.
    Http(HttpStateStore),
}

impl EventStateStore for StateBackend {
    async fn snapshot(&self) -> Result<EventState, StoreError> {
        match self {
            Self::Memory(store) => store.snapshot().await,
            Self::JsonFile(store) => store.snapshot().await,
            Self::Postgres(store) => store.snapshot().await,
            Self::Http(store) => store.snapshot().await,
        }
    }

    async fn set_event_active(&self, event_id: &EventId, active: bool) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.set_event_active(event_id, active).await,
            Self::JsonFile(store) => store.set_event_active(event_id, active).await,
            Self::Postgres(store) => store.set_event_active(event_id, active).await,
            Self::Http(store) => store.set_event_active(event_id, active).await,
        }
    }

    async fn set_current_team(
        &self,
        event_id: &EventId,
        team_id: Option<&TeamId>,
    ) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.set_current_team(event_id, team_id).await,
            Self::JsonFile(store) => store.set_current_team(event_id, team_id).await,
            Self::Postgres(store) => store.set_current_team(event_id, team_id).await,
            Self::Http(store) => store.set_current_team(event_id, team_id).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Memory(store) => store.name(),
            Self::JsonFile(store) => store.name(),
            Self::Postgres(store) => store.name(),
            Self::Http(store) => store.name(),
        }
    }
}

// ---------------------------------------------------------------------------
// Score sink
// ---------------------------------------------------------------------------

/// The score sink a kiosk runs with.
#[derive(Debug)]
pub enum ScoreBackend {
    /// Log only.
    Log(LogScoreSink),
    /// The `score_submissions` table.
    Postgres(ScoreArchive),
    /// A remote kiosk host.
    Http(HttpScoreSink),
}

impl ScoreSink for ScoreBackend {
    async fn submit(&self, submission: &ScoreSubmission) -> Result<(), SaveError> {
        match self {
            Self::Log(sink) => sink.submit(submission).await,
            Self::Postgres(sink) => sink.submit(submission).await,
            Self::Http(sink) => sink.submit(submission).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Log(sink) => sink.name(),
            Self::Postgres(sink) => sink.name(),
            Self::Http(sink) => sink.name(),
        }
    }
}
