//! In-memory state store.

use tokio::sync::RwLock;

use kultoura_types::{EventId, EventState, TeamId};

use crate::{EventStateStore, StoreError};

/// An [`EventStateStore`] held entirely in process memory.
///
/// Used by tests and by kiosks that do not need the state to survive a
/// restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<EventState>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with `state`.
    pub fn with_state(state: EventState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

impl EventStateStore for MemoryStore {
    async fn snapshot(&self) -> Result<EventState, StoreError> {
        Ok(self.state.read().await.clone())
    }

    async fn set_event_active(&self, event_id: &EventId, active: bool) -> Result<(), StoreError> {
        self.state.write().await.set_active(event_id, active);
        Ok(())
    }

    async fn set_current_team(
        &self,
        event_id: &EventId,
        team_id: Option<&TeamId>,
    ) -> Result<(), StoreError> {
        self.state.write().await.set_current_team(event_id, team_id);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deactivation_clears_team() {
        let store = MemoryStore::new();
        let event = EventId::from("festival-dance");

        assert!(store.set_event_active(&event, true).await.is_ok());
        assert!(store.set_current_team(&event, Some(&TeamId::from("team2"))).await.is_ok());
        assert_eq!(
            store.event_current_team("festival-dance").await,
            Some(TeamId::from("team2"))
        );

        assert!(store.set_event_active(&event, false).await.is_ok());
        assert!(!store.is_event_active("festival-dance").await);
        assert_eq!(store.event_current_team("festival-dance").await, None);
    }
}
