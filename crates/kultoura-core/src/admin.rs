//! Catalog-aware admin operations on top of a state store.
//!
//! The store accepts any ids; the admin console is where ids are checked
//! against the catalog before anything is written.

use std::sync::Arc;

use tracing::info;

use kultoura_store::{EventStateStore, StoreError};
use kultoura_types::{EventDefinition, EventOverview, EventState, TeamId};

use crate::catalog::EventCatalog;

/// Errors returned by admin operations.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// The event is not in the catalog.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// The team is not part of the event.
    #[error("unknown team {team_id} for event {event_id}")]
    UnknownTeam {
        /// The event.
        event_id: String,
        /// The rejected team id.
        team_id: String,
    },

    /// The store rejected the write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Admin control surface over a shared store and catalog.
#[derive(Debug)]
pub struct AdminConsole<S> {
    store: Arc<S>,
    catalog: Arc<EventCatalog>,
}

impl<S> Clone for AdminConsole<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<S: EventStateStore> AdminConsole<S> {
    /// Create a console for `store` and `catalog`.
    pub const fn new(store: Arc<S>, catalog: Arc<EventCatalog>) -> Self {
        Self { store, catalog }
    }

    /// The catalog the console validates against.
    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// Status of every catalog event, in catalog order.
    pub async fn overview(&self) -> Vec<EventOverview> {
        let state = self.store.state_or_default().await;
        self.catalog
            .events()
            .iter()
            .map(|event| overview_row(event, &state))
            .collect()
    }

    /// Status of one catalog event.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::UnknownEvent`] if the event is not in the
    /// catalog.
    pub async fn event_overview(&self, event_id: &str) -> Result<EventOverview, AdminError> {
        let event = self.event(event_id)?;
        let state = self.store.state_or_default().await;
        Ok(overview_row(event, &state))
    }

    /// Activate or deactivate an event. Deactivation clears its current
    /// team.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::UnknownEvent`] for ids outside the catalog and
    /// [`AdminError::Store`] if the write fails.
    pub async fn set_event_active(
        &self,
        event_id: &str,
        active: bool,
    ) -> Result<EventOverview, AdminError> {
        let event = self.event(event_id)?;
        self.store.set_event_active(&event.id, active).await?;
        info!(event_id = %event.id, active, "Event activation changed");
        self.event_overview(event_id).await
    }

    /// Flip an event's activation.
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_event_active`].
    pub async fn toggle_event(&self, event_id: &str) -> Result<EventOverview, AdminError> {
        let event = self.event(event_id)?;
        let active = self.store.is_event_active(event.id.as_str()).await;
        self.set_event_active(event_id, !active).await
    }

    /// Point an event at one of its teams.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::UnknownEvent`] or [`AdminError::UnknownTeam`]
    /// for ids outside the catalog and [`AdminError::Store`] if the write
    /// fails.
    pub async fn set_current_team(
        &self,
        event_id: &str,
        team_id: &str,
    ) -> Result<EventOverview, AdminError> {
        let event = self.event(event_id)?;
        let team = event.team(team_id).ok_or_else(|| AdminError::UnknownTeam {
            event_id: event_id.to_owned(),
            team_id: team_id.to_owned(),
        })?;

        self.store
            .set_current_team(&event.id, Some(&team.id))
            .await?;
        info!(event_id = %event.id, team_id = %team.id, "Current team changed");
        self.event_overview(event_id).await
    }

    /// Clear an event's current team.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::UnknownEvent`] for ids outside the catalog and
    /// [`AdminError::Store`] if the write fails.
    pub async fn clear_current_team(&self, event_id: &str) -> Result<EventOverview, AdminError> {
        let event = self.event(event_id)?;
        self.store.set_current_team(&event.id, None).await?;
        info!(event_id = %event.id, "Current team cleared");
        self.event_overview(event_id).await
    }

    fn event(&self, event_id: &str) -> Result<&EventDefinition, AdminError> {
        self.catalog
            .get(event_id)
            .ok_or_else(|| AdminError::UnknownEvent(event_id.to_owned()))
    }
}

fn overview_row(event: &EventDefinition, state: &EventState) -> EventOverview {
    let active = state.is_active(event.id.as_str());
    let current_team: Option<TeamId> = if active {
        state.current_team(event.id.as_str()).cloned()
    } else {
        None
    };
    let current_team_name = current_team
        .as_ref()
        .and_then(|id| event.team(id.as_str()))
        .map(|team| team.name.clone());

    EventOverview {
        event_id: event.id.clone(),
        title: event.title.clone(),
        active,
        current_team,
        current_team_name,
    }
}

#[cfg(test)]
mod tests {
    use kultoura_store::MemoryStore;

    use super::*;

    fn console() -> AdminConsole<MemoryStore> {
        AdminConsole::new(
            Arc::new(MemoryStore::new()),
            Arc::new(EventCatalog::builtin()),
        )
    }

    #[tokio::test]
    async fn overview_lists_catalog_in_order() {
        let admin = console();
        let rows = admin.overview().await;
        let ids: Vec<&str> = rows.iter().map(|r| r.event_id.as_str()).collect();
        assert_eq!(ids, ["festival-dance", "mini-museum"]);
        assert!(rows.iter().all(|r| !r.active && r.current_team.is_none()));
    }

    #[tokio::test]
    async fn toggle_flips_and_clears_team() {
        let admin = console();

        let row = admin.toggle_event("festival-dance").await;
        assert!(row.as_ref().is_ok_and(|r| r.active));

        let row = admin.set_current_team("festival-dance", "team2").await;
        assert_eq!(
            row.ok().and_then(|r| r.current_team_name),
            Some(String::from("Team Luzon"))
        );

        let row = admin.toggle_event("festival-dance").await;
        assert!(row.as_ref().is_ok_and(|r| !r.active && r.current_team.is_none()));

        // Reactivation does not bring the old team back.
        let row = admin.set_event_active("festival-dance", true).await;
        assert!(row.is_ok_and(|r| r.active && r.current_team.is_none()));
    }

    #[tokio::test]
    async fn unknown_ids_are_rejected_before_writing() {
        let admin = console();
        assert!(matches!(
            admin.toggle_event("karaoke").await,
            Err(AdminError::UnknownEvent(_))
        ));
        assert!(matches!(
            admin.set_current_team("mini-museum", "team1").await,
            Err(AdminError::UnknownTeam { .. })
        ));
        assert!(admin.store.snapshot().await.is_ok_and(|s| s == EventState::default()));
    }

    #[tokio::test]
    async fn team_of_inactive_event_is_hidden() {
        let admin = console();
        assert!(admin.set_current_team("mini-museum", "2C1").await.is_ok());

        let row = admin.event_overview("mini-museum").await;
        assert!(row.as_ref().is_ok_and(|r| r.current_team.is_none()));

        assert!(admin.set_event_active("mini-museum", true).await.is_ok());
        let row = admin.clear_current_team("mini-museum").await;
        assert!(row.is_ok_and(|r| r.active && r.current_team.is_none()));
    }
}
