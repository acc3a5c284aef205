//! The persisted activation record shared by every kiosk client.
//!
//! [`EventState`] is the single source of truth for which events judges
//! may see and which team each event is currently scoring. Its JSON form
//! is the on-disk layout of the state file:
//!
//! ```json
//! {
//!   "activeEvents": ["festival-dance"],
//!   "currentTeams": { "festival-dance": "team2", "mini-museum": "" }
//! }
//! ```
//!
//! An empty string in `currentTeams` means "no team selected", the same
//! as a missing entry.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{EventId, TeamId};

/// Activation flags and current-team pointers for all events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EventState {
    /// Events currently visible to judges. Order is irrelevant.
    #[serde(default)]
    pub active_events: BTreeSet<EventId>,
    /// Currently selected team per event (empty string = none).
    #[serde(default)]
    pub current_teams: BTreeMap<EventId, TeamId>,
}

impl EventState {
    /// Whether `event_id` is in the active set.
    pub fn is_active(&self, event_id: &str) -> bool {
        self.active_events.contains(event_id)
    }

    /// The team selected for `event_id`, ignoring the empty sentinel.
    pub fn current_team(&self, event_id: &str) -> Option<&TeamId> {
        self.current_teams
            .get(event_id)
            .filter(|team| !team.is_empty())
    }

    /// Add `event_id` to the active set.
    ///
    /// Idempotent. Returns `true` if the event was not active before.
    pub fn activate(&mut self, event_id: &EventId) -> bool {
        self.active_events.insert(event_id.clone())
    }

    /// Remove `event_id` from the active set and clear its current team.
    ///
    /// A selected team is replaced by the empty-string sentinel in the same
    /// mutation, so a deactivated event can never keep a stale pointer.
    /// Returns `true` if the event was active before.
    pub fn deactivate(&mut self, event_id: &EventId) -> bool {
        let was_active = self.active_events.remove(event_id);
        if self.current_team(event_id.as_str()).is_some() {
            self.current_teams
                .insert(event_id.clone(), TeamId::new(String::new()));
        }
        was_active
    }

    /// Apply an activation change.
    pub fn set_active(&mut self, event_id: &EventId, active: bool) {
        if active {
            self.activate(event_id);
        } else {
            self.deactivate(event_id);
        }
    }

    /// Overwrite the current team of `event_id`.
    ///
    /// `None` (or an empty id) clears the selection by writing the empty
    /// sentinel.
    pub fn set_current_team(&mut self, event_id: &EventId, team_id: Option<&TeamId>) {
        let team = team_id.cloned().unwrap_or_else(|| TeamId::new(String::new()));
        self.current_teams.insert(event_id.clone(), team);
    }
}

/// One row of the admin overview: an event and its live status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventOverview {
    /// The event.
    pub event_id: EventId,
    /// Display title from the catalog.
    pub title: String,
    /// Whether judges may see the event.
    pub active: bool,
    /// Current team, reported only while the event is active.
    pub current_team: Option<TeamId>,
    /// Display name of the current team.
    pub current_team_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_original_file_layout() {
        let json = r#"{
  "activeEvents": ["festival-dance", "festival-dance"],
  "currentTeams": { "festival-dance": "team2", "mini-museum": "" }
}"#;
        let state: EventState = serde_json::from_str(json).unwrap_or_default();
        assert_eq!(state.active_events.len(), 1);
        assert!(state.is_active("festival-dance"));
        assert_eq!(
            state.current_team("festival-dance").map(TeamId::as_str),
            Some("team2")
        );
        assert!(state.current_team("mini-museum").is_none());
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let state: Option<EventState> = serde_json::from_str("{}").ok();
        assert_eq!(state, Some(EventState::default()));
    }

    #[test]
    fn deactivate_clears_current_team() {
        let event = EventId::from("festival-dance");
        let mut state = EventState::default();
        state.activate(&event);
        state.set_current_team(&event, Some(&TeamId::from("team2")));

        assert!(state.deactivate(&event));
        assert!(!state.is_active("festival-dance"));
        assert!(state.current_team("festival-dance").is_none());
        assert_eq!(
            state.current_teams.get("festival-dance").map(TeamId::as_str),
            Some("")
        );
    }

    #[test]
    fn activate_is_idempotent() {
        let event = EventId::from("mini-museum");
        let mut state = EventState::default();
        assert!(state.activate(&event));
        assert!(!state.activate(&event));
        assert_eq!(state.active_events.len(), 1);
    }

    #[test]
    fn serializes_camel_case() {
        let mut state = EventState::default();
        state.activate(&EventId::from("speech-choir"));
        let json = serde_json::to_value(&state).unwrap_or_default();
        assert_eq!(json["activeEvents"][0], "speech-choir");
        assert!(json["currentTeams"].is_object());
    }
}
