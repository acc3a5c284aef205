//! The event-selection view: which events a judge may open.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use kultoura_store::{EventStateStore, StoreError};
use kultoura_types::{EventId, EventState};

/// Result of one selector poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorOutcome {
    /// Whether the active set differs from the previous poll.
    pub changed: bool,
    /// Open this event straight away.
    pub navigate_to: Option<EventId>,
}

/// Tracks the active-event set for the selection view.
#[derive(Debug, Clone)]
pub struct EventSelector {
    known: Option<BTreeSet<EventId>>,
    active: BTreeSet<EventId>,
    auto_navigate: bool,
    loaded: bool,
    last_updated: Option<DateTime<Utc>>,
}

impl EventSelector {
    /// A selector that auto-navigates when exactly one event is active.
    pub const fn new() -> Self {
        Self {
            known: None,
            active: BTreeSet::new(),
            auto_navigate: true,
            loaded: false,
            last_updated: None,
        }
    }

    /// Only consider these events; active ids outside the set are ignored.
    #[must_use]
    pub fn with_known_events(mut self, known: impl IntoIterator<Item = EventId>) -> Self {
        self.known = Some(known.into_iter().collect());
        self
    }

    /// Enable or disable auto-navigation.
    #[must_use]
    pub const fn with_auto_navigate(mut self, auto_navigate: bool) -> Self {
        self.auto_navigate = auto_navigate;
        self
    }

    /// Turn auto-navigation on or off at runtime.
    pub const fn set_auto_navigate(&mut self, auto_navigate: bool) {
        self.auto_navigate = auto_navigate;
    }

    /// The active events as of the last successful poll.
    pub const fn active_events(&self) -> &BTreeSet<EventId> {
        &self.active
    }

    /// Whether at least one poll has succeeded.
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// When the active set last changed.
    pub const fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Reconcile with a freshly read active set.
    ///
    /// Auto-navigation fires only on a change that leaves exactly one
    /// event active.
    pub fn apply(&mut self, active: BTreeSet<EventId>) -> SelectorOutcome {
        let active: BTreeSet<EventId> = match &self.known {
            Some(known) => active.into_iter().filter(|id| known.contains(id)).collect(),
            None => active,
        };

        let changed = !self.loaded || active != self.active;
        self.loaded = true;
        if !changed {
            return SelectorOutcome::default();
        }

        self.active = active;
        self.last_updated = Some(Utc::now());
        debug!(active = self.active.len(), "Active events changed");

        let mut outcome = SelectorOutcome {
            changed: true,
            navigate_to: None,
        };
        if self.auto_navigate && self.active.len() == 1 {
            outcome.navigate_to = self.active.first().cloned();
            if let Some(only) = &outcome.navigate_to {
                info!(event_id = %only, "Only one event active, opening it");
            }
        }
        outcome
    }

    /// Read the active set from `store` and reconcile with it.
    ///
    /// An unreachable remote store leaves the selector untouched; any other
    /// read fault reads as no active events.
    pub async fn poll<S: EventStateStore>(&mut self, store: &S) -> SelectorOutcome {
        let snapshot = store.snapshot().await;
        self.apply_snapshot(snapshot)
    }

    /// Reconcile with the result of a snapshot read.
    pub fn apply_snapshot(&mut self, snapshot: Result<EventState, StoreError>) -> SelectorOutcome {
        match snapshot {
            Ok(state) => self.apply(state.active_events),
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Store unreachable, keeping active events");
                SelectorOutcome::default()
            }
            Err(e) => {
                warn!(error = %e, "Active event read failed, treating as none active");
                self.apply(BTreeSet::new())
            }
        }
    }
}

impl Default for EventSelector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<EventId> {
        ids.iter().map(|id| EventId::from(*id)).collect()
    }

    #[test]
    fn single_active_event_auto_navigates_once() {
        let mut selector = EventSelector::new();
        let outcome = selector.apply(set(&["mini-museum"]));
        assert!(outcome.changed);
        assert_eq!(outcome.navigate_to, Some(EventId::from("mini-museum")));

        // No change, no second navigation.
        let outcome = selector.apply(set(&["mini-museum"]));
        assert_eq!(outcome, SelectorOutcome::default());
    }

    #[test]
    fn several_active_events_do_not_navigate() {
        let mut selector = EventSelector::new();
        let outcome = selector.apply(set(&["mini-museum", "festival-dance"]));
        assert!(outcome.changed);
        assert!(outcome.navigate_to.is_none());
    }

    #[test]
    fn first_empty_poll_counts_as_loaded() {
        let mut selector = EventSelector::new();
        assert!(!selector.is_loaded());
        let outcome = selector.apply(BTreeSet::new());
        assert!(outcome.changed);
        assert!(selector.is_loaded());
        assert!(selector.active_events().is_empty());
    }

    #[test]
    fn auto_navigate_can_be_disabled() {
        let mut selector = EventSelector::new().with_auto_navigate(false);
        let outcome = selector.apply(set(&["festival-dance"]));
        assert!(outcome.navigate_to.is_none());

        selector.set_auto_navigate(true);
        let outcome = selector.apply(set(&["mini-museum"]));
        assert_eq!(outcome.navigate_to, Some(EventId::from("mini-museum")));
    }

    #[test]
    fn read_faults_empty_the_list_but_outages_do_not() {
        let mut selector = EventSelector::new().with_auto_navigate(false);
        selector.apply(set(&["festival-dance", "mini-museum"]));

        let outcome =
            selector.apply_snapshot(Err(StoreError::Remote(String::from("connection refused"))));
        assert!(!outcome.changed);
        assert_eq!(selector.active_events().len(), 2);

        let corrupt = serde_json::from_str::<EventState>("[").unwrap_err();
        let outcome = selector.apply_snapshot(Err(StoreError::Serialization(corrupt)));
        assert!(outcome.changed);
        assert!(selector.active_events().is_empty());
    }

    #[test]
    fn unknown_events_are_ignored() {
        let mut selector =
            EventSelector::new().with_known_events([EventId::from("festival-dance")]);
        let outcome = selector.apply(set(&["festival-dance", "karaoke"]));
        assert_eq!(outcome.navigate_to, Some(EventId::from("festival-dance")));
        assert_eq!(selector.active_events().len(), 1);
    }
}
