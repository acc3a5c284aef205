//! Headless judge station.
//!
//! Runs when the kiosk is pointed at another kiosk's store. The station
//! moves between event selection and scoring exactly like a judge tablet
//! does and logs every view it would show, which makes it a cheap way to
//! watch what judges see from another machine.

use std::collections::BTreeSet;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tracing::{info, warn};

use kultoura_core::catalog::EventCatalog;
use kultoura_core::config::KioskConfig;
use kultoura_core::judge::{JudgeSession, JudgeView};
use kultoura_core::poller::{
    JudgeExit, SelectorExit, ViewCallback, run_judge_loop, run_selector_loop,
};
use kultoura_core::selector::EventSelector;
use kultoura_scoring::ScoringEngine;
use kultoura_store::EventStateStore;
use kultoura_types::EventId;

/// Logs what a judge would be looking at.
#[derive(Debug, Default)]
pub struct LogViewCallback {
    views: u64,
}

impl ViewCallback for LogViewCallback {
    fn on_view(&mut self, event_id: &EventId, view: &JudgeView) {
        self.views = self.views.saturating_add(1);
        match view {
            JudgeView::Loading => {}
            JudgeView::EventInactive => info!(event_id = %event_id, "Event inactive"),
            JudgeView::WaitingForTeam => {
                info!(event_id = %event_id, "Waiting for team selection");
            }
            JudgeView::Scoring { index, team_id } => {
                info!(event_id = %event_id, index, team_id = %team_id, "Scoring team");
            }
        }
    }

    fn on_active_events(&mut self, active: &BTreeSet<EventId>) {
        let ids: Vec<&str> = active.iter().map(EventId::as_str).collect();
        info!(active = ?ids, "Active events");
    }
}

/// Polling settings for one station.
#[derive(Debug, Clone)]
pub struct StationSettings {
    /// Judge poll period.
    pub judge_interval: Duration,
    /// Event selection poll period.
    pub selector_interval: Duration,
    /// Follow the only other active event.
    pub auto_follow: bool,
    /// Open the only active event straight away.
    pub auto_navigate: bool,
    /// How long "saved" is shown.
    pub saved_display: Duration,
    /// Station label attached to submissions.
    pub station: Option<String>,
}

impl StationSettings {
    /// Take the station settings from the kiosk config.
    pub fn from_config(config: &KioskConfig) -> Self {
        Self {
            judge_interval: config.polling.judge_interval(),
            selector_interval: config.polling.selector_interval(),
            auto_follow: config.polling.auto_follow,
            auto_navigate: config.polling.auto_navigate,
            saved_display: Duration::from_millis(config.scoring.saved_display_ms),
            station: config.scoring.station.clone(),
        }
    }

    fn session(&self, catalog: &EventCatalog, event_id: &EventId) -> Option<JudgeSession> {
        let event = catalog.get(event_id.as_str())?.clone();
        let mut engine = ScoringEngine::new(event).with_saved_display(self.saved_display);
        if let Some(station) = &self.station {
            engine = engine.with_station(station.clone());
        }
        // No back button on a station: an inactive event sends it back to
        // selection.
        Some(
            JudgeSession::with_engine(engine)
                .with_auto_follow(self.auto_follow)
                .with_leave_when_inactive(true),
        )
    }
}

/// Alternate between event selection and scoring until shutdown.
pub async fn run_station<S: EventStateStore>(
    store: &S,
    catalog: &EventCatalog,
    settings: &StationSettings,
    callback: &mut dyn ViewCallback,
    shutdown: watch::Receiver<bool>,
) {
    let known: Vec<EventId> = catalog.events().iter().map(|e| e.id.clone()).collect();

    loop {
        // A fresh selector per visit: returning to selection with a single
        // active event opens it again.
        let mut selector = EventSelector::new()
            .with_known_events(known.iter().cloned())
            .with_auto_navigate(settings.auto_navigate);
        let exit = run_selector_loop(
            &mut selector,
            store,
            settings.selector_interval,
            callback,
            shutdown.clone(),
        )
        .await;

        let mut next = match exit {
            SelectorExit::Shutdown => return,
            SelectorExit::OpenEvent(event_id) => Some(event_id),
        };

        while let Some(event_id) = next.take() {
            let Some(session) = settings.session(catalog, &event_id) else {
                warn!(event_id = %event_id, "Event not in catalog, back to selection");
                break;
            };
            let session = Mutex::new(session);
            match run_judge_loop(
                &session,
                store,
                settings.judge_interval,
                callback,
                shutdown.clone(),
            )
            .await
            {
                JudgeExit::Shutdown => return,
                JudgeExit::LeaveEvent => info!(event_id = %event_id, "Back to event selection"),
                JudgeExit::FollowEvent(other) => next = Some(other),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;

    use kultoura_store::{MemoryStore, StoreError};
    use kultoura_types::{EventState, TeamId};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        views: Vec<(EventId, JudgeView)>,
        active_sets: Vec<BTreeSet<EventId>>,
    }

    impl ViewCallback for Recorder {
        fn on_view(&mut self, event_id: &EventId, view: &JudgeView) {
            self.views.push((event_id.clone(), view.clone()));
        }

        fn on_active_events(&mut self, active: &BTreeSet<EventId>) {
            self.active_sets.push(active.clone());
        }
    }

    /// Serves queued snapshots in order, then repeats the last one.
    struct Scripted {
        states: std::sync::Mutex<VecDeque<EventState>>,
    }

    impl Scripted {
        fn new(active: &[&[&str]]) -> Self {
            let states = active
                .iter()
                .map(|ids| {
                    let mut state = EventState::default();
                    for id in *ids {
                        state.activate(&EventId::from(*id));
                    }
                    state
                })
                .collect();
            Self {
                states: std::sync::Mutex::new(states),
            }
        }
    }

    impl EventStateStore for Scripted {
        async fn snapshot(&self) -> Result<EventState, StoreError> {
            let mut states = self.states.lock().unwrap();
            if states.len() > 1 {
                Ok(states.pop_front().unwrap())
            } else {
                Ok(states.front().cloned().unwrap_or_default())
            }
        }

        async fn set_event_active(&self, _: &EventId, _: bool) -> Result<(), StoreError> {
            Ok(())
        }

        async fn set_current_team(&self, _: &EventId, _: Option<&TeamId>) -> Result<(), StoreError> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn settings() -> StationSettings {
        StationSettings::from_config(&KioskConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn station_opens_single_event_and_returns_on_deactivation() {
        let store = MemoryStore::new();
        let catalog = EventCatalog::builtin();
        let festival = EventId::from("festival-dance");
        store.set_event_active(&festival, true).await.unwrap();
        store
            .set_current_team(&festival, Some(&TeamId::from("team3")))
            .await
            .unwrap();

        let (stop_tx, stop_rx) = watch::channel(false);
        let mut recorder = Recorder::default();
        let driver = async {
            tokio::time::sleep(Duration::from_secs(4)).await;
            store.set_event_active(&festival, false).await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            stop_tx.send(true).unwrap();
        };
        let settings = settings();
        tokio::join!(
            run_station(&store, &catalog, &settings, &mut recorder, stop_rx),
            driver
        );

        let views: Vec<&JudgeView> = recorder.views.iter().map(|(_, view)| view).collect();
        assert_eq!(
            views,
            [
                &JudgeView::Scoring {
                    index: 2,
                    team_id: TeamId::from("team3")
                },
                &JudgeView::EventInactive,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn station_returns_to_selection_when_opened_event_is_already_gone() {
        // Festival Dance is deactivated between selection and the first
        // judge poll, while two other events are active.
        let store = Scripted::new(&[
            &["festival-dance"],
            &["mini-museum", "speech-choir"],
        ]);
        let catalog = EventCatalog::builtin();
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut recorder = Recorder::default();

        let driver = async {
            tokio::time::sleep(Duration::from_secs(12)).await;
            stop_tx.send(true).unwrap();
        };
        let settings = settings();
        tokio::join!(
            run_station(&store, &catalog, &settings, &mut recorder, stop_rx),
            driver
        );

        assert_eq!(
            recorder.views,
            [(EventId::from("festival-dance"), JudgeView::EventInactive)]
        );
        // Back in selection, the two remaining events are listed.
        assert_eq!(recorder.active_sets.len(), 2);
        assert_eq!(
            recorder.active_sets.last().map(BTreeSet::len),
            Some(2)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn station_stops_while_selecting() {
        let store = MemoryStore::new();
        let catalog = EventCatalog::builtin();
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut callback = LogViewCallback::default();

        let driver = async {
            tokio::time::sleep(Duration::from_secs(12)).await;
            stop_tx.send(true).unwrap();
        };
        let settings = settings();
        tokio::join!(
            run_station(&store, &catalog, &settings, &mut callback, stop_rx),
            driver
        );
        assert_eq!(callback.views, 0);
    }

    #[test]
    fn settings_follow_config() {
        let config = KioskConfig::parse(
            "polling:\n  judge_interval_ms: 1500\n  auto_follow: false\nscoring:\n  station: stage-left\n",
        )
        .unwrap();
        let settings = StationSettings::from_config(&config);
        assert_eq!(settings.judge_interval, Duration::from_millis(1500));
        assert_eq!(settings.selector_interval, Duration::from_secs(5));
        assert!(!settings.auto_follow);

        let session = settings
            .session(&EventCatalog::builtin(), &EventId::from("mini-museum"))
            .unwrap();
        assert_eq!(session.event_id().as_str(), "mini-museum");
        assert!(
            settings
                .session(&EventCatalog::builtin(), &EventId::from("karaoke"))
                .is_none()
        );
    }
}
