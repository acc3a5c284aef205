//! Judge-side reconciliation of a scoring session with the admin state.
//!
//! A [`JudgeSession`] pairs a [`ScoringEngine`] with what the judge client
//! last believed about its event. Each poll hands it one [`EventState`]
//! snapshot and it derives, from that snapshot alone:
//!
//! 1. whether the event was just deactivated (leave the scoring view),
//! 2. whether the current team moved (move the engine's pointer),
//! 3. whether to follow the single other active event.
//!
//! A remote store that cannot be reached changes nothing. Any other read
//! fault is treated as an empty record, which de-scopes a judge scoring an
//! active event.
//!
//! While the admin has a team selected, the judge's own prev/next and team
//! picks are locked.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use kultoura_scoring::{ScoreSink, ScoringEngine, ScoringError};
use kultoura_store::{EventStateStore, StoreError};
use kultoura_types::{EventDefinition, EventId, EventState, TeamId};

/// What the judge client should be showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JudgeView {
    /// No poll has completed yet.
    Loading,
    /// The event is not active; scoring is unavailable.
    EventInactive,
    /// The event is active but no team has been selected.
    WaitingForTeam,
    /// Scoring the team at `index`.
    Scoring {
        /// Position of the team in the event's team list.
        index: usize,
        /// The team's id.
        team_id: TeamId,
    },
}

/// Where the judge client should go after a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Keep showing this event.
    Stay,
    /// The event was deactivated while being scored; return to event
    /// selection.
    LeaveEvent,
    /// This event is inactive and exactly one other event is active.
    FollowEvent(EventId),
}

/// The admin selected a team the judge's catalog does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationAnomaly {
    /// The event being scored.
    pub event_id: EventId,
    /// The unrecognized team id.
    pub team_id: TeamId,
    /// When it was observed.
    pub observed_at: DateTime<Utc>,
}

/// Result of applying one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// Where to go next.
    pub navigation: Navigation,
    /// Whether the current-team pointer from the store changed.
    pub team_changed: bool,
    /// Set when the store named a team outside the catalog.
    pub anomaly: Option<ReconciliationAnomaly>,
}

impl PollOutcome {
    const fn unchanged() -> Self {
        Self {
            navigation: Navigation::Stay,
            team_changed: false,
            anomaly: None,
        }
    }
}

/// One judge's scoring session for one event.
#[derive(Debug)]
pub struct JudgeSession {
    engine: ScoringEngine,
    considered_active: bool,
    cached_team: Option<TeamId>,
    view: JudgeView,
    auto_follow: bool,
    leave_when_inactive: bool,
    last_updated: Option<DateTime<Utc>>,
    anomaly_count: u64,
}

impl JudgeSession {
    /// Start a session for `event` with every score at zero.
    pub fn new(event: EventDefinition) -> Self {
        Self::with_engine(ScoringEngine::new(event))
    }

    /// Start a session around an already configured engine.
    pub const fn with_engine(engine: ScoringEngine) -> Self {
        Self {
            engine,
            considered_active: false,
            cached_team: None,
            view: JudgeView::Loading,
            auto_follow: true,
            leave_when_inactive: false,
            last_updated: None,
            anomaly_count: 0,
        }
    }

    /// Enable or disable following the single other active event.
    #[must_use]
    pub const fn with_auto_follow(mut self, auto_follow: bool) -> Self {
        self.auto_follow = auto_follow;
        self
    }

    /// Leave an inactive event even if it was never seen active.
    ///
    /// For clients without a way back to event selection. Following the
    /// single other active event still takes precedence.
    #[must_use]
    pub const fn with_leave_when_inactive(mut self, leave: bool) -> Self {
        self.leave_when_inactive = leave;
        self
    }

    /// The event being scored.
    pub const fn event_id(&self) -> &EventId {
        &self.engine.event().id
    }

    /// The scoring engine.
    pub const fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// The scoring engine, for score input and saves.
    ///
    /// Manual navigation goes through [`Self::advance`] and
    /// [`Self::select_team`], which respect the admin's selection.
    pub const fn engine_mut(&mut self) -> &mut ScoringEngine {
        &mut self.engine
    }

    /// Whether the admin's team selection currently locks navigation.
    pub const fn navigation_locked(&self) -> bool {
        self.cached_team.is_some()
    }

    /// Move the pointer by `delta` unless navigation is locked.
    ///
    /// Returns the resulting index.
    pub fn advance(&mut self, delta: isize) -> usize {
        if self.navigation_locked() {
            debug!(event_id = %self.event_id(), delta, "Navigation locked by admin selection");
            return self.engine.current_index();
        }
        self.engine.advance(delta)
    }

    /// Jump to the team at `index` unless navigation is locked.
    ///
    /// Returns the resulting index.
    pub fn select_team(&mut self, index: usize) -> usize {
        if self.navigation_locked() {
            debug!(event_id = %self.event_id(), index, "Navigation locked by admin selection");
            return self.engine.current_index();
        }
        self.engine.select_team(index)
    }

    /// What the judge client should be showing.
    pub const fn view(&self) -> &JudgeView {
        &self.view
    }

    /// The team id last read from the store.
    pub const fn cached_team(&self) -> Option<&TeamId> {
        self.cached_team.as_ref()
    }

    /// When the current team last changed.
    pub const fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Number of unrecognized team ids seen so far.
    pub const fn anomaly_count(&self) -> u64 {
        self.anomaly_count
    }

    /// Reconcile with one snapshot of the store.
    pub fn apply(&mut self, state: &EventState) -> PollOutcome {
        let event_id = self.event_id().clone();
        let active = state.is_active(event_id.as_str());
        let mut outcome = PollOutcome::unchanged();

        if !active && self.considered_active {
            info!(event_id = %event_id, "Event deactivated, leaving scoring view");
            self.considered_active = false;
            self.view = JudgeView::EventInactive;
            outcome.navigation = Navigation::LeaveEvent;
            return outcome;
        }
        self.considered_active = active;

        if active {
            let team = state.current_team(event_id.as_str()).cloned();
            if team != self.cached_team {
                outcome.team_changed = true;
                self.last_updated = Some(Utc::now());
                self.cached_team.clone_from(&team);

                if let Some(team_id) = team {
                    match self.engine.select_team_by_id(team_id.as_str()) {
                        Some(index) => {
                            debug!(event_id = %event_id, team_id = %team_id, index, "Current team moved");
                        }
                        None => {
                            warn!(
                                event_id = %event_id,
                                team_id = %team_id,
                                "Current team is not in the catalog, keeping pointer"
                            );
                            self.anomaly_count = self.anomaly_count.saturating_add(1);
                            outcome.anomaly = Some(ReconciliationAnomaly {
                                event_id: event_id.clone(),
                                team_id,
                                observed_at: Utc::now(),
                            });
                        }
                    }
                }
            }
        } else {
            if self.auto_follow {
                let mut others = state
                    .active_events
                    .iter()
                    .filter(|id| **id != event_id);
                if let (Some(other), None) = (others.next(), others.next()) {
                    info!(from = %event_id, to = %other, "Following the only active event");
                    outcome.navigation = Navigation::FollowEvent(other.clone());
                }
            }
            if self.leave_when_inactive && outcome.navigation == Navigation::Stay {
                info!(event_id = %event_id, "Event inactive, leaving");
                outcome.navigation = Navigation::LeaveEvent;
            }
        }

        self.view = self.derive_view(active);
        outcome
    }

    /// Read one snapshot from `store` and reconcile with it.
    ///
    /// An unreachable remote store leaves the session untouched; any other
    /// read fault counts as an empty record.
    pub async fn poll<S: EventStateStore>(&mut self, store: &S) -> PollOutcome {
        let snapshot = store.snapshot().await;
        self.apply_snapshot(snapshot)
    }

    /// Reconcile with the result of a snapshot read.
    ///
    /// Lets callers read the store without holding the session.
    pub fn apply_snapshot(&mut self, snapshot: Result<EventState, StoreError>) -> PollOutcome {
        match snapshot {
            Ok(state) => self.apply(&state),
            Err(e) if e.is_transport() => {
                warn!(
                    event_id = %self.event_id(),
                    error = %e,
                    "Store unreachable, keeping current view"
                );
                PollOutcome::unchanged()
            }
            Err(e) => {
                warn!(
                    event_id = %self.event_id(),
                    error = %e,
                    "Store read failed, treating as no active events"
                );
                self.apply(&EventState::default())
            }
        }
    }

    fn derive_view(&self, active: bool) -> JudgeView {
        if !active {
            return JudgeView::EventInactive;
        }
        if self.cached_team.is_none() {
            return JudgeView::WaitingForTeam;
        }
        self.engine
            .current_team()
            .map_or(JudgeView::WaitingForTeam, |team| JudgeView::Scoring {
                index: self.engine.current_index(),
                team_id: team.id.clone(),
            })
    }
}

/// Save a shared session's scores through `sink`.
///
/// The session lock is released while the sink works, so polls and score
/// input continue during the save.
///
/// # Errors
///
/// Returns [`ScoringError::SaveInProgress`] if a save is already running and
/// [`ScoringError::Save`] if the sink fails.
pub async fn save_session<S: ScoreSink>(
    session: &Mutex<JudgeSession>,
    sink: &S,
) -> Result<(), ScoringError> {
    let submission = session.lock().await.engine_mut().begin_save()?;
    info!(
        event_id = %submission.event_id,
        sink = sink.name(),
        "Saving scores"
    );

    let result = sink.submit(&submission).await;
    if let Err(e) = &result {
        warn!(event_id = %submission.event_id, error = %e, "Score save failed");
    }
    session.lock().await.engine_mut().finish_save(result)
}
