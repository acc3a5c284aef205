//! Fixed-period polling loops for judge clients.
//!
//! Each loop awaits one poll before scheduling the next
//! ([`MissedTickBehavior::Delay`]), so responses are applied in the order
//! they were requested. Loops end when the view has to navigate somewhere
//! else or when the shutdown signal flips to `true`; an in-flight poll is
//! dropped with the loop future.

use std::collections::BTreeSet;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use kultoura_store::EventStateStore;
use kultoura_types::EventId;

use crate::judge::{JudgeSession, JudgeView, Navigation, PollOutcome};
use crate::selector::EventSelector;

/// Presentation hooks invoked by the polling loops.
pub trait ViewCallback: Send {
    /// The judge view of `event_id` changed.
    fn on_view(&mut self, event_id: &EventId, view: &JudgeView);

    /// The active-event set seen by the selector changed.
    fn on_active_events(&mut self, _active: &BTreeSet<EventId>) {}
}

/// A callback that ignores everything.
pub struct NoOpViewCallback;

impl ViewCallback for NoOpViewCallback {
    fn on_view(&mut self, _event_id: &EventId, _view: &JudgeView) {}
}

/// Why a judge loop returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JudgeExit {
    /// The shutdown signal fired.
    Shutdown,
    /// The event was deactivated; go back to event selection.
    LeaveEvent,
    /// Switch to the only other active event.
    FollowEvent(EventId),
}

/// Why a selector loop returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorExit {
    /// The shutdown signal fired.
    Shutdown,
    /// Open this event.
    OpenEvent(EventId),
}

/// Poll the store for one judge session until it has to navigate away.
///
/// The session lock is held only while a snapshot is applied, never
/// during the store read, so score input continues between polls.
pub async fn run_judge_loop<S: EventStateStore>(
    session: &Mutex<JudgeSession>,
    store: &S,
    period: Duration,
    callback: &mut dyn ViewCallback,
    mut shutdown: watch::Receiver<bool>,
) -> JudgeExit {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_view: Option<JudgeView> = None;

    let event_id = session.lock().await.event_id().clone();
    info!(event_id = %event_id, period = ?period, "Judge polling started");

    loop {
        let outcome = tokio::select! {
            () = wait_for_shutdown(&mut shutdown) => {
                info!(event_id = %event_id, "Judge polling stopped");
                return JudgeExit::Shutdown;
            }
            outcome = poll_session(session, store, &mut ticker) => outcome,
        };

        let (outcome, view) = outcome;
        if last_view.as_ref() != Some(&view) {
            debug!(event_id = %event_id, view = ?view, "Judge view changed");
            callback.on_view(&event_id, &view);
            last_view = Some(view);
        }

        match outcome.navigation {
            Navigation::Stay => {}
            Navigation::LeaveEvent => return JudgeExit::LeaveEvent,
            Navigation::FollowEvent(other) => return JudgeExit::FollowEvent(other),
        }
    }
}

/// Poll the active-event set until the selector opens an event.
pub async fn run_selector_loop<S: EventStateStore>(
    selector: &mut EventSelector,
    store: &S,
    period: Duration,
    callback: &mut dyn ViewCallback,
    mut shutdown: watch::Receiver<bool>,
) -> SelectorExit {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(period = ?period, "Event selection polling started");

    loop {
        let outcome = tokio::select! {
            () = wait_for_shutdown(&mut shutdown) => return SelectorExit::Shutdown,
            outcome = async {
                ticker.tick().await;
                selector.poll(store).await
            } => outcome,
        };

        if outcome.changed {
            callback.on_active_events(selector.active_events());
        }
        if let Some(event_id) = outcome.navigate_to {
            return SelectorExit::OpenEvent(event_id);
        }
    }
}

async fn poll_session<S: EventStateStore>(
    session: &Mutex<JudgeSession>,
    store: &S,
    ticker: &mut tokio::time::Interval,
) -> (PollOutcome, JudgeView) {
    ticker.tick().await;
    let snapshot = store.snapshot().await;

    let mut session = session.lock().await;
    let outcome = session.apply_snapshot(snapshot);
    (outcome, session.view().clone())
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender counts as shutdown too.
    let _ = shutdown.wait_for(|stop| *stop).await;
}
