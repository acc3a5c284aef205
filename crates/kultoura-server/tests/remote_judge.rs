//! A remote judge station against a live kiosk server.
//!
//! The server runs on an ephemeral local port; the station talks to it
//! only through `HttpStateStore` and `HttpScoreSink`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use kultoura_core::admin::AdminConsole;
use kultoura_core::catalog::EventCatalog;
use kultoura_core::config::ServerConfig;
use kultoura_core::judge::{JudgeSession, JudgeView, Navigation};
use kultoura_scoring::LogScoreSink;
use kultoura_server::{AppState, ServerHandle, spawn_server};
use kultoura_store::{
    EventStateStore, HttpScoreSink, HttpStateStore, MemoryStore, ScoreBackend, StateBackend,
};
use kultoura_types::{EventId, SaveStatus, TeamId};
use rust_decimal::Decimal;

async fn start_kiosk() -> (ServerHandle, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        StateBackend::Memory(MemoryStore::new()),
        ScoreBackend::Log(LogScoreSink::new(Duration::ZERO)),
        EventCatalog::builtin(),
    ));
    let config = ServerConfig {
        host: String::from("127.0.0.1"),
        port: 0,
        ..ServerConfig::default()
    };
    let handle = spawn_server(&config, Arc::clone(&state)).await.unwrap();
    (handle, state)
}

#[tokio::test]
async fn remote_station_follows_admin_and_saves() {
    let (handle, kiosk) = start_kiosk().await;
    let remote = Arc::new(HttpStateStore::new(&handle.base_url()));
    let admin = AdminConsole::new(Arc::clone(&remote), Arc::new(EventCatalog::builtin()));

    admin.set_event_active("festival-dance", true).await.unwrap();
    admin
        .set_current_team("festival-dance", "team2")
        .await
        .unwrap();

    // The write landed in the kiosk's own store.
    assert_eq!(
        kiosk.store.event_current_team("festival-dance").await,
        Some(TeamId::from("team2"))
    );

    let event = kiosk.catalog.get("festival-dance").cloned().unwrap();
    let mut judge = JudgeSession::new(event);
    let outcome = judge.poll(remote.as_ref()).await;
    assert_eq!(outcome.navigation, Navigation::Stay);
    assert_eq!(
        judge.view(),
        &JudgeView::Scoring {
            index: 1,
            team_id: TeamId::from("team2")
        }
    );

    let sink = HttpScoreSink::new(&handle.base_url());
    judge
        .engine_mut()
        .set_score("team2", "technique", Decimal::from(28))
        .unwrap();
    judge.engine_mut().save(&sink).await.unwrap();
    assert_eq!(judge.engine().save_status(), SaveStatus::Saved);

    admin
        .set_event_active("festival-dance", false)
        .await
        .unwrap();
    let outcome = judge.poll(remote.as_ref()).await;
    assert_eq!(outcome.navigation, Navigation::LeaveEvent);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn unreachable_kiosk_keeps_station_view() {
    let (handle, kiosk) = start_kiosk().await;
    let base_url = handle.base_url();
    kiosk
        .store
        .set_event_active(&EventId::from("mini-museum"), true)
        .await
        .unwrap();

    let remote = HttpStateStore::new(&base_url).with_timeout(Duration::from_millis(500));
    let event = kiosk.catalog.get("mini-museum").cloned().unwrap();
    let mut judge = JudgeSession::new(event);
    judge.poll(&remote).await;
    assert_eq!(judge.view(), &JudgeView::WaitingForTeam);

    handle.shutdown().await.unwrap();

    let outcome = judge.poll(&remote).await;
    assert_eq!(outcome.navigation, Navigation::Stay);
    assert_eq!(judge.view(), &JudgeView::WaitingForTeam);
    assert!(remote.snapshot().await.is_err());
}

#[tokio::test]
async fn remote_score_rejection_marks_save_failed() {
    let (handle, kiosk) = start_kiosk().await;
    let sink = HttpScoreSink::new(&handle.base_url());

    // An event the kiosk does not know answers 404.
    let mut event = kiosk.catalog.get("festival-dance").cloned().unwrap();
    event.id = EventId::from("karaoke");
    let mut judge = JudgeSession::new(event);

    assert!(judge.engine_mut().save(&sink).await.is_err());
    assert_eq!(judge.engine().save_status(), SaveStatus::Error);

    handle.shutdown().await.unwrap();
}
