mod common;

use common::{MockBackend, active_session, user};
use std::sync::atomic::Ordering;
use std::time::Duration;
use timecard_sync::session::SessionPhase;
use timecard_sync::sync::SyncController;

fn controller(backend: &std::sync::Arc<MockBackend>) -> SyncController<MockBackend> {
    SyncController::new(backend.clone(), Duration::from_secs(3600))
}

#[tokio::test]
async fn test_start_adopts_backend_record() {
    let backend = MockBackend::new().with_user(user("Tay"));
    let controller = controller(&backend);
    controller.refresh_snapshots().await.unwrap();
    assert_eq!(controller.store().phase(), SessionPhase::Idle);

    let session = controller.machine().request_start().await.unwrap();

    assert_eq!(session.id, "sess-1");
    assert_eq!(controller.store().snapshot().session, Some(session));
    assert_eq!(controller.store().phase(), SessionPhase::Active);
}

#[tokio::test]
async fn test_start_after_ended_session_begins_new_one() {
    let mut ended = active_session("old", 120);
    ended.ended_at = Some(ended.started_at + chrono::Duration::minutes(30));
    let backend = MockBackend::new().with_user(user("Tay")).with_session(ended);
    let controller = controller(&backend);
    controller.refresh_snapshots().await.unwrap();
    assert_eq!(controller.store().phase(), SessionPhase::Ended);

    let session = controller.machine().request_start().await.unwrap();

    assert_ne!(session.id, "old");
    assert_eq!(controller.store().phase(), SessionPhase::Active);
}

#[tokio::test]
async fn test_start_while_active_is_rejected_locally() {
    let backend = MockBackend::new()
        .with_user(user("Tay"))
        .with_session(active_session("sess-1", 5));
    let controller = controller(&backend);
    controller.refresh_snapshots().await.unwrap();

    let err = controller.machine().request_start().await.unwrap_err();

    assert!(err.is_state_conflict());
    assert_eq!(backend.start_calls.load(Ordering::SeqCst), 0);
    assert_eq!(controller.store().snapshot().session.unwrap().id, "sess-1");
}

#[tokio::test]
async fn test_start_refused_by_backend_keeps_snapshot() {
    // The local snapshot is stale: the backend already has a running session.
    let backend = MockBackend::new()
        .with_user(user("Tay"))
        .with_session(active_session("elsewhere", 5));
    let controller = controller(&backend);

    let err = controller.machine().request_start().await.unwrap_err();

    assert!(err.is_state_conflict());
    assert_eq!(backend.start_calls.load(Ordering::SeqCst), 1);
    assert_eq!(controller.store().snapshot().session, None);
    assert_eq!(controller.store().phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn test_start_transport_failure_keeps_phase() {
    let backend = MockBackend::new().with_user(user("Tay"));
    backend.fail(|f| f.start = true);
    let controller = controller(&backend);
    controller.refresh_snapshots().await.unwrap();

    let err = controller.machine().request_start().await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(controller.store().phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn test_stop_refetches_and_ends_session() {
    let backend = MockBackend::new()
        .with_user(user("Tay"))
        .with_session(active_session("sess-1", 45));
    let controller = controller(&backend);
    controller.refresh_snapshots().await.unwrap();
    let fetches = backend.session_fetches.load(Ordering::SeqCst);

    let session = controller.machine().request_stop().await.unwrap().unwrap();

    assert_eq!(session.id, "sess-1");
    assert!(session.ended_at.is_some());
    assert_eq!(backend.session_fetches.load(Ordering::SeqCst), fetches + 1);
    assert_eq!(controller.store().phase(), SessionPhase::Ended);
}

#[tokio::test]
async fn test_stop_while_idle_makes_no_backend_call() {
    let backend = MockBackend::new().with_user(user("Tay"));
    let controller = controller(&backend);
    controller.refresh_snapshots().await.unwrap();

    let err = controller.machine().request_stop().await.unwrap_err();

    assert!(err.is_state_conflict());
    assert_eq!(backend.stop_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stop_transport_failure_stays_active() {
    let backend = MockBackend::new()
        .with_user(user("Tay"))
        .with_session(active_session("sess-1", 45));
    backend.fail(|f| f.stop = true);
    let controller = controller(&backend);
    controller.refresh_snapshots().await.unwrap();

    let err = controller.machine().request_stop().await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(controller.store().phase(), SessionPhase::Active);
    assert!(controller.store().snapshot().session.unwrap().ended_at.is_none());
}

#[tokio::test]
async fn test_stop_declined_by_backend_is_conflict() {
    let backend = MockBackend::new().with_user(user("Tay"));
    let controller = controller(&backend);
    // Seed a stale local snapshot the backend does not know about.
    controller
        .store()
        .apply(timecard_sync::sync::Update::Session(Some(active_session("ghost", 5))));

    let err = controller.machine().request_stop().await.unwrap_err();

    assert!(err.is_state_conflict());
    assert_eq!(backend.stop_calls.load(Ordering::SeqCst), 1);
    assert_eq!(controller.store().phase(), SessionPhase::Active);
}

#[tokio::test]
async fn test_stop_refetch_failure_keeps_previous_snapshot() {
    let backend = MockBackend::new()
        .with_user(user("Tay"))
        .with_session(active_session("sess-1", 45));
    let controller = controller(&backend);
    controller.refresh_snapshots().await.unwrap();
    backend.fail(|f| f.get_session = true);

    let err = controller.machine().request_stop().await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(controller.store().phase(), SessionPhase::Active);
    // The backend did stop it; the next successful refresh will say so.
    assert!(backend.session().unwrap().ended_at.is_some());
}
