mod common;

use common::{create_test_store, seed_incident};
use remedy_core::{
    error::LifecycleError, lifecycle, models::StatusKind, IncidentRepository, IncidentStatus,
};

#[tokio::test]
async fn test_apply_persists_forward_move() {
    let (_temp_dir, store) = create_test_store().await;
    let incident = seed_incident(store.as_ref(), "DB timeout").await;

    let (previous, updated) =
        lifecycle::apply(store.as_ref(), incident.clone(), IncidentStatus::Acknowledged)
            .await
            .unwrap();

    assert_eq!(previous, StatusKind::Open);
    assert_eq!(updated.status, IncidentStatus::Acknowledged);
    assert!(updated.updated_at >= incident.created_at);
}

#[tokio::test]
async fn test_apply_revalidates_stale_snapshot() {
    let (_temp_dir, store) = create_test_store().await;
    let stale = seed_incident(store.as_ref(), "DB timeout").await;
    store
        .update_status(stale.id, StatusKind::Open, IncidentStatus::Resolved)
        .await
        .unwrap();

    let err = lifecycle::apply(store.as_ref(), stale.clone(), IncidentStatus::Acknowledged)
        .await
        .unwrap_err();

    match err {
        LifecycleError::Transition(transition) => {
            assert_eq!(transition.from, StatusKind::Resolved);
            assert_eq!(transition.to, StatusKind::Acknowledged);
        }
        other => panic!("expected a rejected transition, got {other:?}"),
    }
    let stored = store.find_by_id(stale.id).await.unwrap().unwrap();
    assert_eq!(stored.status, IncidentStatus::Resolved);
}

#[tokio::test]
async fn test_apply_reports_move_from_stored_status() {
    let (_temp_dir, store) = create_test_store().await;
    let stale = seed_incident(store.as_ref(), "DB timeout").await;
    store
        .update_status(stale.id, StatusKind::Open, IncidentStatus::Acknowledged)
        .await
        .unwrap();

    let (previous, updated) = lifecycle::apply(store.as_ref(), stale, IncidentStatus::Resolved)
        .await
        .unwrap();

    assert_eq!(previous, StatusKind::Acknowledged);
    assert_eq!(updated.status, IncidentStatus::Resolved);
}

#[tokio::test]
async fn test_apply_to_missing_incident() {
    let (_temp_dir, store) = create_test_store().await;
    let mut ghost = seed_incident(store.as_ref(), "DB timeout").await;
    ghost.id = 99;

    let err = lifecycle::apply(store.as_ref(), ghost, IncidentStatus::Resolved)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound { id: 99 }));
}
