//! Reconciliation schedule and failure handling.

use fieldwatch_core::{SyncState, SeverityTier};
use fieldwatch_sync::ReconcileOutcome;
use std::time::Duration;

use crate::common::{TestHarness, settle};

#[tokio::test(start_paused = true)]
async fn test_first_pass_runs_on_start() {
    let mut h = TestHarness::quiet();
    h.seed(28.0, 79.0).await;
    h.seed(28.0000001, 79.0000001).await;
    h.seed(28.5, 79.5).await;

    h.map.start();
    settle().await;

    assert_eq!(h.repo.list_calls(), 1);
    let view = h.map.view();
    assert_eq!(view.units.len(), 2);
    assert_eq!(view.units[0].tier, SeverityTier::Medium);
    assert_eq!(view.units[0].radius, 210);
    assert_eq!(view.units[1].tier, SeverityTier::Low);
    assert_eq!(view.units[1].radius, 180);
    assert!(h.map.status().state().is_synced());
}

#[tokio::test(start_paused = true)]
async fn test_passes_follow_the_interval() {
    let mut h = TestHarness::with_interval(Duration::from_secs(10));
    h.map.start();
    settle().await;
    assert_eq!(h.repo.list_calls(), 1);

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(h.repo.list_calls(), 2);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.repo.list_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_new_remote_reports_appear_on_next_tick() {
    let mut h = TestHarness::with_interval(Duration::from_secs(10));
    h.map.start();
    settle().await;
    assert!(h.map.store().is_empty());

    for _ in 0..10 {
        h.seed(29.219577, 79.513203).await;
    }
    assert!(h.map.store().is_empty());

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    let view = h.map.view();
    assert_eq!(view.units.len(), 1);
    assert_eq!(view.units[0].tier, SeverityTier::Critical);
    assert_eq!(view.units[0].radius, 450);
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_keeps_state_and_loop_continues() {
    let mut h = TestHarness::with_interval(Duration::from_secs(10));
    h.seed(28.0, 79.0).await;
    h.seed(28.5, 79.5).await;
    h.map.start();
    settle().await;
    let before = h.map.store().read();
    assert_eq!(before.len(), 2);

    h.repo.set_available(false);
    assert!(h.map.refresh().await.is_err());
    assert!(h.map.status().state().is_degraded());
    assert_eq!(h.map.store().read(), before);

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(h.repo.list_calls(), 3);
    assert_eq!(h.map.store().read(), before);

    h.repo.set_available(true);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(matches!(
        h.map.status().state(),
        SyncState::Synced { reports: 2, .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_manual_refresh_outside_schedule() {
    let mut h = TestHarness::quiet();
    h.map.start();
    settle().await;

    h.seed(28.0, 79.0).await;
    let outcome = h.map.refresh().await.unwrap();
    assert!(matches!(outcome, ReconcileOutcome::Applied { reports: 1, .. }));
    assert_eq!(h.map.reports().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_records_are_dropped() {
    let mut h = TestHarness::quiet();
    h.seed(28.0, 79.0).await;
    h.repo
        .insert_raw(fieldwatch_core::Record {
            id: Some("broken".into()),
            disease_type: Some("Rust".into()),
            ..Default::default()
        })
        .await;
    h.map.start();
    settle().await;

    let outcome = h.map.refresh().await.unwrap();
    assert!(matches!(
        outcome,
        ReconcileOutcome::Applied {
            reports: 1,
            dropped: 1,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_clear_all_then_tick_stays_empty() {
    let mut h = TestHarness::with_interval(Duration::from_secs(10));
    h.seed(28.0, 79.0).await;
    h.seed(28.0, 79.0).await;
    h.map.start();
    settle().await;
    assert_eq!(h.map.store().len(), 2);

    assert_eq!(h.map.clear_all().await.unwrap(), 2);
    assert!(h.map.store().is_empty());

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert!(h.map.store().is_empty());
    assert!(h.map.view().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_clear_preserves_state() {
    let mut h = TestHarness::quiet();
    h.seed(28.0, 79.0).await;
    h.map.start();
    settle().await;

    h.repo.set_available(false);
    let err = h.map.clear_all().await.unwrap_err();
    assert!(matches!(
        err,
        fieldwatch_core::Error::PersistenceUnavailable { .. }
    ));
    assert_eq!(h.map.store().len(), 1);
}
