//! Optimistic inserts and the forced reconciliation that follows them.

use fieldwatch_core::Error;
use std::time::Duration;

use crate::common::{TestHarness, blight, field, settle};

#[tokio::test(start_paused = true)]
async fn test_insert_is_visible_before_next_tick() {
    let mut h = TestHarness::quiet();
    h.map.start();
    settle().await;
    let calls = h.repo.list_calls();

    let report = h
        .map
        .report_detection(&blight(), field(29.2, 79.5))
        .await
        .unwrap();
    assert!(report.is_confirmed());

    assert_eq!(h.repo.list_calls(), calls);
    let reports = h.map.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, report.id);
    assert_eq!(h.map.view().units.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_insert_changes_nothing() {
    let mut h = TestHarness::quiet();
    h.seed(28.0, 79.0).await;
    h.map.start();
    settle().await;
    let before = h.map.store().read();

    h.repo.set_available(false);
    let err = h
        .map
        .report_detection(&blight(), field(29.2, 79.5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InsertRejected { .. }));
    assert_eq!(h.map.store().read(), before);
}

#[tokio::test(start_paused = true)]
async fn test_forced_reconcile_follows_insert() {
    let mut h = TestHarness::quiet();
    h.map.start();
    settle().await;

    h.map
        .report_detection(&blight(), field(29.2, 79.5))
        .await
        .unwrap();
    // Someone else reports meanwhile; only a reconciliation can bring it in.
    h.seed(28.0, 79.0).await;
    assert_eq!(h.map.store().len(), 1);

    tokio::time::sleep(Duration::from_millis(1_900)).await;
    assert_eq!(h.map.store().len(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(h.map.store().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_late_fetch_overwrites_optimistic_entry_until_forced_pass() {
    let mut h = TestHarness::quiet();
    h.repo.set_list_delay(Duration::from_secs(5));
    h.map.start();
    settle().await;
    // t=0: first fetch in flight, carrying the empty collection.
    assert_eq!(h.repo.list_calls(), 1);

    tokio::time::sleep(Duration::from_secs(1)).await;
    h.map
        .report_detection(&blight(), field(29.2, 79.5))
        .await
        .unwrap();
    assert_eq!(h.map.store().len(), 1);

    // t=5: the stale fetch lands and replaces the collection.
    tokio::time::sleep(Duration::from_millis(4_500)).await;
    assert!(h.map.store().is_empty());

    // t=3 started the forced fetch, which lands at t=8 with the report.
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(h.map.store().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_view_subscription_sees_inserts() {
    let mut h = TestHarness::quiet();
    let mut views = h.map.subscribe();
    h.map.start();
    settle().await;

    h.map
        .report_detection(&blight(), field(29.2, 79.5))
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(1), views.changed())
        .await
        .unwrap()
        .unwrap();
    let view = views.borrow_and_update().clone();
    assert_eq!(view.units.len(), 1);
    assert_eq!(view.units[0].summary.total_reports, 1);
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_fetch_publishes_nothing() {
    let mut h = TestHarness::with_interval(Duration::from_secs(10));
    h.seed(28.0, 79.0).await;
    let mut views = h.map.subscribe();
    h.map.start();
    settle().await;
    assert!(views.has_changed().unwrap());
    let _ = views.borrow_and_update();

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(h.repo.list_calls(), 2);
    assert!(!views.has_changed().unwrap());
}
