//! Teardown semantics.

use fieldwatch_core::ReportRepository;
use std::time::Duration;

use crate::common::{TestHarness, blight, field, settle};

#[tokio::test(start_paused = true)]
async fn test_fetch_resolving_after_stop_is_discarded() {
    let mut h = TestHarness::quiet();
    h.seed(28.0, 79.0).await;
    h.repo.set_list_delay(Duration::from_secs(5));
    h.map.start();
    settle().await;
    assert_eq!(h.repo.list_calls(), 1);

    h.map.stop();
    tokio::time::sleep(Duration::from_secs(6)).await;

    assert!(h.map.store().is_empty());
    assert!(h.map.status().state().is_stopped());
}

#[tokio::test(start_paused = true)]
async fn test_fetch_from_before_restart_is_discarded() {
    let mut h = TestHarness::quiet();
    h.seed(28.0, 79.0).await;
    h.repo.set_list_delay(Duration::from_secs(5));
    h.map.start();
    settle().await;
    h.map.stop();

    h.repo.delete_all().await.unwrap();
    h.repo.set_list_delay(Duration::ZERO);
    h.map.start();
    settle().await;
    assert!(h.map.store().is_empty());
    assert!(h.map.status().state().is_synced());

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(h.repo.list_calls(), 2);
    assert!(h.map.store().is_empty());
    assert!(h.map.view().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_ends_the_schedule() {
    let mut h = TestHarness::with_interval(Duration::from_secs(10));
    h.map.start();
    settle().await;
    h.map.stop();

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.repo.list_calls(), 1);
    assert!(!h.map.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_pending_forced_reconcile() {
    let mut h = TestHarness::quiet();
    h.map.start();
    settle().await;
    h.map
        .report_detection(&blight(), field(29.2, 79.5))
        .await
        .unwrap();
    h.map.stop();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(h.repo.list_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_insert_after_stop_is_saved_but_not_shown() {
    let mut h = TestHarness::quiet();
    h.map.start();
    settle().await;
    h.map.stop();

    h.map
        .report_detection(&blight(), field(29.2, 79.5))
        .await
        .unwrap();
    assert_eq!(h.repo.len().await, 1);
    assert!(h.map.store().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_restart_resumes_syncing() {
    let mut h = TestHarness::quiet();
    h.map.start();
    settle().await;
    h.map.stop();

    h.seed(28.0, 79.0).await;
    h.map.start();
    settle().await;
    assert!(h.map.is_running());
    assert_eq!(h.map.store().len(), 1);
}
