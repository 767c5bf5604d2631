//! CLI commands against a live persistence server.

#![allow(clippy::unwrap_used)]

use fieldwatch_api::{Server, ServerConfig};
use fieldwatch_cli::{Error, FieldwatchConfig, ReportArgs, commands};
use fieldwatch_core::{InMemoryRepository, SeverityTier};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct Harness {
    config: FieldwatchConfig,
    backing: Arc<InMemoryRepository>,
    stop: Option<oneshot::Sender<()>>,
}

impl Harness {
    async fn start() -> Self {
        let backing = Arc::new(InMemoryRepository::new());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (stop, stopped) = oneshot::channel::<()>();

        let server = Server::with_repository(ServerConfig::default(), backing.clone());
        tokio::spawn(server.serve_with_listener(listener, async {
            let _ = stopped.await;
        }));

        let mut config = FieldwatchConfig::default();
        config.client.base_url = base;
        config.client.timeout_secs = 5;
        Self {
            config,
            backing,
            stop: Some(stop),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

fn detection(lat: f64, lng: f64, user: &str) -> ReportArgs {
    ReportArgs {
        lat,
        lng,
        disease: Some("Late blight".to_string()),
        class: None,
        confidence: 0.97,
        user: Some(user.to_string()),
    }
}

#[tokio::test]
async fn test_report_then_clusters() {
    let harness = Harness::start().await;

    for user in ["a", "b"] {
        let args = detection(29.2195771, 79.5132034, user);
        let saved = commands::report(harness.config.clone(), args)
            .await
            .unwrap()
            .unwrap();
        assert!(saved.is_confirmed());
        assert_eq!(saved.user_id, user);
    }
    commands::report(harness.config.clone(), detection(-12.5, 130.8, "c"))
        .await
        .unwrap();
    assert_eq!(harness.backing.len().await, 3);

    let view = commands::fetch_view(&harness.config).await.unwrap();
    assert_eq!(view.units.len(), 2);
    assert_eq!(view.units[0].tier, SeverityTier::Medium);
    assert_eq!(view.units[0].radius, 210);
    assert_eq!(view.units[0].summary.distinct_users, 2);
    assert_eq!(view.stats.total_reports, 3);
}

#[tokio::test]
async fn test_report_uses_configured_user() {
    let harness = Harness::start().await;
    let mut args = detection(28.0, 79.0, "ignored");
    args.user = None;

    let saved = commands::report(harness.config.clone(), args)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.user_id, "scanner-user");
    assert_eq!(saved.detection_method.as_deref(), Some("PLANT_SCANNER"));
}

#[tokio::test]
async fn test_report_class_is_gated() {
    let harness = Harness::start().await;

    let mut healthy = detection(28.0, 79.0, "a");
    healthy.disease = None;
    healthy.class = Some("Tomato___healthy".to_string());
    assert!(
        commands::report(harness.config.clone(), healthy)
            .await
            .unwrap()
            .is_none()
    );

    let mut sick = detection(28.0, 79.0, "a");
    sick.disease = None;
    sick.class = Some("Tomato___Late_blight".to_string());
    let saved = commands::report(harness.config.clone(), sick)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.disease_type, "Late blight");
    assert_eq!(harness.backing.len().await, 1);
}

#[tokio::test]
async fn test_report_rejects_invalid_position() {
    let harness = Harness::start().await;
    let err = commands::report(harness.config.clone(), detection(95.0, 0.0, "a"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Core(_)));
    assert!(harness.backing.is_empty().await);
}

#[tokio::test]
async fn test_clear_requires_confirmation() {
    let harness = Harness::start().await;
    commands::report(harness.config.clone(), detection(28.0, 79.0, "a"))
        .await
        .unwrap();

    assert!(commands::clear(harness.config.clone(), false).await.is_err());
    assert_eq!(harness.backing.len().await, 1);

    let deleted = commands::clear(harness.config.clone(), true).await.unwrap();
    assert_eq!(deleted, 1);
    assert!(commands::fetch_view(&harness.config).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_first_view_waits_for_sync() {
    let harness = Harness::start().await;
    commands::report(harness.config.clone(), detection(28.0, 79.0, "a"))
        .await
        .unwrap();

    let mut map = commands::open_map(&harness.config, harness.config.sync_config().unwrap())
        .unwrap();
    map.start();
    let view = commands::first_view(&map, Duration::from_secs(5))
        .await
        .unwrap();
    map.stop();
    assert_eq!(view.units.len(), 1);
    assert_eq!(view.stats.total_reports, 1);
}

#[tokio::test]
async fn test_first_view_times_out_when_server_down() {
    let mut config = FieldwatchConfig::default();
    config.client.base_url = "http://127.0.0.1:1".to_string();
    config.client.timeout_secs = 1;

    let mut map = commands::open_map(&config, config.sync_config().unwrap()).unwrap();
    map.start();
    let err = commands::first_view(&map, Duration::from_millis(300))
        .await
        .unwrap_err();
    map.stop();
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_clusters_when_server_down() {
    let mut config = FieldwatchConfig::default();
    config.client.base_url = "http://127.0.0.1:1".to_string();
    config.client.timeout_secs = 1;
    assert!(commands::fetch_view(&config).await.is_err());
}
