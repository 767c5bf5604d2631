//! Handlers of the non-config subcommands.

use fieldwatch_api::Server;
use fieldwatch_client::HttpReportRepository;
use fieldwatch_core::{
    Classification, Coordinates, DetectedDisease, DiseaseReport, FixedLocation, MapView, SyncState,
};
use fieldwatch_sync::{OutbreakMap, SyncConfig};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::ReportArgs;
use crate::config::FieldwatchConfig;
use crate::render;
use crate::{Error, Result};

/// Builds an outbreak map backed by the configured persistence service.
pub fn open_map(config: &FieldwatchConfig, sync: SyncConfig) -> Result<OutbreakMap> {
    let repo = HttpReportRepository::new(config.client.clone())?;
    tracing::debug!(url = repo.url(), "Using persistence service");
    Ok(OutbreakMap::new(Arc::new(repo), sync)?)
}

/// Runs the persistence server until Ctrl-C.
pub async fn serve(
    mut config: FieldwatchConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    Server::new(config.server).serve(shutdown_signal()).await?;
    Ok(())
}

/// Follows the map and prints each new view until Ctrl-C.
pub async fn watch(config: FieldwatchConfig, json: bool) -> Result<()> {
    let mut map = open_map(&config, config.sync_config()?)?;
    let mut views = map.subscribe();
    let mut status = map.status().subscribe();
    map.start();

    if !json {
        println!("{}\n", render::legend());
    }

    let mut last_revision = None;
    match first_view(&map, config.client.timeout()).await {
        Ok(view) => {
            print_view(&view, json, false)?;
            last_revision = Some(view.revision);
        }
        Err(e) => eprintln!("{e}"),
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if last_revision.is_some_and(|seen| view.revision <= seen) {
                    continue;
                }
                print_view(&view, json, false)?;
                last_revision = Some(view.revision);
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = status.borrow_and_update().clone();
                match &state {
                    SyncState::Degraded(_) => eprintln!("{state}"),
                    _ => tracing::debug!(%state, "Sync status changed"),
                }
            }
        }
    }

    map.stop();
    Ok(())
}

/// Waits for a started map's first successful fetch and returns its view.
pub async fn first_view(map: &OutbreakMap, timeout: Duration) -> Result<MapView> {
    map.status().wait_synced(timeout).await?;
    Ok(map.view())
}

/// Saves one detection at the given position.
///
/// Returns `None` when a raw classifier class did not pass the gate.
pub async fn report(config: FieldwatchConfig, args: ReportArgs) -> Result<Option<DiseaseReport>> {
    let coordinates = Coordinates::new(args.lat, args.lng)?;
    let mut sync = config.sync_config()?;
    if let Some(user) = args.user {
        sync = sync.with_user_id(user);
    }
    let map = open_map(&config, sync)?
        .with_location_provider(Arc::new(FixedLocation::at(coordinates)));

    let saved = match (args.disease, args.class) {
        (Some(disease), _) => {
            let detected = DetectedDisease::new(disease, args.confidence)?;
            Some(map.report_here(&detected).await?)
        }
        (None, Some(class)) => {
            let classification = Classification::new(class, args.confidence);
            map.report_classification(&classification, coordinates).await?
        }
        (None, None) => return Err(Error::config("either --disease or --class is required")),
    };

    match &saved {
        Some(report) => println!("{}", render::render_report(report)),
        None => println!(
            "Not reported: healthy or below the {:.0}% confidence threshold",
            map.config().min_confidence * 100.0
        ),
    }
    Ok(saved)
}

/// Fetches the collection once and prints its zones.
pub async fn clusters(config: FieldwatchConfig, json: bool, details: bool) -> Result<()> {
    let view = fetch_view(&config).await?;
    print_view(&view, json, details)
}

/// Fetches the collection once and projects it.
pub async fn fetch_view(config: &FieldwatchConfig) -> Result<MapView> {
    let map = open_map(config, config.sync_config()?)?;
    map.refresh().await?;
    Ok(map.view())
}

/// Deletes every stored report. Requires `yes`.
pub async fn clear(config: FieldwatchConfig, yes: bool) -> Result<u64> {
    if !yes {
        return Err(Error::config("refusing to delete every report without --yes"));
    }
    let map = open_map(&config, config.sync_config()?)?;
    let deleted = map.clear_all().await?;
    println!("Deleted {deleted} report{}", if deleted == 1 { "" } else { "s" });
    Ok(deleted)
}

fn print_view(view: &MapView, json: bool, details: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        println!("{}\n", render::render_view(view, details));
    }
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown requested"),
        Err(e) => {
            tracing::warn!("Cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}
