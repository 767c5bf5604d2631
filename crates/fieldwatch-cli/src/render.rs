//! Plain-text rendering of map views.

use fieldwatch_core::{DiseaseReport, MapView, SeverityTier};
use std::fmt::Write;

/// Renders the tier legend, lowest first.
pub fn legend() -> String {
    SeverityTier::ALL
        .iter()
        .map(|tier| format!("{:<8} {} {}", tier.label(), tier.color().hex(), tier.legend()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a view as one block per zone.
///
/// With `details`, each member report gets its own indented line.
pub fn render_view(view: &MapView, details: bool) -> String {
    if view.is_empty() {
        return "No disease reports.".to_string();
    }

    let mut out = String::new();
    let _ = write!(
        out,
        "{} zone{}, {} report{} from {} user{}",
        view.stats.clusters,
        plural(view.stats.clusters as u64),
        view.stats.total_reports,
        plural(view.stats.total_reports),
        view.stats.distinct_users,
        plural(view.stats.distinct_users as u64),
    );
    if let Some(worst) = view.stats.worst_tier {
        let _ = write!(out, " (worst: {worst})");
    }

    for (index, unit) in view.units.iter().enumerate() {
        let _ = write!(
            out,
            "\n#{:<3} {:<8} {}  r={}m  {}  {}",
            index + 1,
            unit.tier.label(),
            unit.position,
            unit.radius,
            unit.color.hex(),
            unit.summary,
        );
        if details {
            if let Some(updated) = unit.last_updated {
                let _ = write!(
                    out,
                    "\n       last updated {}",
                    updated.format("%Y-%m-%d %H:%M UTC")
                );
            }
            for line in &unit.details {
                let _ = write!(out, "\n       - {line}");
            }
        }
    }
    out
}

/// One-line description of a saved report.
pub fn render_report(report: &DiseaseReport) -> String {
    let id = report
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "Reported {} ({:.1}%) at {} as {} [id {id}]",
        report.disease_type,
        report.confidence * 100.0,
        report.coordinates,
        report.user_id,
    )
}

fn plural(count: u64) -> &'static str {
    if count == 1 { "" } else { "s" }
}
