//! Projection of clusters into renderer-agnostic units.
//!
//! A [`RenderableUnit`] carries everything a map layer needs to draw one zone
//! and its popup. Nothing here knows which rendering layer consumes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cluster::{AggregateStats, ClusterAggregate, aggregate};
use crate::quantize::ClusterKey;
use crate::severity::{Severity, SeverityColor, SeverityTier};
use crate::types::{Coordinates, DiseaseReport};

/// Popup summary of a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    /// Sum of member report counts.
    pub total_reports: u64,
    /// Number of distinct reporters.
    pub distinct_users: usize,
    /// Tier label such as `"HIGH"`.
    pub tier_label: String,
}

impl fmt::Display for ClusterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} risk: {} report{} from {} user{}",
            self.tier_label,
            self.total_reports,
            if self.total_reports == 1 { "" } else { "s" },
            self.distinct_users,
            if self.distinct_users == 1 { "" } else { "s" },
        )
    }
}

/// One popup line per member report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailLine {
    /// Disease label.
    pub disease_type: String,
    /// Confidence as a percentage, rounded to one decimal.
    pub confidence_percent: f64,
    /// When the member was reported.
    pub timestamp: DateTime<Utc>,
    /// Reporter.
    pub user_id: String,
    /// Origin tag, if the report carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_method: Option<String>,
}

impl DetailLine {
    fn from_report(report: &DiseaseReport) -> Self {
        Self {
            disease_type: report.disease_type.clone(),
            confidence_percent: (report.confidence * 1000.0).round() / 10.0,
            timestamp: report.timestamp,
            user_id: report.user_id.clone(),
            detection_method: report.detection_method.clone(),
        }
    }
}

impl fmt::Display for DetailLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.1}%) by {} at {}",
            self.disease_type,
            self.confidence_percent,
            self.user_id,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        )?;
        if let Some(method) = &self.detection_method {
            write!(f, " via {method}")?;
        }
        Ok(())
    }
}

/// A cluster ready to be drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderableUnit {
    /// Stable identity of the zone across snapshots.
    pub key: ClusterKey,
    /// Center of the zone.
    pub position: Coordinates,
    /// Radius in display units.
    pub radius: u32,
    /// Fill color.
    pub color: SeverityColor,
    /// Severity tier.
    pub tier: SeverityTier,
    /// Popup summary.
    pub summary: ClusterSummary,
    /// Popup detail lines, in member order.
    pub details: Vec<DetailLine>,
    /// Timestamp of the newest member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Projects one cluster with its severity.
pub fn project(cluster: &ClusterAggregate, severity: &Severity) -> RenderableUnit {
    RenderableUnit {
        key: cluster.key,
        position: cluster.location,
        radius: severity.radius,
        color: severity.color,
        tier: severity.tier,
        summary: ClusterSummary {
            total_reports: cluster.total_report_count,
            distinct_users: cluster.distinct_users.len(),
            tier_label: severity.tier.label().to_string(),
        },
        details: cluster.members.iter().map(DetailLine::from_report).collect(),
        last_updated: cluster.last_updated(),
    }
}

/// Aggregates and projects a whole collection.
///
/// Units are ordered by descending total, then by key, so zone numbering is
/// stable between identical snapshots.
pub fn project_all(reports: &[DiseaseReport]) -> Vec<RenderableUnit> {
    let clusters = aggregate(reports);
    let mut units: Vec<_> = clusters
        .values()
        .map(|cluster| project(cluster, &cluster.severity()))
        .collect();
    sort_units(&mut units);
    units
}

fn sort_units(units: &mut [RenderableUnit]) {
    units.sort_by(|a, b| {
        b.summary
            .total_reports
            .cmp(&a.summary.total_reports)
            .then_with(|| a.key.cmp(&b.key))
    });
}

/// Everything a renderer needs for one snapshot of the collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Store revision this view was computed from.
    pub revision: u64,
    /// Number of raw reports behind the view.
    pub report_count: usize,
    /// Zones, ordered as by [`project_all`].
    pub units: Vec<RenderableUnit>,
    /// Totals over all zones.
    pub stats: ViewStats,
}

/// Serializable totals of a [`MapView`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewStats {
    /// Number of zones.
    pub clusters: usize,
    /// Sum of all zone totals.
    pub total_reports: u64,
    /// Distinct reporters overall.
    pub distinct_users: usize,
    /// Highest tier on the map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_tier: Option<SeverityTier>,
}

impl From<&AggregateStats> for ViewStats {
    fn from(stats: &AggregateStats) -> Self {
        Self {
            clusters: stats.clusters,
            total_reports: stats.total_reports,
            distinct_users: stats.distinct_users,
            worst_tier: stats.worst_tier(),
        }
    }
}

impl MapView {
    /// Builds the view of a report collection at a given revision.
    pub fn from_reports(revision: u64, reports: &[DiseaseReport]) -> Self {
        let clusters = aggregate(reports);
        let stats = AggregateStats::from_clusters(&clusters);
        let mut units: Vec<_> = clusters
            .values()
            .map(|cluster| project(cluster, &cluster.severity()))
            .collect();
        sort_units(&mut units);
        Self {
            revision,
            report_count: reports.len(),
            units,
            stats: ViewStats::from(&stats),
        }
    }

    /// Returns `true` if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
