//! Cluster aggregation.
//!
//! Groups a report collection by [`ClusterKey`] in a single pass. Aggregates
//! are rebuilt from scratch for every new collection; nothing here is ever
//! updated incrementally.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::quantize::ClusterKey;
use crate::severity::{Severity, SeverityTier, severity};
use crate::types::{Coordinates, DiseaseReport};

/// Clusters of a collection, keyed by quantized position.
///
/// Iteration order is unspecified.
pub type ClusterMap = HashMap<ClusterKey, ClusterAggregate>;

/// All reports sharing one cluster key.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAggregate {
    /// The grouping key.
    pub key: ClusterKey,
    /// Representative (rounded) position.
    pub location: Coordinates,
    /// Sum of `report_count` over `members`.
    pub total_report_count: u64,
    /// Contributing reports in source order; never empty.
    pub members: Vec<DiseaseReport>,
    /// Distinct reporters among `members`.
    pub distinct_users: BTreeSet<String>,
}

impl ClusterAggregate {
    fn start(key: ClusterKey, report: &DiseaseReport) -> Self {
        let mut aggregate = Self {
            key,
            location: key.location(),
            total_report_count: 0,
            members: Vec::new(),
            distinct_users: BTreeSet::new(),
        };
        aggregate.absorb(report);
        aggregate
    }

    fn absorb(&mut self, report: &DiseaseReport) {
        self.total_report_count += u64::from(report.report_count);
        self.members.push(report.clone());
        self.distinct_users.insert(report.user_id.clone());
    }

    /// Severity of the cluster.
    pub fn severity(&self) -> Severity {
        severity(self.total_report_count)
    }

    /// Most recent member timestamp.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.members.iter().map(|m| m.timestamp).max()
    }

    /// Disease label of the first member.
    pub fn primary_disease(&self) -> Option<&str> {
        self.members.first().map(|m| m.disease_type.as_str())
    }
}

/// Groups reports by quantized position.
///
/// Reports whose coordinates are invalid are skipped; this never fails.
pub fn aggregate(reports: &[DiseaseReport]) -> ClusterMap {
    let mut clusters = ClusterMap::new();
    let mut skipped = 0usize;

    for report in reports {
        let Some(key) = ClusterKey::from_coordinates(&report.coordinates) else {
            skipped += 1;
            continue;
        };
        clusters
            .entry(key)
            .and_modify(|aggregate| aggregate.absorb(report))
            .or_insert_with(|| ClusterAggregate::start(key, report));
    }

    if skipped > 0 {
        log::debug!("Skipped {skipped} report(s) with invalid coordinates");
    }
    clusters
}

/// Totals over a whole aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Number of clusters.
    pub clusters: usize,
    /// Sum of all cluster totals.
    pub total_reports: u64,
    /// Number of distinct reporters across all clusters.
    pub distinct_users: usize,
    /// Cluster count per tier; tiers without clusters are absent.
    pub clusters_by_tier: BTreeMap<SeverityTier, usize>,
}

impl AggregateStats {
    /// Computes totals over a cluster map.
    pub fn from_clusters(clusters: &ClusterMap) -> Self {
        let mut stats = Self {
            clusters: clusters.len(),
            ..Self::default()
        };
        let mut users = BTreeSet::new();
        for aggregate in clusters.values() {
            stats.total_reports += aggregate.total_report_count;
            users.extend(aggregate.distinct_users.iter().map(String::as_str));
            *stats
                .clusters_by_tier
                .entry(aggregate.severity().tier)
                .or_default() += 1;
        }
        stats.distinct_users = users.len();
        stats
    }

    /// Highest tier present, if any cluster exists.
    pub fn worst_tier(&self) -> Option<SeverityTier> {
        self.clusters_by_tier.keys().next_back().copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn report(lat: f64, lng: f64, count: u32, user: &str) -> DiseaseReport {
        DiseaseReport::new("Late blight", Coordinates::new(lat, lng).unwrap(), 0.9)
            .unwrap()
            .with_report_count(count)
            .with_user(user)
    }

    fn key(lat: f64, lng: f64) -> ClusterKey {
        ClusterKey::from_coordinates(&Coordinates { lat, lng }).unwrap()
    }

    #[test]
    fn test_two_clusters_scenario() {
        let reports = vec![
            report(28.0, 79.0, 1, "a"),
            report(28.0000001, 79.0000001, 1, "b"),
            report(28.5, 79.5, 1, "a"),
        ];
        let clusters = aggregate(&reports);
        assert_eq!(clusters.len(), 2);

        let a = &clusters[&key(28.0, 79.0)];
        assert_eq!(a.total_report_count, 2);
        assert_eq!(a.severity().tier, SeverityTier::Medium);
        assert_eq!(a.severity().radius, 210);
        assert_eq!(a.distinct_users.len(), 2);

        let b = &clusters[&key(28.5, 79.5)];
        assert_eq!(b.total_report_count, 1);
        assert_eq!(b.severity().tier, SeverityTier::Low);
        assert_eq!(b.severity().radius, 180);
    }

    #[test]
    fn test_ten_identical_reports_are_critical() {
        let reports: Vec<_> = (0..10)
            .map(|i| report(29.219577, 79.513203, 1, &format!("user-{i}")))
            .collect();
        let clusters = aggregate(&reports);
        assert_eq!(clusters.len(), 1);
        let only = clusters.values().next().unwrap();
        assert_eq!(only.total_report_count, 10);
        assert_eq!(only.severity().tier, SeverityTier::Critical);
        assert_eq!(only.severity().radius, 450);
        assert_eq!(only.distinct_users.len(), 10);
    }

    #[test]
    fn test_report_counts_are_summed_not_counted() {
        let reports = vec![report(28.0, 79.0, 3, "a"), report(28.0, 79.0, 4, "a")];
        let clusters = aggregate(&reports);
        let only = clusters.values().next().unwrap();
        assert_eq!(only.total_report_count, 7);
        assert_eq!(only.members.len(), 2);
        assert_eq!(only.distinct_users.len(), 1);
        assert_eq!(only.severity().tier, SeverityTier::High);
    }

    #[test]
    fn test_members_keep_source_order() {
        let first = report(28.0, 79.0, 1, "first");
        let second = report(28.0, 79.0, 1, "second");
        let third = report(28.0, 79.0, 1, "third");
        let clusters = aggregate(&[first, second, third]);
        let users: Vec<_> = clusters
            .values()
            .next()
            .unwrap()
            .members
            .iter()
            .map(|m| m.user_id.as_str())
            .collect();
        assert_eq!(users, ["first", "second", "third"]);
    }

    #[test]
    fn test_invalid_coordinates_never_reach_a_cluster() {
        let mut bad = report(28.0, 79.0, 5, "a");
        bad.coordinates = Coordinates {
            lat: f64::NAN,
            lng: 79.0,
        };
        let clusters = aggregate(&[bad, report(28.0, 79.0, 1, "b")]);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters.values().next().unwrap().total_report_count, 1);
    }

    #[test]
    fn test_empty_collection() {
        let clusters = aggregate(&[]);
        assert!(clusters.is_empty());
        let stats = AggregateStats::from_clusters(&clusters);
        assert_eq!(stats, AggregateStats::default());
        assert!(stats.worst_tier().is_none());
    }

    #[test]
    fn test_location_is_rounded_key() {
        let clusters = aggregate(&[report(28.123456789, 79.1, 1, "a")]);
        let only = clusters.values().next().unwrap();
        assert!((only.location.lat - 28.123457).abs() < 1e-9);
        assert_eq!(only.primary_disease(), Some("Late blight"));
    }

    #[test]
    fn test_stats() {
        let mut reports: Vec<_> = (0..10).map(|_| report(28.0, 79.0, 1, "a")).collect();
        reports.push(report(28.5, 79.5, 1, "b"));
        reports.push(report(28.6, 79.6, 3, "c"));
        let stats = AggregateStats::from_clusters(&aggregate(&reports));
        assert_eq!(stats.clusters, 3);
        assert_eq!(stats.total_reports, 14);
        assert_eq!(stats.distinct_users, 3);
        assert_eq!(stats.clusters_by_tier.get(&SeverityTier::Critical), Some(&1));
        assert_eq!(stats.clusters_by_tier.get(&SeverityTier::Medium), Some(&1));
        assert_eq!(stats.clusters_by_tier.get(&SeverityTier::Low), Some(&1));
        assert_eq!(stats.worst_tier(), Some(SeverityTier::Critical));
    }

    #[test]
    fn test_last_updated_is_latest_member() {
        use chrono::TimeZone;
        let early = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let reports = vec![
            report(28.0, 79.0, 1, "a").with_timestamp(late),
            report(28.0, 79.0, 1, "b").with_timestamp(early),
        ];
        let clusters = aggregate(&reports);
        assert_eq!(clusters.values().next().unwrap().last_updated(), Some(late));
    }
}
