//! Severity classification of a cluster by its total report count.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Radius of a single-report cluster before the per-report increment.
pub const BASE_RADIUS: u32 = 150;

/// Radius added per report.
pub const PER_REPORT_INCREMENT: u32 = 30;

/// Largest radius a cluster is drawn with.
pub const CAP_RADIUS: u32 = 500;

/// Ordered severity tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityTier {
    /// A single report.
    Low,
    /// 2 to 4 reports.
    Medium,
    /// 5 to 9 reports.
    High,
    /// 10 or more reports.
    Critical,
}

impl SeverityTier {
    /// All tiers, lowest first.
    pub const ALL: [SeverityTier; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Tier for a total report count.
    pub fn for_count(total_report_count: u64) -> Self {
        match total_report_count {
            0..=1 => Self::Low,
            2..=4 => Self::Medium,
            5..=9 => Self::High,
            _ => Self::Critical,
        }
    }

    /// Display label, e.g. `"CRITICAL"`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// Legend text describing the count range of the tier.
    pub fn legend(&self) -> &'static str {
        match self {
            Self::Low => "1 report",
            Self::Medium => "2-4 reports",
            Self::High => "5-9 reports",
            Self::Critical => "10+ reports",
        }
    }

    /// Color of the tier.
    pub fn color(&self) -> SeverityColor {
        match self {
            Self::Low => SeverityColor::Green,
            Self::Medium => SeverityColor::Yellow,
            Self::High => SeverityColor::Orange,
            Self::Critical => SeverityColor::Red,
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Hue a tier is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityColor {
    /// `#4caf50`
    Green,
    /// `#ffeb3b`
    Yellow,
    /// `#ff9800`
    Orange,
    /// `#d32f2f`
    Red,
}

impl SeverityColor {
    /// CSS hex value of the color.
    pub fn hex(&self) -> &'static str {
        match self {
            Self::Green => "#4caf50",
            Self::Yellow => "#ffeb3b",
            Self::Orange => "#ff9800",
            Self::Red => "#d32f2f",
        }
    }
}

impl fmt::Display for SeverityColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hex())
    }
}

/// Classification of a cluster: tier, color and display radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Severity {
    /// Severity tier.
    pub tier: SeverityTier,
    /// Render color.
    pub color: SeverityColor,
    /// Display radius in map units.
    pub radius: u32,
}

/// Display radius for a total report count.
pub fn radius_for(total_report_count: u64) -> u32 {
    let grown = u64::from(PER_REPORT_INCREMENT)
        .saturating_mul(total_report_count)
        .saturating_add(u64::from(BASE_RADIUS));
    // Capped at CAP_RADIUS, so the conversion cannot truncate.
    grown.min(u64::from(CAP_RADIUS)) as u32
}

/// Classifies a cluster by its total report count.
///
/// # Examples
///
/// ```
/// use fieldwatch_core::{severity, SeverityTier};
///
/// let s = severity(2);
/// assert_eq!(s.tier, SeverityTier::Medium);
/// assert_eq!(s.radius, 210);
/// ```
pub fn severity(total_report_count: u64) -> Severity {
    let tier = SeverityTier::for_count(total_report_count);
    Severity {
        tier,
        color: tier.color(),
        radius: radius_for(total_report_count),
    }
}
