//! Risk tier classification.

use serde::Serialize;

use crate::archive::ArchiveScanResult;

/// Composite score at or above which a document is medium risk.
pub const MEDIUM_THRESHOLD: u8 = 35;
/// Composite score at or above which a document is high risk.
pub const HIGH_THRESHOLD: u8 = 60;
/// Composite score at or above which a document is extreme risk.
pub const EXTREME_THRESHOLD: u8 = 85;
/// Composite score that escalates an archive to extreme.
pub const ARCHIVE_EXTREME_COMPOSITE: u8 = 90;
/// Trust score at or below which an archive is extreme.
pub const ARCHIVE_EXTREME_TRUST: u8 = 35;
/// Critical archive signal classes that escalate to extreme.
pub const ARCHIVE_EXTREME_SIGNALS: usize = 2;

/// Overall risk, totally ordered from `Low` to `Extreme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// Nothing notable.
    Low,
    /// Worth a second look.
    Medium,
    /// Likely manipulated or hazardous.
    High,
    /// Do not open or trust.
    Extreme,
}

impl RiskTier {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Extreme => "extreme",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Archive-specific inputs to risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArchiveRisk {
    /// Structural trust score from the inspector.
    pub trust_score: u8,
    /// Number of critical signal classes present.
    pub critical_signals: usize,
}

impl ArchiveRisk {
    /// Extracts the risk inputs from a scan.
    #[must_use]
    pub fn from_scan(scan: &ArchiveScanResult) -> Self {
        Self {
            trust_score: scan.trust_score,
            critical_signals: scan.critical_signal_count(),
        }
    }
}

/// Maps a composite risk score (0–100, higher is riskier) to a tier.
///
/// Archive-origin input escalates to `Extreme` when trust is at most 35,
/// two or more critical signal classes are present, or the composite
/// reaches 90.
///
/// # Examples
///
/// ```
/// use exhibit_core::scoring::ArchiveRisk;
/// use exhibit_core::scoring::RiskTier;
/// use exhibit_core::scoring::classify_risk;
///
/// assert_eq!(classify_risk(10, None), RiskTier::Low);
/// assert_eq!(classify_risk(60, None), RiskTier::High);
///
/// let archive = ArchiveRisk { trust_score: 62, critical_signals: 2 };
/// assert_eq!(classify_risk(38, Some(archive)), RiskTier::Extreme);
/// ```
#[must_use]
pub fn classify_risk(composite: u8, archive: Option<ArchiveRisk>) -> RiskTier {
    if let Some(archive) = archive
        && (archive.trust_score <= ARCHIVE_EXTREME_TRUST
            || archive.critical_signals >= ARCHIVE_EXTREME_SIGNALS
            || composite >= ARCHIVE_EXTREME_COMPOSITE)
    {
        return RiskTier::Extreme;
    }

    match composite {
        c if c >= EXTREME_THRESHOLD => RiskTier::Extreme,
        c if c >= HIGH_THRESHOLD => RiskTier::High,
        c if c >= MEDIUM_THRESHOLD => RiskTier::Medium,
        _ => RiskTier::Low,
    }
}

/// Composite risk implied by an archive trust score.
#[must_use]
pub const fn composite_from_trust(trust_score: u8) -> u8 {
    100u8.saturating_sub(trust_score)
}

/// Composite risk implied by an authenticity score.
#[must_use]
pub const fn composite_from_authenticity(score: u8) -> u8 {
    100u8.saturating_sub(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_thresholds() {
        assert_eq!(classify_risk(0, None), RiskTier::Low);
        assert_eq!(classify_risk(34, None), RiskTier::Low);
        assert_eq!(classify_risk(35, None), RiskTier::Medium);
        assert_eq!(classify_risk(59, None), RiskTier::Medium);
        assert_eq!(classify_risk(60, None), RiskTier::High);
        assert_eq!(classify_risk(84, None), RiskTier::High);
        assert_eq!(classify_risk(85, None), RiskTier::Extreme);
        assert_eq!(classify_risk(100, None), RiskTier::Extreme);
    }

    #[test]
    fn test_archive_escalation() {
        let low_trust = ArchiveRisk {
            trust_score: 35,
            critical_signals: 0,
        };
        assert_eq!(classify_risk(0, Some(low_trust)), RiskTier::Extreme);

        let one_signal = ArchiveRisk {
            trust_score: 78,
            critical_signals: 1,
        };
        assert_eq!(classify_risk(22, Some(one_signal)), RiskTier::Low);

        let two_signals = ArchiveRisk {
            critical_signals: 2,
            ..one_signal
        };
        assert_eq!(classify_risk(22, Some(two_signals)), RiskTier::Extreme);
    }

    #[test]
    fn test_tiers_monotonic_in_composite() {
        let archive = ArchiveRisk {
            trust_score: 80,
            critical_signals: 1,
        };
        for context in [None, Some(archive)] {
            let tiers: Vec<_> = (0..=100).map(|c| classify_risk(c, context)).collect();
            assert!(tiers.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_composites() {
        assert_eq!(composite_from_trust(96), 4);
        assert_eq!(composite_from_trust(12), 88);
        assert_eq!(composite_from_authenticity(99), 1);
        assert_eq!(composite_from_authenticity(200), 0);
    }

    #[test]
    fn test_tier_ordering_and_display() {
        assert!(RiskTier::Low < RiskTier::Medium);
        assert!(RiskTier::High < RiskTier::Extreme);
        assert_eq!(RiskTier::Extreme.to_string(), "extreme");
    }
}
