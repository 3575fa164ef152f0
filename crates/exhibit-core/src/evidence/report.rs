//! Combined forensic report for one source.

use serde::Serialize;

use crate::archive::ArchiveScanResult;
use crate::hashing::sha256_hex;
use crate::metadata::MetadataReport;
use crate::scoring::ArchiveRisk;
use crate::scoring::AuthenticityInputs;
use crate::scoring::AuthenticityScore;
use crate::scoring::RiskTier;
use crate::scoring::classify_risk;
use crate::scoring::composite_from_authenticity;
use crate::scoring::composite_from_trust;
use crate::scoring::score_authenticity;
use crate::tamper::TamperReport;

/// Everything the engine concluded about one input.
///
/// The authenticity score, composite and risk tier are recomputed whenever
/// an analysis is attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForensicReport {
    /// Caller-supplied name of the source.
    pub source_name: String,
    /// SHA-256 of the source bytes.
    pub source_sha256: String,
    /// Source size in bytes.
    pub size: u64,
    /// Archive scan, for ZIP input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveScanResult>,
    /// Metadata extraction, for non-archive input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataReport>,
    /// Pixel-domain analysis, when the caller decoded the image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tamper: Option<TamperReport>,
    /// Authenticity score, for non-archive input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticity: Option<AuthenticityScore>,
    /// Composite risk score, 0–100, higher is riskier.
    pub composite: u8,
    /// Final tier.
    pub risk_tier: RiskTier,
}

impl ForensicReport {
    /// Starts a report for `bytes`, with no analysis attached yet.
    #[must_use]
    pub fn new(source_name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            source_name: source_name.into(),
            source_sha256: sha256_hex(bytes),
            size: bytes.len() as u64,
            archive: None,
            metadata: None,
            tamper: None,
            authenticity: None,
            composite: 0,
            risk_tier: RiskTier::Low,
        }
    }

    /// Attaches an archive scan.
    #[must_use]
    pub fn with_archive(mut self, scan: ArchiveScanResult) -> Self {
        self.archive = Some(scan);
        self.assess();
        self
    }

    /// Attaches a metadata report.
    #[must_use]
    pub fn with_metadata(mut self, metadata: MetadataReport) -> Self {
        self.metadata = Some(metadata);
        self.assess();
        self
    }

    /// Attaches a tamper report.
    #[must_use]
    pub fn with_tamper(mut self, tamper: TamperReport) -> Self {
        self.tamper = Some(tamper);
        self.assess();
        self
    }

    /// Returns `true` if the source was analysed as an archive.
    #[must_use]
    pub const fn is_archive(&self) -> bool {
        self.archive.is_some()
    }

    fn assess(&mut self) {
        if let Some(scan) = &self.archive {
            self.composite = composite_from_trust(scan.trust_score);
            self.risk_tier = classify_risk(self.composite, Some(ArchiveRisk::from_scan(scan)));
            return;
        }

        let inputs = AuthenticityInputs::from_reports(self.metadata.as_ref(), self.tamper.as_ref());
        let authenticity = score_authenticity(&inputs);
        self.composite = composite_from_authenticity(authenticity.score);
        self.risk_tier = classify_risk(self.composite, None);
        self.authenticity = Some(authenticity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InspectionConfig;
    use crate::archive::inspect_archive;
    use crate::metadata::extract_metadata;

    #[test]
    fn test_new_report_hashes_source() {
        let report = ForensicReport::new("a.bin", b"abc");
        assert_eq!(report.size, 3);
        assert!(report.source_sha256.starts_with("ba7816bf"));
        assert_eq!(report.risk_tier, RiskTier::Low);
    }

    #[test]
    fn test_invalid_archive_is_extreme() {
        let scan = inspect_archive(b"not a zip", &InspectionConfig::default());
        let report = ForensicReport::new("x.zip", b"not a zip").with_archive(scan);
        assert_eq!(report.composite, 88);
        assert_eq!(report.risk_tier, RiskTier::Extreme);
        assert!(report.authenticity.is_none());
    }

    #[test]
    fn test_image_report_scores_authenticity() {
        let bytes = [0xFF, 0xD8, 0xFF, 0xD9];
        let metadata = extract_metadata(&bytes, Some("p.jpg"));
        let report = ForensicReport::new("p.jpg", &bytes).with_metadata(metadata);
        // Stripped warning costs 6 points: 100 - 6 = 94.
        let authenticity = report.authenticity.as_ref().map(|a| a.score);
        assert_eq!(authenticity, Some(94));
        assert_eq!(report.composite, 6);
        assert_eq!(report.risk_tier, RiskTier::Low);
    }

    #[test]
    fn test_serialization_skips_missing_sections() {
        let report = ForensicReport::new("a", b"");
        let json = serde_json::to_value(&report).unwrap_or_default();
        assert!(json.get("archive").is_none());
        assert_eq!(json["risk_tier"], "low");
    }
}
