//! High-level public API for forensic analysis.

use std::path::Path;

use tracing::debug;

use crate::AnalysisConfig;
use crate::ForensicError;
use crate::Result;
use crate::archive::has_zip_signature;
use crate::archive::inspect_archive;
use crate::evidence::ForensicReport;
use crate::metadata::extract_metadata;

/// Extensions of ZIP-based formats, routed to the archive inspector even
/// when the signature is missing.
const ZIP_FAMILY_EXTENSIONS: &[&str] = &[
    "zip", "jar", "apk", "docx", "docm", "xlsx", "xlsm", "pptx", "pptm", "odt", "ods", "odp",
    "epub",
];

/// Analyses an untrusted buffer.
///
/// ZIP input (by signature, or by a ZIP-family extension on `name`) goes to
/// the archive inspector; everything else to the metadata extractor, with
/// `name` used as the declared type. Attach tamper analysis afterwards with
/// [`ForensicReport::with_tamper`].
///
/// # Arguments
///
/// * `name` - Source name, used for routing and MIME mismatch checks
/// * `bytes` - Source contents
/// * `config` - Analysis configuration
///
/// # Errors
///
/// Returns [`ForensicError::InputTooLarge`] if `bytes` exceeds
/// `config.max_input_bytes`. Malformed input is never an error.
///
/// # Examples
///
/// ```
/// use exhibit_core::AnalysisConfig;
/// use exhibit_core::analyze_bytes;
/// use exhibit_core::archive::ArchiveWriter;
/// use exhibit_core::scoring::RiskTier;
///
/// # fn main() -> Result<(), exhibit_core::ForensicError> {
/// let mut writer = ArchiveWriter::new();
/// writer.add("invoice.pdf.exe", b"")?;
/// let zip = writer.finish()?;
///
/// let report = analyze_bytes("invoice.zip", &zip, &AnalysisConfig::default())?;
/// assert!(report.is_archive());
/// assert_eq!(report.risk_tier, RiskTier::Extreme);
/// # Ok(())
/// # }
/// ```
pub fn analyze_bytes(name: &str, bytes: &[u8], config: &AnalysisConfig) -> Result<ForensicReport> {
    let size = bytes.len() as u64;
    if size > config.max_input_bytes {
        return Err(ForensicError::InputTooLarge {
            size,
            max: config.max_input_bytes,
        });
    }

    let report = ForensicReport::new(name, bytes);
    let report = if has_zip_signature(bytes) || is_zip_family_name(name) {
        debug!(name, size, "analysing as archive");
        report.with_archive(inspect_archive(bytes, &config.inspection))
    } else {
        debug!(name, size, "analysing as image/document");
        report.with_metadata(extract_metadata(bytes, Some(name)))
    };

    debug!(name, tier = %report.risk_tier, composite = report.composite, "analysis complete");
    Ok(report)
}

/// Returns `true` if `name` carries a ZIP-family extension.
#[must_use]
pub fn is_zip_family_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ZIP_FAMILY_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::archive::ParseMode;
    use crate::metadata::ContainerKind;
    use crate::scoring::RiskTier;

    #[test]
    fn test_rejects_oversized_input() {
        let config = AnalysisConfig {
            max_input_bytes: 4,
            ..Default::default()
        };
        let err = analyze_bytes("a.bin", b"12345", &config).unwrap_err();
        assert!(matches!(
            err,
            ForensicError::InputTooLarge { size: 5, max: 4 }
        ));
    }

    #[test]
    fn test_zip_extension_without_signature_is_invalid_archive() {
        let config = AnalysisConfig::default();
        let report = analyze_bytes("docs.ZIP", b"garbage", &config).unwrap();
        let scan = report.archive.as_ref().unwrap();
        assert_eq!(scan.parse_mode, ParseMode::Invalid);
        assert_eq!(scan.trust_score, 12);
        assert_eq!(report.risk_tier, RiskTier::Extreme);
    }

    #[test]
    fn test_non_archive_routed_to_metadata() {
        let config = AnalysisConfig::default();
        let report = analyze_bytes("scan.pdf", b"%PDF-1.7\n", &config).unwrap();
        let metadata = report.metadata.as_ref().unwrap();
        assert_eq!(metadata.container, ContainerKind::Unknown);
        assert_eq!(metadata.content_mime.as_deref(), Some("application/pdf"));
        assert!(metadata.flags.is_empty());
        assert_eq!(report.risk_tier, RiskTier::Low);
    }

    #[test]
    fn test_zip_family_names() {
        assert!(is_zip_family_name("report.docx"));
        assert!(is_zip_family_name("APP.APK"));
        assert!(!is_zip_family_name("photo.jpg"));
        assert!(!is_zip_family_name("zip"));
    }
}
