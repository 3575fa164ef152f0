//! Archive member and scan result types.

use serde::Serialize;

use crate::types::Finding;
use crate::types::FindingCategory;
use crate::types::Severity;

/// Trust score assigned to input that fails the ZIP signature check.
pub const INVALID_TRUST_SCORE: u8 = 12;

/// One archive member as declared by its headers.
///
/// Sizes are the values the archive claims; nothing is decompressed to
/// confirm them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZipEntry {
    /// Entry name exactly as stored (decoded, not normalized).
    pub name: String,

    /// Declared compressed size in bytes.
    pub compressed_size: u64,

    /// Declared uncompressed size in bytes.
    pub uncompressed_size: u64,

    /// Encryption flag (general purpose bit 0).
    pub encrypted: bool,

    /// Sizes are deferred to a data descriptor (general purpose bit 3).
    ///
    /// When the entry came from the local-header fallback walk its sizes are
    /// usually zero and must not be trusted.
    pub streamed: bool,
}

impl ZipEntry {
    /// Returns `true` if the entry names a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/') || self.name.ends_with('\\')
    }

    /// Declared expansion ratio, or `None` when either size is zero.
    #[must_use]
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.compressed_size == 0 || self.uncompressed_size == 0 {
            return None;
        }
        Some(self.uncompressed_size as f64 / self.compressed_size as f64)
    }
}

/// How the entry list was recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Entries came from the central directory.
    CentralDirectory,
    /// Central directory unusable; entries came from scanning local headers.
    LocalHeaderScan,
    /// Not a ZIP container; nothing was parsed.
    Invalid,
}

/// Outcome of a structural archive scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveScanResult {
    /// Input carried a ZIP signature at offset 0.
    pub valid_zip: bool,

    /// Where the entry list came from.
    pub parse_mode: ParseMode,

    /// The walk stopped early on an inconsistent record.
    pub partial: bool,

    /// Entry count declared by the EOCD record, if one was found.
    pub declared_entry_count: Option<usize>,

    /// Decoded entries in directory order.
    pub entries: Vec<ZipEntry>,

    /// Entries with the encryption flag set.
    pub encrypted_count: usize,

    /// Entries whose names escape the extraction root.
    pub traversal_count: usize,

    /// Entries disguising an executable behind a document extension.
    pub double_extension_count: usize,

    /// Executable or script entries.
    pub high_risk_file_count: usize,

    /// Macro-enabled Office documents.
    pub macro_file_count: usize,

    /// Archives nested inside this archive.
    pub nested_archive_count: usize,

    /// Sum of declared compressed sizes.
    pub total_compressed: u64,

    /// Sum of declared uncompressed sizes.
    pub total_uncompressed: u64,

    /// Largest single-entry expansion ratio.
    pub max_compression_ratio: f64,

    /// Bomb heuristics fired.
    pub possible_bomb: bool,

    /// Structural trust in `[10, 96]`; higher is safer.
    pub trust_score: u8,

    /// Observations in a deterministic order.
    pub findings: Vec<Finding>,
}

impl ArchiveScanResult {
    /// Result for input that failed the signature check.
    #[must_use]
    pub fn invalid() -> Self {
        Self {
            valid_zip: false,
            parse_mode: ParseMode::Invalid,
            partial: false,
            declared_entry_count: None,
            entries: Vec::new(),
            encrypted_count: 0,
            traversal_count: 0,
            double_extension_count: 0,
            high_risk_file_count: 0,
            macro_file_count: 0,
            nested_archive_count: 0,
            total_compressed: 0,
            total_uncompressed: 0,
            max_compression_ratio: 0.0,
            possible_bomb: false,
            trust_score: INVALID_TRUST_SCORE,
            findings: vec![Finding::new(
                Severity::Critical,
                FindingCategory::Structure,
                "No ZIP signature at offset 0; structure cannot be trusted. Do not extract.",
            )],
        }
    }

    /// Number of decoded entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of critical signal classes present.
    ///
    /// Counts invalid structure, path traversal, bomb indicators, double
    /// extensions and executable payloads, one each regardless of how many
    /// entries trigger them.
    #[must_use]
    pub fn critical_signal_count(&self) -> usize {
        [
            !self.valid_zip,
            self.traversal_count > 0,
            self.possible_bomb,
            self.double_extension_count > 0,
            self.high_risk_file_count > 0,
        ]
        .into_iter()
        .filter(|&present| present)
        .count()
    }

    /// Highest severity among the findings.
    #[must_use]
    pub fn max_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }
}
