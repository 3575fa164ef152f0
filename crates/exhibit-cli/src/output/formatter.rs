//! Output formatter trait for CLI results.

use anyhow::Result;
use exhibit_core::ForensicReport;
use exhibit_core::MetadataReport;
use exhibit_core::RiskTier;
use serde::Serialize;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the reports of a scan, one per input file
    fn format_scan_results(&self, reports: &[ForensicReport]) -> Result<()>;

    /// Format extracted metadata for one image
    fn format_metadata_report(
        &self,
        source: &Path,
        report: &MetadataReport,
        all_tags: bool,
    ) -> Result<()>;

    /// Format a report that carries tamper analysis
    fn format_tamper_report(&self, report: &ForensicReport) -> Result<()>;

    /// Format the outcome of an evidence export
    fn format_export_result(&self, output: &Path, summary: &ExportSummary) -> Result<()>;

    /// Format a failed command
    fn format_error(&self, operation: &str, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// What an export wrote, for display.
#[derive(Debug, Serialize)]
pub struct ExportSummary {
    pub source_name: String,
    pub source_sha256: String,
    pub risk_tier: RiskTier,
    pub composite: u8,
    pub entries: Vec<String>,
    pub custody_events: usize,
    pub bytes_written: u64,
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> JsonOutput<()> {
        JsonOutput {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
