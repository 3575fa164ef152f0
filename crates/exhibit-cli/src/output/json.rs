//! JSON output formatter for machine-readable results.

use super::formatter::ExportSummary;
use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use exhibit_core::ForensicReport;
use exhibit_core::MetadataReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_scan_results(&self, reports: &[ForensicReport]) -> Result<()> {
        Self::output(&JsonOutput::success("scan", reports))
    }

    fn format_metadata_report(
        &self,
        source: &Path,
        report: &MetadataReport,
        _all_tags: bool,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct MetadataOutput<'a> {
            source: String,
            #[serde(flatten)]
            report: &'a MetadataReport,
        }

        let data = MetadataOutput {
            source: source.display().to_string(),
            report,
        };
        Self::output(&JsonOutput::success("metadata", data))
    }

    fn format_tamper_report(&self, report: &ForensicReport) -> Result<()> {
        Self::output(&JsonOutput::success("tamper", report))
    }

    fn format_export_result(&self, output: &Path, summary: &ExportSummary) -> Result<()> {
        #[derive(Serialize)]
        struct ExportOutput<'a> {
            output_path: String,
            #[serde(flatten)]
            summary: &'a ExportSummary,
        }

        let data = ExportOutput {
            output_path: output.display().to_string(),
            summary,
        };
        Self::output(&JsonOutput::success("export", data))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let report = ForensicReport::new("a.bin", b"abc");
        let json = serde_json::to_value(JsonOutput::success("scan", [&report])).unwrap();
        assert_eq!(json["operation"], "scan");
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"][0]["source_name"], "a.bin");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_envelope() {
        let json = serde_json::to_value(JsonOutput::<()>::error("export", "boom")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "boom");
        assert!(json.get("data").is_none());
    }
}
