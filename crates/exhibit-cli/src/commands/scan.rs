//! Scan command implementation

use super::read_source;
use super::source_name;
use crate::cli::ScanArgs;
use crate::error::add_source_context;
use crate::output::OutputFormatter;
use crate::progress::ScanProgress;
use anyhow::Result;
use exhibit_core::AnalysisConfig;
use exhibit_core::RiskTier;
use exhibit_core::analyze_bytes;
use tracing::debug;

/// Analyses every file and returns the highest risk tier seen.
pub fn execute(
    args: &ScanArgs,
    config: &AnalysisConfig,
    hide_progress: bool,
    formatter: &dyn OutputFormatter,
) -> Result<RiskTier> {
    let mut config = config.clone();
    if let Some(ratio) = args.max_compression_ratio {
        config.inspection.max_compression_ratio = ratio;
    }

    let mut progress = (!hide_progress && args.files.len() > 1 && ScanProgress::should_show())
        .then(|| ScanProgress::new(args.files.len()));

    let mut reports = Vec::with_capacity(args.files.len());
    for path in &args.files {
        if let Some(progress) = &progress {
            progress.on_file_start(path);
        }

        let bytes = read_source(path, &config)?;
        let report = add_source_context(analyze_bytes(&source_name(path), &bytes, &config), path)?;
        debug!(path = %path.display(), tier = %report.risk_tier, "scanned");

        if let Some(progress) = &mut progress {
            progress.on_file_complete(report.size);
        }
        reports.push(report);
    }
    drop(progress);

    formatter.format_scan_results(&reports)?;

    Ok(reports
        .iter()
        .map(|report| report.risk_tier)
        .max()
        .unwrap_or(RiskTier::Low))
}
