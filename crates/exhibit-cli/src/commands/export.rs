//! Export command implementation

use super::read_source;
use super::source_name;
use crate::cli::ExportArgs;
use crate::decode::decode_pixels;
use crate::error::add_source_context;
use crate::output::ExportSummary;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use exhibit_core::AnalysisConfig;
use exhibit_core::EvidenceBundle;
use exhibit_core::ForensicReport;
use exhibit_core::analyze_bytes;
use exhibit_core::analyze_tamper;
use exhibit_core::evidence::CustodyLog;
use exhibit_core::evidence::bundle::CUSTODY_ENTRY;
use exhibit_core::evidence::bundle::HASHES_ENTRY;
use exhibit_core::evidence::bundle::REPORT_ENTRY;
use exhibit_core::metadata::ContainerKind;
use std::fs;
use std::path::Path;
use tracing::debug;

pub fn execute(
    args: &ExportArgs,
    config: &AnalysisConfig,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!(
            "Output file '{}' already exists\n\
             HINT: Use --force to overwrite.",
            args.output.display()
        );
    }

    let mut custody = match &args.custody_log {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Cannot read custody log '{}'", path.display()))?;
            add_source_context(CustodyLog::parse(&text), path)?
        }
        None => CustodyLog::new(),
    };

    let name = source_name(&args.source);
    let bytes = read_source(&args.source, config)?;
    let report = add_source_context(analyze_bytes(&name, &bytes, config), &args.source)?;
    custody.record(format!(
        "acquired {name} ({} bytes, sha256 {})",
        report.size, report.source_sha256
    ));

    let report = attach_pixels(report, &bytes, config, formatter);
    custody.record(format!(
        "analysed {name}: {} risk, composite {}",
        report.risk_tier, report.composite
    ));

    let mut bundle = EvidenceBundle::new(report, custody.clone());
    if args.include_source {
        bundle.add_artifact(&name, bytes);
    }
    for path in &args.artifacts {
        let context = || format!("Cannot read artifact '{}'", path.display());
        let artifact = fs::read(path).with_context(context)?;
        bundle.add_artifact(&source_name(path), artifact);
    }

    let zip = add_source_context(bundle.to_zip(), &args.source)?;
    let context = || format!("Cannot write evidence to '{}'", args.output.display());
    fs::write(&args.output, &zip).with_context(context)?;
    debug!(output = %args.output.display(), bytes = zip.len(), "evidence exported");

    let mut entries = vec![
        REPORT_ENTRY.to_string(),
        CUSTODY_ENTRY.to_string(),
        HASHES_ENTRY.to_string(),
    ];
    let artifacts = bundle.artifacts().iter().map(|a| a.entry_name());
    entries.extend(artifacts);

    let summary = ExportSummary {
        source_name: name,
        source_sha256: bundle.report().source_sha256.clone(),
        risk_tier: bundle.report().risk_tier,
        composite: bundle.report().composite,
        entries,
        custody_events: custody.events().len(),
        bytes_written: zip.len() as u64,
    };
    formatter.format_export_result(&args.output, &summary)
}

/// Adds tamper analysis when the source is a decodable image.
fn attach_pixels(
    report: ForensicReport,
    bytes: &[u8],
    config: &AnalysisConfig,
    formatter: &dyn OutputFormatter,
) -> ForensicReport {
    if report.is_archive() {
        return report;
    }
    let decodable = report.metadata.as_ref().is_some_and(|m| {
        matches!(
            m.container,
            ContainerKind::Jpeg | ContainerKind::Png | ContainerKind::WebP
        )
    });
    if !decodable {
        return report;
    }

    match decode_pixels(bytes, Path::new(&report.source_name)) {
        Ok(grid) => {
            let tamper = analyze_tamper(&grid, &config.tamper);
            report.with_tamper(tamper)
        }
        Err(err) => {
            formatter.format_warning(&format!("pixel analysis skipped: {err:#}"));
            report
        }
    }
}
