//! Human-readable output formatter with colors and styling.

use super::formatter::ExportSummary;
use super::formatter::OutputFormatter;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use exhibit_core::ForensicReport;
use exhibit_core::MetadataReport;
use exhibit_core::RiskTier;
use exhibit_core::Severity;
use exhibit_core::archive::ArchiveScanResult;
use exhibit_core::archive::ParseMode;
use exhibit_core::metadata::StrippedLikelihood;
use exhibit_core::tamper::TamperReport;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn bold(&self, text: &str) -> String {
        if self.use_colors {
            style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn tier_badge(&self, tier: RiskTier) -> String {
        let label = tier.as_str().to_uppercase();
        if !self.use_colors {
            return format!("[{label}]");
        }
        let styled = match tier {
            RiskTier::Low => style(label).green(),
            RiskTier::Medium => style(label).yellow(),
            RiskTier::High => style(label).red(),
            RiskTier::Extreme => style(label).red().bold().reverse(),
        };
        format!("[{styled}]")
    }

    fn severity_label(&self, severity: Severity) -> String {
        let label = format!("{:<8}", severity.as_str().to_uppercase());
        if !self.use_colors {
            return label;
        }
        match severity {
            Severity::Info => style(label).dim().to_string(),
            Severity::Warning => style(label).yellow().to_string(),
            Severity::Critical => style(label).red().bold().to_string(),
        }
    }

    fn header(&self, report: &ForensicReport) {
        self.line(&format!(
            "{}  {}  composite {}/100",
            self.bold(&report.source_name),
            self.tier_badge(report.risk_tier),
            report.composite
        ));
        self.line(&format!("  sha256:   {}", report.source_sha256));
        self.line(&format!("  size:     {}", humanize_bytes(report.size)));
    }

    fn archive_section(&self, scan: &ArchiveScanResult) {
        let mode = match scan.parse_mode {
            ParseMode::CentralDirectory => "central directory",
            ParseMode::LocalHeaderScan => "local header scan",
            ParseMode::Invalid => "invalid",
        };
        self.line(&format!(
            "  archive:  {} entries via {}{}, trust {}/100",
            scan.entry_count(),
            mode,
            if scan.partial { " (partial)" } else { "" },
            scan.trust_score
        ));
        if self.verbose || scan.possible_bomb {
            self.line(&format!(
                "  sizes:    {} compressed, {} declared, max ratio {:.1}:1",
                humanize_bytes(scan.total_compressed),
                humanize_bytes(scan.total_uncompressed),
                scan.max_compression_ratio
            ));
        }

        if scan.findings.is_empty() {
            return;
        }
        self.line("  findings:");
        for finding in &scan.findings {
            let entry = finding
                .entry
                .as_deref()
                .map(|name| format!(" ({name})"))
                .unwrap_or_default();
            self.line(&format!(
                "    {} {}: {}{}",
                self.severity_label(finding.severity),
                finding.category,
                finding.message,
                entry
            ));
        }

        if self.verbose {
            self.line("  entries:");
            for entry in &scan.entries {
                let mut marks = Vec::new();
                if entry.encrypted {
                    marks.push("encrypted");
                }
                if entry.streamed {
                    marks.push("streamed");
                }
                self.line(&format!(
                    "    {:>10}  {}{}",
                    humanize_bytes(entry.uncompressed_size),
                    entry.name,
                    if marks.is_empty() {
                        String::new()
                    } else {
                        format!(" [{}]", marks.join(", "))
                    }
                ));
            }
        }
    }

    fn metadata_section(&self, report: &MetadataReport, all_tags: bool) {
        self.line(&format!(
            "  container: {} (declared {}, content {})",
            report.container,
            report.declared_mime.as_deref().unwrap_or("unknown"),
            report.content_mime.as_deref().unwrap_or("unknown")
        ));
        for (name, value) in report.metadata.display_fields() {
            self.line(&format!("  {name:<19} {value}"));
        }
        for flag in &report.flags {
            self.line(&format!(
                "    {} {}: {}",
                self.severity_label(flag.severity),
                flag.label,
                flag.value
            ));
        }
        if all_tags || self.verbose {
            for tag in &report.metadata.raw_tags {
                self.line(&format!("    {}:{} = {}", tag.source, tag.key, tag.value));
            }
        }
    }

    fn tamper_section(&self, tamper: &TamperReport) {
        self.line(&format!(
            "  pixels:   {}x{}, {} hotspots, {} clone signals (block {}px), tamper signal {}",
            tamper.width,
            tamper.height,
            tamper.hotspots.len(),
            tamper.clone_signal_count,
            tamper.block_size,
            tamper.tamper_signal
        ));
        for spot in &tamper.hotspots {
            self.line(&format!(
                "    hotspot at {},{} {}x{}  score {:.2}  confidence {:.0}%",
                spot.x,
                spot.y,
                spot.w,
                spot.h,
                spot.score,
                spot.confidence * 100.0
            ));
        }
        let shown = if self.verbose { tamper.clones.len() } else { 5 };
        for clone in tamper.clones.iter().take(shown) {
            self.line(&format!(
                "    clone {},{} -> {},{}  confidence {:.0}%",
                clone.source.x,
                clone.source.y,
                clone.target.x,
                clone.target.y,
                clone.confidence * 100.0
            ));
        }
    }

    fn authenticity_section(&self, report: &ForensicReport) {
        let Some(authenticity) = &report.authenticity else {
            return;
        };
        self.line(&format!("  authenticity: {}/100", authenticity.score));
        if self.verbose {
            for row in &authenticity.breakdown {
                let (weight, label, detail) = (row.weight, &row.label, &row.detail);
                self.line(&format!("    -{weight:<3} {label} ({detail})"));
            }
        }
    }

    fn report(&self, report: &ForensicReport) {
        self.header(report);
        if let Some(scan) = &report.archive {
            self.archive_section(scan);
        }
        if let Some(metadata) = &report.metadata {
            self.metadata_section(metadata, false);
        }
        if let Some(tamper) = &report.tamper {
            self.tamper_section(tamper);
        }
        self.authenticity_section(report);
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_scan_results(&self, reports: &[ForensicReport]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for (index, report) in reports.iter().enumerate() {
            if index > 0 {
                self.line("");
            }
            self.report(report);
        }

        if reports.len() > 1 {
            let worst = reports
                .iter()
                .map(|r| r.risk_tier)
                .max()
                .unwrap_or(RiskTier::Low);
            self.line("");
            self.line(&format!(
                "Scanned {} files, highest risk {}",
                reports.len(),
                self.tier_badge(worst)
            ));
        }
        Ok(())
    }

    fn format_metadata_report(
        &self,
        source: &Path,
        report: &MetadataReport,
        all_tags: bool,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let name = source.display().to_string();
        self.line(&self.bold(&name));
        self.metadata_section(report, all_tags);
        self.line(&format!(
            "  stripped likelihood: {}",
            match report.stripped_likelihood {
                StrippedLikelihood::Low => "low",
                StrippedLikelihood::High => "high",
            }
        ));
        Ok(())
    }

    fn format_tamper_report(&self, report: &ForensicReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.report(report);
        Ok(())
    }

    fn format_export_result(&self, output: &Path, summary: &ExportSummary) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            self.line(&format!(
                "{} Evidence written: {}",
                style("✓").green().bold(),
                output.display()
            ));
        } else {
            self.line(&format!("Evidence written: {}", output.display()));
        }

        self.line(&format!(
            "  Source:          {} {}",
            summary.source_name,
            self.tier_badge(summary.risk_tier)
        ));
        self.line(&format!("  SHA-256:         {}", summary.source_sha256));
        self.line(&format!("  Custody events:  {}", summary.custody_events));
        self.line(&format!(
            "  Bundle size:     {}",
            humanize_bytes(summary.bytes_written)
        ));
        if self.verbose {
            for entry in &summary.entries {
                self.line(&format!("    {entry}"));
            }
        }
        Ok(())
    }

    fn format_error(&self, _operation: &str, _error: &anyhow::Error) {
        // anyhow reports the error chain on stderr when main returns.
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_colors {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARNING:".to_string()
        };
        let _ = Term::stderr().write_line(&format!("{prefix} {message}"));
    }
}
