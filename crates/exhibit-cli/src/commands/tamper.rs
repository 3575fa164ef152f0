//! Tamper command implementation

use super::read_source;
use super::source_name;
use crate::cli::TamperArgs;
use crate::decode::decode_pixels;
use crate::output::OutputFormatter;
use anyhow::Result;
use exhibit_core::AnalysisConfig;
use exhibit_core::ForensicReport;
use exhibit_core::analyze_tamper;
use exhibit_core::extract_metadata;

/// Decodes the image, runs the pixel heuristics and scores it together with
/// its metadata.
pub fn execute(
    args: &TamperArgs,
    config: &AnalysisConfig,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let mut tamper_config = config.tamper.clone();
    if let Some(cells) = args.grid_cells {
        tamper_config.grid_cells = cells;
    }
    if let Some(max) = args.max_hotspots {
        tamper_config.max_hotspots = max;
    }

    let bytes = read_source(&args.image, config)?;
    let grid = decode_pixels(&bytes, &args.image)?;

    let name = source_name(&args.image);
    let report = ForensicReport::new(name.as_str(), &bytes)
        .with_metadata(extract_metadata(&bytes, Some(&name)))
        .with_tamper(analyze_tamper(&grid, &tamper_config));

    formatter.format_tamper_report(&report)
}
