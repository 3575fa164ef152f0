//! Metadata command implementation

use super::read_source;
use super::source_name;
use crate::cli::MetadataArgs;
use crate::output::OutputFormatter;
use anyhow::Result;
use exhibit_core::AnalysisConfig;
use exhibit_core::extract_metadata;
use exhibit_core::metadata::ContainerKind;

pub fn execute(
    args: &MetadataArgs,
    config: &AnalysisConfig,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let bytes = read_source(&args.image, config)?;
    let report = extract_metadata(&bytes, Some(&source_name(&args.image)));

    if report.container == ContainerKind::Unknown {
        formatter.format_warning(&format!(
            "'{}' is not a JPEG, PNG, WebP or TIFF image; no metadata recovered",
            args.image.display()
        ));
    }

    formatter.format_metadata_report(&args.image, &report, args.all)
}
