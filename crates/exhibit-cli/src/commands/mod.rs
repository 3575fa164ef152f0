//! Subcommand implementations.

pub mod completion;
pub mod export;
pub mod metadata;
pub mod scan;
pub mod tamper;

use crate::error::convert_forensic_error;
use anyhow::Context;
use anyhow::Result;
use exhibit_core::AnalysisConfig;
use exhibit_core::ForensicError;
use std::fs;
use std::path::Path;

/// Reads `path` after checking its size against the configured cap.
pub fn read_source(path: &Path, config: &AnalysisConfig) -> Result<Vec<u8>> {
    let context = || format!("Cannot read '{}'", path.display());
    let size = fs::metadata(path).with_context(context)?.len();
    if size > config.max_input_bytes {
        return Err(convert_forensic_error(
            ForensicError::InputTooLarge {
                size,
                max: config.max_input_bytes,
            },
            path,
        ));
    }
    fs::read(path).with_context(context)
}

/// Name handed to the core: the file name, which drives routing and MIME
/// mismatch checks.
pub fn source_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
