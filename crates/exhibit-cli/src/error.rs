//! Error conversion utilities for CLI.
//!
//! Converts exhibit-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use exhibit_core::ForensicError;
use std::path::Path;

/// Converts `ForensicError` to user-friendly anyhow error with context
pub fn convert_forensic_error(err: ForensicError, source: &Path) -> anyhow::Error {
    match err {
        ForensicError::InputTooLarge { size, max } => {
            anyhow!(
                "Input '{}' is too large: {} bytes (limit {} bytes)\n\
                 HINT: Use --max-input-size to raise the limit if the source is trusted.",
                source.display(),
                size,
                max
            )
        }
        ForensicError::InvalidCustodyEntry { line, reason } => {
            anyhow!(
                "Invalid chain-of-custody log '{}' at line {}: {}\n\
                 HINT: Each line must be an RFC 3339 timestamp followed by a space and the action.",
                source.display(),
                line,
                reason
            )
        }
        ForensicError::InvalidPixelGrid { width, height, .. } => {
            anyhow!(
                "Decoded image '{}' has inconsistent pixel data ({}x{})\n\
                 HINT: The image may be corrupted or use an unsupported layout.",
                source.display(),
                width,
                height
            )
        }
        ForensicError::EntryNameTooLong { .. }
        | ForensicError::EntryTooLarge { .. }
        | ForensicError::TooManyEntries { .. } => {
            anyhow!(
                "Cannot package evidence for '{}': {}\n\
                 HINT: Evidence bundles are plain ZIP (no ZIP64); split large artifacts.",
                source.display(),
                err
            )
        }
        ForensicError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {}",
                source.display(),
                io_err
            )
        }
        ForensicError::Serialization(_) => {
            let context = format!("Error serializing report for '{}'", source.display());
            anyhow::Error::from(err).context(context)
        }
    }
}

/// Adds context to a core result about the given source
pub fn add_source_context<T>(
    result: Result<T, ForensicError>,
    source: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_forensic_error(e, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_convert_input_too_large() {
        let err = ForensicError::InputTooLarge { size: 10, max: 5 };
        let converted = convert_forensic_error(err, Path::new("huge.zip"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("huge.zip"));
        assert!(msg.contains("--max-input-size"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_custody_error() {
        let err = ForensicError::InvalidCustodyEntry {
            line: 3,
            reason: "missing action".to_string(),
        };
        let converted = convert_forensic_error(err, Path::new("custody.log"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("line 3"));
        assert!(msg.contains("RFC 3339"));
    }

    #[test]
    fn test_convert_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let converted = convert_forensic_error(ForensicError::Io(io_err), Path::new("a.jpg"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("I/O error"));
    }
}
