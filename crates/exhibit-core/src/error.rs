//! Error types for forensic analysis operations.
//!
//! Malformed or adversarial input is never an error: parsers report it inside
//! their result types. The variants here cover conditions the caller has to
//! act on (bad arguments, I/O, serialization, writer limits).

use thiserror::Error;

/// Result type alias using `ForensicError`.
pub type Result<T> = std::result::Result<T, ForensicError>;

/// Errors that can occur during analysis or evidence export.
#[derive(Error, Debug)]
pub enum ForensicError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Pixel buffer does not match the declared dimensions.
    #[error("invalid pixel grid: {width}x{height} needs {expected} bytes, got {actual}")]
    InvalidPixelGrid {
        /// Declared width in pixels.
        width: u32,
        /// Declared height in pixels.
        height: u32,
        /// Byte length required for RGBA data.
        expected: usize,
        /// Byte length supplied.
        actual: usize,
    },

    /// Input exceeds the configured analysis size cap.
    #[error("input too large: {size} bytes exceeds limit of {max} bytes")]
    InputTooLarge {
        /// Input size in bytes.
        size: u64,
        /// Configured maximum in bytes.
        max: u64,
    },

    /// Archive entry name cannot be encoded in a ZIP header.
    #[error("archive entry name too long: {len} bytes (max 65535)")]
    EntryNameTooLong {
        /// Name length in bytes.
        len: usize,
    },

    /// Archive entry payload exceeds the 32-bit ZIP size field.
    #[error("archive entry '{name}' too large: {size} bytes (ZIP64 not supported)")]
    EntryTooLarge {
        /// Entry name.
        name: String,
        /// Payload size in bytes.
        size: u64,
    },

    /// Chain-of-custody line could not be parsed.
    #[error("invalid custody log entry on line {line}: {reason}")]
    InvalidCustodyEntry {
        /// One-based line number.
        line: usize,
        /// Why the line was rejected.
        reason: String,
    },

    /// Archive holds more entries than a 16-bit EOCD count allows.
    #[error("too many archive entries: {count} (max 65535)")]
    TooManyEntries {
        /// Number of entries requested.
        count: usize,
    },
}

impl ForensicError {
    /// Returns `true` if the error was caused by caller-supplied input rather
    /// than the environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use exhibit_core::ForensicError;
    ///
    /// let err = ForensicError::InputTooLarge { size: 10, max: 5 };
    /// assert!(err.is_input_error());
    ///
    /// let err = ForensicError::Io(std::io::Error::other("disk"));
    /// assert!(!err.is_input_error());
    /// ```
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPixelGrid { .. }
                | Self::InputTooLarge { .. }
                | Self::EntryNameTooLong { .. }
                | Self::EntryTooLarge { .. }
                | Self::TooManyEntries { .. }
                | Self::InvalidCustodyEntry { .. }
        )
    }
}
