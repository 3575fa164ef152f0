//! Structured archive findings.

use serde::Serialize;

use crate::types::Severity;

/// Category of an archive finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    /// Container structure (signature, directory walk).
    Structure,
    /// Encrypted members.
    Encryption,
    /// Zip-slip style entry names.
    PathTraversal,
    /// Document extension disguising an executable.
    DoubleExtension,
    /// Executable or script payloads.
    Executable,
    /// Macro-enabled Office documents.
    Macro,
    /// Archives nested inside the archive.
    NestedArchive,
    /// Decompression-bomb indicators.
    ArchiveBomb,
}

impl std::fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Structure => "structure",
            Self::Encryption => "encryption",
            Self::PathTraversal => "path traversal",
            Self::DoubleExtension => "double extension",
            Self::Executable => "executable",
            Self::Macro => "macro",
            Self::NestedArchive => "nested archive",
            Self::ArchiveBomb => "archive bomb",
        };
        f.write_str(label)
    }
}

/// One human-readable observation produced by the archive inspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// How serious the observation is.
    pub severity: Severity,

    /// What kind of signal produced it.
    pub category: FindingCategory,

    /// Message suitable for display.
    pub message: String,

    /// Entry name the finding refers to, when it concerns a single member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
}

impl Finding {
    /// Creates an archive-level finding.
    pub fn new(severity: Severity, category: FindingCategory, message: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            entry: None,
        }
    }

    /// Attaches the entry name this finding concerns.
    #[must_use]
    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }
}
