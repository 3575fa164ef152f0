//! Ordered severity levels shared by findings and metadata flags.

use serde::Serialize;

/// Severity attached to a finding or flag.
///
/// Variants are ordered so that `Info < Warning < Critical`, which lets callers
/// sort, filter and take maxima directly.
///
/// # Examples
///
/// ```
/// use exhibit_core::Severity;
///
/// assert!(Severity::Critical > Severity::Warning);
/// assert_eq!(Severity::Warning.to_string(), "warning");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational only.
    Info,
    /// Suspicious, warrants review.
    Warning,
    /// Strong indicator of risk or manipulation.
    Critical,
}

impl Severity {
    /// Lower-case label used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Authenticity-score penalty for one flag of this severity.
    #[must_use]
    pub const fn metadata_penalty(self) -> u32 {
        match self {
            Self::Info => 1,
            Self::Warning => 6,
            Self::Critical => 12,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
        let max = [Severity::Warning, Severity::Critical, Severity::Info]
            .into_iter()
            .max();
        assert_eq!(max, Some(Severity::Critical));
    }

    #[test]
    fn test_penalties() {
        assert_eq!(Severity::Info.metadata_penalty(), 1);
        assert_eq!(Severity::Warning.metadata_penalty(), 6);
        assert_eq!(Severity::Critical.metadata_penalty(), 12);
    }

    #[test]
    fn test_serialize_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap_or_default();
        assert_eq!(json, "\"critical\"");
    }
}
