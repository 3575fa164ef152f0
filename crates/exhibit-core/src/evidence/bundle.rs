//! Portable evidence bundles.

use std::path::Path;

use tracing::debug;

use crate::Result;
use crate::archive::ArchiveWriter;
use crate::evidence::CustodyLog;
use crate::evidence::ForensicReport;
use crate::hashing::sha256_hex;

/// Report entry name.
pub const REPORT_ENTRY: &str = "forensic-report.json";
/// Custody log entry name.
pub const CUSTODY_ENTRY: &str = "chain-of-custody.log";
/// Integrity manifest entry name.
pub const HASHES_ENTRY: &str = "integrity-hashes.txt";
/// Directory holding working artifacts.
pub const ARTIFACT_DIR: &str = "artifacts";

/// A working file shipped with the evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    name: String,
    bytes: Vec<u8>,
}

impl Artifact {
    /// Entry path inside the bundle.
    #[must_use]
    pub fn entry_name(&self) -> String {
        format!("{ARTIFACT_DIR}/{}", self.name)
    }

    /// Artifact contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Report, custody log and artifacts packaged into one store-only ZIP.
///
/// Entries are written in a fixed order: report, custody log, integrity
/// manifest, then artifacts in insertion order. Identical input yields
/// identical bytes.
#[derive(Debug, Clone)]
pub struct EvidenceBundle {
    report: ForensicReport,
    custody: CustodyLog,
    artifacts: Vec<Artifact>,
}

impl EvidenceBundle {
    /// Creates a bundle without artifacts.
    #[must_use]
    pub fn new(report: ForensicReport, custody: CustodyLog) -> Self {
        Self {
            report,
            custody,
            artifacts: Vec::new(),
        }
    }

    /// Adds a working artifact. Path components that could escape the
    /// artifact directory are dropped from `name`.
    pub fn add_artifact(&mut self, name: &str, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.artifacts.push(Artifact {
            name: sanitize_name(name),
            bytes: bytes.into(),
        });
        self
    }

    /// Attached artifacts.
    #[must_use]
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// The report being exported.
    #[must_use]
    pub const fn report(&self) -> &ForensicReport {
        &self.report
    }

    /// Integrity manifest: SHA-256, size and name for the source and every
    /// artifact.
    #[must_use]
    pub fn integrity_manifest(&self) -> String {
        let mut out = String::from("# sha256  bytes  name\n");
        out.push_str(&format!(
            "{}  {}  source:{}\n",
            self.report.source_sha256, self.report.size, self.report.source_name
        ));
        for artifact in &self.artifacts {
            out.push_str(&format!(
                "{}  {}  {}\n",
                sha256_hex(&artifact.bytes),
                artifact.bytes.len(),
                artifact.entry_name()
            ));
        }
        out
    }

    /// Builds the ZIP bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be serialized or an entry
    /// exceeds ZIP limits.
    pub fn to_zip(&self) -> Result<Vec<u8>> {
        let report = serde_json::to_vec_pretty(&self.report)?;

        let mut writer = ArchiveWriter::new();
        writer
            .add(REPORT_ENTRY, &report)?
            .add(CUSTODY_ENTRY, self.custody.render().as_bytes())?
            .add(HASHES_ENTRY, self.integrity_manifest().as_bytes())?;
        for artifact in &self.artifacts {
            writer.add(artifact.entry_name(), &artifact.bytes)?;
        }

        debug!(
            source = %self.report.source_name,
            artifacts = self.artifacts.len(),
            "evidence bundle assembled"
        );
        writer.finish()
    }

    /// Writes the ZIP to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if building the bundle or writing the file fails.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_zip()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Keeps only normal path segments.
fn sanitize_name(name: &str) -> String {
    let joined = name
        .split(['/', '\\'])
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .map(|segment| segment.trim_end_matches(':'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        "artifact".to_string()
    } else {
        joined
    }
}
