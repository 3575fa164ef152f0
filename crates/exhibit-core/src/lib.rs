//! Extraction-free forensic analysis of untrusted archives and images.
//!
//! `exhibit-core` inspects ZIP structure without decompressing entries,
//! extracts EXIF/TIFF/PNG/WebP metadata, runs pixel-domain tamper
//! heuristics, and turns the results into an authenticity score and a risk
//! tier. Findings can be exported as a deterministic store-only ZIP bundle
//! with a chain-of-custody log.
//!
//! # Examples
//!
//! ```
//! use exhibit_core::AnalysisConfig;
//! use exhibit_core::analyze_bytes;
//! use exhibit_core::archive::write_store_zip;
//!
//! # fn main() -> Result<(), exhibit_core::ForensicError> {
//! let zip = write_store_zip(&[("notes/readme.txt", b"hello")])?;
//! let report = analyze_bytes("upload.zip", &zip, &AnalysisConfig::default())?;
//! println!("{} -> {}", report.source_name, report.risk_tier);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod archive;
pub mod bytes;
pub mod checksum;
pub mod config;
pub mod error;
pub mod evidence;
pub mod hashing;
pub mod metadata;
pub mod scoring;
pub mod tamper;
pub mod types;

// Re-export main API types
pub use api::analyze_bytes;
pub use archive::ArchiveScanResult;
pub use archive::ArchiveWriter;
pub use archive::inspect_archive;
pub use config::AnalysisConfig;
pub use config::InspectionConfig;
pub use config::TamperConfig;
pub use error::ForensicError;
pub use error::Result;
pub use evidence::EvidenceBundle;
pub use evidence::ForensicReport;
pub use metadata::MetadataReport;
pub use metadata::extract_metadata;
pub use scoring::RiskTier;
pub use tamper::PixelGrid;
pub use tamper::TamperReport;
pub use tamper::analyze_tamper;

// Re-export types module for easier access
pub use types::Finding;
pub use types::FindingCategory;
pub use types::Severity;
