//! Forensic flags derived from extracted metadata.

use serde::Serialize;

use crate::metadata::ImageMetadata;
use crate::metadata::container::is_camera_mime;
use crate::metadata::container::same_container;
use crate::types::Severity;

/// Desktop and mobile editors whose `Software` tag marks a re-render.
pub const EDITING_SOFTWARE: &[&str] = &[
    "photoshop",
    "gimp",
    "lightroom",
    "affinity",
    "pixelmator",
    "canva",
    "snapseed",
    "paint.net",
    "picsart",
    "facetune",
];

/// What a metadata flag reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// Declared type disagrees with the content.
    MimeMismatch,
    /// Camera capture later re-saved by editing software.
    RenderChainJump,
    /// Editing software without camera provenance.
    EditingSoftware,
    /// Modification date differs from capture date.
    ModifiedAfterCapture,
    /// GPS coordinates are embedded.
    GpsPresent,
    /// Camera format without any recoverable tags.
    MetadataStripped,
}

impl FlagKind {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MimeMismatch => "container mismatch",
            Self::RenderChainJump => "render chain jump",
            Self::EditingSoftware => "editing software",
            Self::ModifiedAfterCapture => "modified after capture",
            Self::GpsPresent => "gps coordinates",
            Self::MetadataStripped => "metadata stripped",
        }
    }

    /// Returns `true` for flags that indicate an edit.
    #[must_use]
    pub const fn is_edit(self) -> bool {
        matches!(
            self,
            Self::RenderChainJump | Self::EditingSoftware | Self::ModifiedAfterCapture
        )
    }
}

/// A severity-tagged observation about image metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForensicMetadataFlag {
    /// Flag type.
    pub kind: FlagKind,
    /// Display label.
    pub label: String,
    /// Evidence supporting the flag.
    pub value: String,
    /// How much the flag weighs on authenticity.
    pub severity: Severity,
}

impl ForensicMetadataFlag {
    fn new(kind: FlagKind, value: impl Into<String>, severity: Severity) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            value: value.into(),
            severity,
        }
    }
}

/// Likelihood that metadata was removed on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrippedLikelihood {
    /// Tags present, or the format rarely carries them.
    Low,
    /// A camera format with nothing recoverable.
    High,
}

/// Matches `software` against [`EDITING_SOFTWARE`], case-insensitively.
#[must_use]
pub fn editing_software(software: &str) -> Option<&'static str> {
    let lower = software.to_ascii_lowercase();
    EDITING_SOFTWARE
        .iter()
        .copied()
        .find(|editor| lower.contains(editor))
}

/// Estimates whether metadata was stripped.
#[must_use]
pub fn stripped_likelihood(
    metadata: &ImageMetadata,
    effective_mime: Option<&str>,
) -> StrippedLikelihood {
    match effective_mime {
        Some(mime) if is_camera_mime(mime) && metadata.raw_tags.is_empty() => {
            StrippedLikelihood::High
        }
        _ => StrippedLikelihood::Low,
    }
}

/// Derives flags in a fixed order: mismatch, edits, dates, GPS, stripping.
#[must_use]
pub fn derive_flags(
    metadata: &ImageMetadata,
    declared: Option<&str>,
    content: Option<&str>,
    stripped: StrippedLikelihood,
) -> Vec<ForensicMetadataFlag> {
    let mut flags = Vec::new();

    if let (Some(declared), Some(content)) = (declared, content)
        && !same_container(declared, content)
    {
        flags.push(ForensicMetadataFlag::new(
            FlagKind::MimeMismatch,
            format!("declared {declared}, content is {content}"),
            Severity::Critical,
        ));
    }

    if let Some(software) = metadata.software.as_deref()
        && editing_software(software).is_some()
    {
        match metadata.make.as_deref() {
            Some(make) => flags.push(ForensicMetadataFlag::new(
                FlagKind::RenderChainJump,
                format!("{make} -> {software}"),
                Severity::Warning,
            )),
            None => flags.push(ForensicMetadataFlag::new(
                FlagKind::EditingSoftware,
                software,
                Severity::Info,
            )),
        }
    }

    if let (Some(modified), Some(captured)) = (
        metadata.date_time.as_deref(),
        metadata.date_time_original.as_deref(),
    ) && modified != captured
    {
        flags.push(ForensicMetadataFlag::new(
            FlagKind::ModifiedAfterCapture,
            format!("captured {captured}, modified {modified}"),
            Severity::Warning,
        ));
    }

    if let (Some(lat), Some(lon)) = (metadata.gps_lat, metadata.gps_lon) {
        flags.push(ForensicMetadataFlag::new(
            FlagKind::GpsPresent,
            format!("{lat:.5}, {lon:.5}"),
            Severity::Info,
        ));
    }

    if stripped == StrippedLikelihood::High {
        let source = content.or(declared).unwrap_or("input");
        flags.push(ForensicMetadataFlag::new(
            FlagKind::MetadataStripped,
            format!("no tags recovered from {source}"),
            Severity::Warning,
        ));
    }

    flags
}
