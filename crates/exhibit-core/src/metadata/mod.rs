//! Image metadata extraction across JPEG, PNG, WebP and TIFF containers.
//!
//! Unrecognised or malformed containers yield empty metadata rather than an
//! error. Fields that could not be recovered stay `None` and are presented
//! as [`UNAVAILABLE`].

pub mod container;
pub mod flags;
pub mod jpeg;
pub mod png;
pub mod tiff;
pub mod webp;

use serde::Serialize;
use tracing::debug;

pub use container::ContainerKind;
pub use flags::FlagKind;
pub use flags::ForensicMetadataFlag;
pub use flags::StrippedLikelihood;

/// Placeholder shown for metadata that could not be recovered.
pub const UNAVAILABLE: &str = "unavailable";

/// One tag as found in the container, in walk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTag {
    /// Where the tag came from (`tiff:ifd0`, `png:text`, ...).
    pub source: String,
    /// Tag name, or its hex id when unknown.
    pub key: String,
    /// Rendered value.
    pub value: String,
}

/// Structured metadata recovered from an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageMetadata {
    /// Camera manufacturer.
    pub make: Option<String>,
    /// Camera model.
    pub model: Option<String>,
    /// Software that last wrote the file.
    pub software: Option<String>,
    /// Last modification date.
    pub date_time: Option<String>,
    /// Capture date.
    pub date_time_original: Option<String>,
    /// Latitude in signed decimal degrees.
    pub gps_lat: Option<f64>,
    /// Longitude in signed decimal degrees.
    pub gps_lon: Option<f64>,
    /// Every tag seen, in walk order.
    pub raw_tags: Vec<RawTag>,
}

impl ImageMetadata {
    /// Returns `true` if nothing was recovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw_tags.is_empty()
            && self.make.is_none()
            && self.model.is_none()
            && self.software.is_none()
            && self.date_time.is_none()
            && self.date_time_original.is_none()
            && self.gps_lat.is_none()
            && self.gps_lon.is_none()
    }

    /// Named structured fields with [`UNAVAILABLE`] for missing values.
    #[must_use]
    pub fn display_fields(&self) -> Vec<(&'static str, String)> {
        let text = |value: &Option<String>| value.as_deref().unwrap_or(UNAVAILABLE).to_string();
        let gps = match (self.gps_lat, self.gps_lon) {
            (Some(lat), Some(lon)) => format!("{lat:.5}, {lon:.5}"),
            _ => UNAVAILABLE.to_string(),
        };
        vec![
            ("make", text(&self.make)),
            ("model", text(&self.model)),
            ("software", text(&self.software)),
            ("date_time", text(&self.date_time)),
            ("date_time_original", text(&self.date_time_original)),
            ("gps", gps),
        ]
    }
}

/// Metadata plus the forensic reading of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataReport {
    /// Container recognised from magic bytes.
    pub container: ContainerKind,
    /// MIME type the caller claimed, if any.
    pub declared_mime: Option<String>,
    /// MIME type implied by the content.
    pub content_mime: Option<String>,
    /// Recovered metadata.
    pub metadata: ImageMetadata,
    /// Whether metadata looks deliberately removed.
    pub stripped_likelihood: StrippedLikelihood,
    /// Derived flags in a fixed order.
    pub flags: Vec<ForensicMetadataFlag>,
}

impl MetadataReport {
    /// Number of edit-related flags.
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.flags.iter().filter(|f| f.kind.is_edit()).count()
    }

    /// Severities of all flags, for authenticity scoring.
    #[must_use]
    pub fn severities(&self) -> Vec<crate::Severity> {
        self.flags.iter().map(|f| f.severity).collect()
    }
}

/// Extracts metadata from an image buffer.
///
/// `declared` is an optional caller hint, either a file name or a MIME
/// string, used for mismatch detection.
///
/// # Examples
///
/// ```
/// use exhibit_core::metadata::ContainerKind;
/// use exhibit_core::metadata::extract_metadata;
///
/// let report = extract_metadata(b"%PDF-1.7\n", Some("scan.pdf"));
/// assert_eq!(report.container, ContainerKind::Unknown);
/// assert!(report.metadata.is_empty());
/// assert!(report.flags.is_empty());
/// ```
#[must_use]
pub fn extract_metadata(data: &[u8], declared: Option<&str>) -> MetadataReport {
    let container = ContainerKind::sniff(data);
    let mut metadata = ImageMetadata::default();

    match container {
        ContainerKind::Jpeg => jpeg::walk_jpeg(data, &mut metadata),
        ContainerKind::Png => png::walk_png(data, &mut metadata),
        ContainerKind::WebP => webp::walk_webp(data, &mut metadata),
        ContainerKind::Tiff => {
            tiff::parse_tiff(data, &mut metadata);
        }
        ContainerKind::Unknown => {
            debug!(len = data.len(), "unsupported container, metadata empty");
        }
    }

    let declared_mime = declared.and_then(container::declared_mime);
    let content_mime = container::content_mime(data, container);
    let effective = declared_mime.as_deref().or(content_mime.as_deref());
    let stripped_likelihood = flags::stripped_likelihood(&metadata, effective);
    let flags = flags::derive_flags(
        &metadata,
        declared_mime.as_deref(),
        content_mime.as_deref(),
        stripped_likelihood,
    );

    debug!(
        %container,
        tags = metadata.raw_tags.len(),
        flags = flags.len(),
        "metadata extracted"
    );

    MetadataReport {
        container,
        declared_mime,
        content_mime,
        metadata,
        stripped_likelihood,
        flags,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::metadata::tiff::tests::build_tiff_le;

    fn jpeg_with_exif(tiff: &[u8]) -> Vec<u8> {
        let mut payload = jpeg::EXIF_PREFIX.to_vec();
        payload.extend_from_slice(tiff);
        let mut out = jpeg::SOI.to_vec();
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(&payload);
        out.extend_from_slice(&[0xFF, 0xD9]);
        out
    }

    #[test]
    fn test_camera_jpeg_edited() {
        let tiff = build_tiff_le(&[
            (0x010F, 2, 6, b"Nikon\0".to_vec()),
            (0x0131, 2, 10, b"Lightroom\0".to_vec()),
        ]);
        let report = extract_metadata(&jpeg_with_exif(&tiff), Some("photo.jpg"));
        assert_eq!(report.container, ContainerKind::Jpeg);
        assert_eq!(report.metadata.make.as_deref(), Some("Nikon"));
        assert_eq!(report.stripped_likelihood, StrippedLikelihood::Low);
        assert_eq!(report.edit_count(), 1);
        assert_eq!(report.flags[0].kind, FlagKind::RenderChainJump);
    }

    #[test]
    fn test_bare_jpeg_is_stripped() {
        let report = extract_metadata(&[0xFF, 0xD8, 0xFF, 0xD9], None);
        assert_eq!(report.stripped_likelihood, StrippedLikelihood::High);
        assert_eq!(report.flags.len(), 1);
        assert_eq!(report.flags[0].kind, FlagKind::MetadataStripped);
    }

    #[test]
    fn test_declared_png_but_jpeg_content() {
        let report = extract_metadata(&[0xFF, 0xD8, 0xFF, 0xD9], Some("image.png"));
        assert_eq!(report.declared_mime.as_deref(), Some("image/png"));
        assert_eq!(report.flags[0].kind, FlagKind::MimeMismatch);
        assert_eq!(report.flags[0].severity, crate::Severity::Critical);
    }

    #[test]
    fn test_display_fields_unavailable() {
        let fields = ImageMetadata::default().display_fields();
        assert!(fields.iter().all(|(_, value)| value == UNAVAILABLE));
    }

    #[test]
    fn test_garbage_never_panics() {
        let inputs: [&[u8]; 4] = [
            b"",
            b"\xFF\xD8",
            b"\x89PNG\r\n\x1a\n\xFF\xFF\xFF\xFF",
            b"MM\0*\xFF\xFF\xFF\xFF",
        ];
        for data in inputs {
            let _ = extract_metadata(data, Some("x"));
        }
    }
}
