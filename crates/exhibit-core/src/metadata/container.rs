//! Container sniffing and MIME resolution.
//!
//! Image containers are recognised by their own magic checks; other content
//! falls back to `infer`. Declared types come from `mime_guess`.

use std::path::Path;

use serde::Serialize;

use crate::metadata::jpeg::SOI;
use crate::metadata::png::PNG_SIGNATURE;
use crate::metadata::tiff::read_tiff_header;
use crate::metadata::webp::is_webp;

/// Image container recognised by magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// JPEG/JFIF/EXIF.
    Jpeg,
    /// Portable Network Graphics.
    Png,
    /// RIFF WebP.
    #[serde(rename = "webp")]
    WebP,
    /// Bare TIFF (including TIFF-based raw formats).
    Tiff,
    /// Not a supported image container.
    Unknown,
}

impl ContainerKind {
    /// Identifies the container from its leading bytes.
    #[must_use]
    pub fn sniff(data: &[u8]) -> Self {
        if data.starts_with(&SOI) {
            Self::Jpeg
        } else if data.starts_with(&PNG_SIGNATURE) {
            Self::Png
        } else if is_webp(data) {
            Self::WebP
        } else if read_tiff_header(data).is_some() {
            Self::Tiff
        } else {
            Self::Unknown
        }
    }

    /// Canonical MIME type of the container.
    #[must_use]
    pub const fn mime(self) -> Option<&'static str> {
        match self {
            Self::Jpeg => Some("image/jpeg"),
            Self::Png => Some("image/png"),
            Self::WebP => Some("image/webp"),
            Self::Tiff => Some("image/tiff"),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::WebP => "WebP",
            Self::Tiff => "TIFF",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// MIME type implied by the content itself.
#[must_use]
pub fn content_mime(data: &[u8], container: ContainerKind) -> Option<String> {
    container
        .mime()
        .map(str::to_string)
        .or_else(|| infer::get(data).map(|kind| kind.mime_type().to_string()))
}

/// Resolves a caller hint (file name or MIME string) to a MIME type.
///
/// # Examples
///
/// ```
/// use exhibit_core::metadata::container::declared_mime;
///
/// assert_eq!(declared_mime("holiday.JPG").as_deref(), Some("image/jpeg"));
/// assert_eq!(declared_mime("image/png").as_deref(), Some("image/png"));
/// assert_eq!(declared_mime("README"), None);
/// ```
#[must_use]
pub fn declared_mime(hint: &str) -> Option<String> {
    let hint = hint.trim();
    if let Some(extension) = Path::new(hint).extension().and_then(|e| e.to_str())
        && let Some(mime) = mime_guess::from_ext(extension).first()
    {
        return Some(normalize_mime(mime.essence_str()));
    }
    hint.parse::<mime_guess::mime::Mime>()
        .ok()
        .map(|mime| normalize_mime(mime.essence_str()))
}

/// Lowercases a MIME type and folds common aliases.
#[must_use]
pub fn normalize_mime(mime: &str) -> String {
    let lower = mime.trim().to_ascii_lowercase();
    match lower.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        "image/x-png" => "image/png".to_string(),
        "image/tif" | "image/x-tiff" => "image/tiff".to_string(),
        "image/dng" | "image/x-dng" => "image/x-adobe-dng".to_string(),
        _ => lower,
    }
}

/// Returns `true` if two MIME types describe the same container.
///
/// TIFF-based raw formats share the TIFF container.
#[must_use]
pub fn same_container(a: &str, b: &str) -> bool {
    let family = |mime: &str| {
        let mime = normalize_mime(mime);
        if mime == "image/x-adobe-dng" {
            "image/tiff".to_string()
        } else {
            mime
        }
    };
    family(a) == family(b)
}

/// MIME types produced directly by cameras and phones.
const CAMERA_MIMES: &[&str] = &[
    "image/jpeg",
    "image/tiff",
    "image/heic",
    "image/heif",
    "image/x-adobe-dng",
];

/// Returns `true` if the MIME type is a typical camera capture format.
#[must_use]
pub fn is_camera_mime(mime: &str) -> bool {
    CAMERA_MIMES.contains(&normalize_mime(mime).as_str())
}
