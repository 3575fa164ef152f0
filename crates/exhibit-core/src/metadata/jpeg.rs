//! JPEG marker-segment walker.

use tracing::debug;

use crate::bytes::be_u16;
use crate::bytes::slice;
use crate::bytes::trimmed_text;
use crate::metadata::ImageMetadata;
use crate::metadata::RawTag;
use crate::metadata::tiff::parse_tiff;

/// Start-of-image marker bytes.
pub const SOI: [u8; 2] = [0xFF, 0xD8];
/// Prefix of an EXIF APP1 payload.
pub const EXIF_PREFIX: &[u8] = b"Exif\0\0";

const MARKER_APP1: u8 = 0xE1;
const MARKER_COM: u8 = 0xFE;
const MARKER_SOS: u8 = 0xDA;
const MARKER_EOI: u8 = 0xD9;
const MARKER_TEM: u8 = 0x01;

/// Walks JPEG segments up to the first scan, decoding EXIF and comments.
pub fn walk_jpeg(data: &[u8], metadata: &mut ImageMetadata) {
    if !data.starts_with(&SOI) {
        return;
    }

    let mut pos = 2;
    while let Some(&lead) = data.get(pos) {
        if lead != 0xFF {
            debug!(pos, "JPEG marker expected, stopping walk");
            return;
        }
        // Fill bytes may precede a marker.
        while data.get(pos) == Some(&0xFF) {
            pos += 1;
        }
        let Some(&marker) = data.get(pos) else {
            return;
        };
        pos += 1;

        match marker {
            MARKER_SOS | MARKER_EOI => return,
            MARKER_TEM | 0xD0..=0xD7 => continue,
            _ => {}
        }

        let Some(length) = be_u16(data, pos).map(usize::from) else {
            return;
        };
        if length < 2 {
            return;
        }
        let Some(segment) = slice(data, pos + 2, length - 2) else {
            debug!(pos, length, "JPEG segment runs past end of buffer");
            return;
        };

        match marker {
            MARKER_APP1 => {
                if let Some(tiff) = segment.strip_prefix(EXIF_PREFIX) {
                    parse_tiff(tiff, metadata);
                }
            }
            MARKER_COM => metadata.raw_tags.push(RawTag {
                source: "jpeg".to_string(),
                key: "Comment".to_string(),
                value: trimmed_text(segment),
            }),
            _ => {}
        }
        pos += length;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::metadata::tiff::tests::build_tiff_le;

    fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![0xFF, marker];
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn jpeg_with(segments: &[Vec<u8>]) -> Vec<u8> {
        let mut out = SOI.to_vec();
        for s in segments {
            out.extend_from_slice(s);
        }
        out.extend_from_slice(&[0xFF, MARKER_SOS, 0x00, 0x02, 0xFF, MARKER_EOI]);
        out
    }

    #[test]
    fn test_exif_app1_decoded() {
        let tiff = build_tiff_le(&[(0x010F, 2, 8, b"TestCam\0".to_vec())]);
        let mut payload = EXIF_PREFIX.to_vec();
        payload.extend_from_slice(&tiff);
        let jpeg = jpeg_with(&[segment(0xE0, b"JFIF\0"), segment(MARKER_APP1, &payload)]);

        let mut metadata = ImageMetadata::default();
        walk_jpeg(&jpeg, &mut metadata);
        assert_eq!(metadata.make.as_deref(), Some("TestCam"));
    }

    #[test]
    fn test_comment_becomes_raw_tag() {
        let jpeg = jpeg_with(&[segment(MARKER_COM, b"edited on phone")]);
        let mut metadata = ImageMetadata::default();
        walk_jpeg(&jpeg, &mut metadata);
        assert_eq!(metadata.raw_tags.len(), 1);
        assert_eq!(metadata.raw_tags[0].value, "edited on phone");
    }

    #[test]
    fn test_app1_without_exif_prefix_ignored() {
        let jpeg = jpeg_with(&[segment(MARKER_APP1, b"http://ns.adobe.com/xap/1.0/\0")]);
        let mut metadata = ImageMetadata::default();
        walk_jpeg(&jpeg, &mut metadata);
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_truncated_segment_stops() {
        let mut jpeg = SOI.to_vec();
        jpeg.extend_from_slice(&[0xFF, MARKER_APP1, 0xFF, 0xF0, b'E', b'x']);
        let mut metadata = ImageMetadata::default();
        walk_jpeg(&jpeg, &mut metadata);
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_fill_bytes_skipped() {
        let mut jpeg = SOI.to_vec();
        jpeg.extend_from_slice(&[0xFF, 0xFF, 0xFF]);
        jpeg.extend_from_slice(&segment(MARKER_COM, b"fill")[1..]);
        let mut metadata = ImageMetadata::default();
        walk_jpeg(&jpeg, &mut metadata);
        assert_eq!(metadata.raw_tags[0].value, "fill");
    }
}
