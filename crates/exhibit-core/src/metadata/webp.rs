//! WebP RIFF chunk walker.

use tracing::debug;

use crate::bytes::le_u32;
use crate::bytes::slice;
use crate::metadata::ImageMetadata;
use crate::metadata::jpeg::EXIF_PREFIX;
use crate::metadata::tiff::parse_tiff;

const RIFF_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// Returns `true` for a `RIFF....WEBP` header.
#[must_use]
pub fn is_webp(data: &[u8]) -> bool {
    data.starts_with(b"RIFF") && slice(data, 8, 4) == Some(&b"WEBP"[..])
}

/// Walks RIFF chunks until the `EXIF` chunk and decodes it.
pub fn walk_webp(data: &[u8], metadata: &mut ImageMetadata) {
    if !is_webp(data) {
        return;
    }

    let mut pos = RIFF_HEADER_LEN;
    while let Some(fourcc) = slice(data, pos, 4) {
        let Some(size) = le_u32(data, pos + 4).map(|s| s as usize) else {
            return;
        };
        let Some(payload) = slice(data, pos + CHUNK_HEADER_LEN, size) else {
            debug!(pos, size, "WebP chunk runs past end of buffer");
            return;
        };
        if fourcc == b"EXIF" {
            let tiff = payload.strip_prefix(EXIF_PREFIX).unwrap_or(payload);
            parse_tiff(tiff, metadata);
            return;
        }
        // Odd-sized chunks carry one padding byte.
        let Some(next) = (pos + CHUNK_HEADER_LEN)
            .checked_add(size)
            .and_then(|p| p.checked_add(size & 1))
        else {
            return;
        };
        pos = next;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::metadata::tiff::tests::build_tiff_le;

    fn chunk(fourcc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = fourcc.to_vec();
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn webp_with(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&((body.len() + 4) as u32).to_le_bytes());
        out.extend_from_slice(b"WEBP");
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn test_exif_chunk_found_after_odd_chunk() {
        let tiff = build_tiff_le(&[(0x0131, 2, 7, b"GIMP 2\0".to_vec())]);
        let webp = webp_with(&[chunk(b"VP8X", &[0; 9]), chunk(b"EXIF", &tiff)]);

        let mut metadata = ImageMetadata::default();
        walk_webp(&webp, &mut metadata);
        assert_eq!(metadata.software.as_deref(), Some("GIMP 2"));
    }

    #[test]
    fn test_exif_prefix_stripped() {
        let tiff = build_tiff_le(&[(0x010F, 2, 8, b"TestCam\0".to_vec())]);
        let mut payload = EXIF_PREFIX.to_vec();
        payload.extend_from_slice(&tiff);
        let webp = webp_with(&[chunk(b"EXIF", &payload)]);

        let mut metadata = ImageMetadata::default();
        walk_webp(&webp, &mut metadata);
        assert_eq!(metadata.make.as_deref(), Some("TestCam"));
    }

    #[test]
    fn test_oversized_chunk_stops() {
        let mut webp = webp_with(&[]);
        webp.extend_from_slice(b"EXIF");
        webp.extend_from_slice(&u32::MAX.to_le_bytes());
        let mut metadata = ImageMetadata::default();
        walk_webp(&webp, &mut metadata);
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_is_webp() {
        assert!(is_webp(&webp_with(&[])));
        assert!(!is_webp(b"RIFF\0\0\0\0WAVE"));
    }
}
