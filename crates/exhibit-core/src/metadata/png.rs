//! PNG chunk walker.
//!
//! Collects `tEXt` and `iTXt` key/value pairs and decodes `eXIf` chunks.
//! Chunk CRCs are not verified.

use tracing::debug;

use crate::bytes::be_u32;
use crate::bytes::slice;
use crate::metadata::ImageMetadata;
use crate::metadata::RawTag;
use crate::metadata::tiff::parse_tiff;

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

const CHUNK_OVERHEAD: usize = 12;

/// Walks PNG chunks until `IEND` or the end of the buffer.
///
/// Raw tags are recorded in chunk order. Text keywords only fill structured
/// fields that `eXIf` left empty.
pub fn walk_png(data: &[u8], metadata: &mut ImageMetadata) {
    if !data.starts_with(&PNG_SIGNATURE) {
        return;
    }

    let mut text = Vec::new();
    let mut pos = PNG_SIGNATURE.len();
    while let Some(length) = be_u32(data, pos).map(|l| l as usize) {
        let Some(kind) = slice(data, pos + 4, 4) else {
            break;
        };
        let Some(body) = slice(data, pos + 8, length) else {
            debug!(pos, length, "PNG chunk runs past end of buffer");
            break;
        };

        let pair = match kind {
            b"tEXt" => parse_text(body),
            b"iTXt" => parse_international_text(body),
            _ => None,
        };
        if let Some((key, value)) = pair {
            metadata.raw_tags.push(RawTag {
                source: "png:text".to_string(),
                key: key.clone(),
                value: value.clone(),
            });
            text.push((key, value));
        }

        match kind {
            b"eXIf" => {
                parse_tiff(body, metadata);
            }
            b"IEND" => break,
            _ => {}
        }

        let Some(next) = pos
            .checked_add(CHUNK_OVERHEAD)
            .and_then(|p| p.checked_add(length))
        else {
            break;
        };
        pos = next;
    }

    for (key, value) in text {
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "Software" if metadata.software.is_none() => metadata.software = Some(value),
            "Creation Time" if metadata.date_time.is_none() => metadata.date_time = Some(value),
            _ => {}
        }
    }
}

/// Decodes Latin-1 text as stored in `tEXt` chunks.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// `keyword \0 text`
fn parse_text(body: &[u8]) -> Option<(String, String)> {
    let split = body.iter().position(|&b| b == 0)?;
    let value = latin1(&body[split + 1..]).trim().to_string();
    Some((latin1(&body[..split]), value))
}

/// `keyword \0 flag method language \0 translated \0 text`
fn parse_international_text(body: &[u8]) -> Option<(String, String)> {
    let key_end = body.iter().position(|&b| b == 0)?;
    let key = latin1(&body[..key_end]);
    let compressed = *body.get(key_end + 1)? != 0;
    let rest = body.get(key_end + 3..)?;

    let language_end = rest.iter().position(|&b| b == 0)?;
    let rest = rest.get(language_end + 1..)?;
    let translated_end = rest.iter().position(|&b| b == 0)?;
    let text = rest.get(translated_end + 1..)?;

    let value = if compressed {
        format!("compressed, {} bytes", text.len())
    } else {
        String::from_utf8_lossy(text).trim().to_string()
    };
    Some((key, value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::metadata::tiff::tests::build_tiff_le;

    fn chunk(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = (body.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(body);
        out.extend_from_slice(&[0; 4]);
        out
    }

    fn png_with(chunks: &[Vec<u8>]) -> Vec<u8> {
        let mut out = PNG_SIGNATURE.to_vec();
        out.extend_from_slice(&chunk(b"IHDR", &[0; 13]));
        for c in chunks {
            out.extend_from_slice(c);
        }
        out.extend_from_slice(&chunk(b"IEND", &[]));
        out
    }

    #[test]
    fn test_text_software_populates_field() {
        let png = png_with(&[chunk(b"tEXt", b"Software\0Adobe Photoshop 25.0")]);
        let mut metadata = ImageMetadata::default();
        walk_png(&png, &mut metadata);
        assert_eq!(metadata.software.as_deref(), Some("Adobe Photoshop 25.0"));
        assert_eq!(metadata.raw_tags.len(), 1);
        assert_eq!(metadata.raw_tags[0].key, "Software");
    }

    #[test]
    fn test_international_text() {
        let body = b"Description\0\0\0en\0Beschreibung\0a caf\xC3\xA9";
        let png = png_with(&[chunk(b"iTXt", body)]);
        let mut metadata = ImageMetadata::default();
        walk_png(&png, &mut metadata);
        assert_eq!(metadata.raw_tags[0].key, "Description");
        assert_eq!(metadata.raw_tags[0].value, "a caf\u{e9}");
    }

    #[test]
    fn test_compressed_international_text_not_inflated() {
        let body = b"XML:com.adobe.xmp\0\x01\0\0\0\x78\x9c\x03\x00";
        let png = png_with(&[chunk(b"iTXt", body)]);
        let mut metadata = ImageMetadata::default();
        walk_png(&png, &mut metadata);
        assert_eq!(metadata.raw_tags[0].value, "compressed, 4 bytes");
    }

    #[test]
    fn test_exif_chunk_takes_precedence() {
        let tiff = build_tiff_le(&[(0x0131, 2, 5, b"GIMP\0".to_vec())]);
        let png = png_with(&[
            chunk(b"tEXt", b"Software\0Canva"),
            chunk(b"eXIf", &tiff),
        ]);
        let mut metadata = ImageMetadata::default();
        walk_png(&png, &mut metadata);
        assert_eq!(metadata.software.as_deref(), Some("GIMP"));
    }

    #[test]
    fn test_raw_tags_follow_chunk_order() {
        let tiff = build_tiff_le(&[(0x0131, 2, 5, b"GIMP\0".to_vec())]);
        let png = png_with(&[
            chunk(b"tEXt", b"Author\0Jo"),
            chunk(b"eXIf", &tiff),
            chunk(b"tEXt", b"Comment\0late"),
        ]);
        let mut metadata = ImageMetadata::default();
        walk_png(&png, &mut metadata);

        let keys: Vec<&str> = metadata.raw_tags.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, ["Author", "Software", "Comment"]);
        assert_eq!(metadata.raw_tags[1].source, "tiff:ifd0");
    }

    #[test]
    fn test_chunks_after_iend_ignored() {
        let mut png = png_with(&[]);
        png.extend_from_slice(&chunk(b"tEXt", b"Software\0late"));
        let mut metadata = ImageMetadata::default();
        walk_png(&png, &mut metadata);
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_truncated_chunk_stops() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(&1000u32.to_be_bytes());
        png.extend_from_slice(b"tEXt");
        png.extend_from_slice(b"Software\0x");
        let mut metadata = ImageMetadata::default();
        walk_png(&png, &mut metadata);
        assert!(metadata.is_empty());
    }
}
