//! TIFF/EXIF directory decoder.
//!
//! Shared by every container walker: JPEG APP1, WebP `EXIF` and PNG `eXIf`
//! payloads are embedded TIFF streams, and bare `.tif` files are parsed
//! directly. All offsets are relative to the start of the TIFF header.

use tracing::debug;

use crate::bytes::Endian;
use crate::bytes::slice;
use crate::bytes::trimmed_text;
use crate::metadata::ImageMetadata;
use crate::metadata::RawTag;

/// TIFF magic number following the byte-order mark.
pub const TIFF_MAGIC: u16 = 0x002A;
/// Size of the TIFF header in bytes.
pub const TIFF_HEADER_LEN: usize = 8;
/// Size of one IFD entry in bytes.
pub const IFD_ENTRY_LEN: usize = 12;
/// Entries read from a single IFD before the rest are ignored.
pub const MAX_IFD_ENTRIES: usize = 512;

/// Camera manufacturer.
pub const TAG_MAKE: u16 = 0x010F;
/// Camera model.
pub const TAG_MODEL: u16 = 0x0110;
/// Software that last wrote the file.
pub const TAG_SOFTWARE: u16 = 0x0131;
/// File modification date.
pub const TAG_DATE_TIME: u16 = 0x0132;
/// Pointer to the Exif sub-IFD.
pub const TAG_EXIF_IFD: u16 = 0x8769;
/// Pointer to the GPS sub-IFD.
pub const TAG_GPS_IFD: u16 = 0x8825;
/// Capture date (Exif sub-IFD).
pub const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
/// Digitization date (Exif sub-IFD).
pub const TAG_DATE_TIME_DIGITIZED: u16 = 0x9004;
/// `N` or `S` (GPS sub-IFD).
pub const TAG_GPS_LAT_REF: u16 = 0x0001;
/// Latitude as three rationals (GPS sub-IFD).
pub const TAG_GPS_LAT: u16 = 0x0002;
/// `E` or `W` (GPS sub-IFD).
pub const TAG_GPS_LON_REF: u16 = 0x0003;
/// Longitude as three rationals (GPS sub-IFD).
pub const TAG_GPS_LON: u16 = 0x0004;

const TYPE_BYTE: u16 = 1;
const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;
const TYPE_SBYTE: u16 = 6;
const TYPE_UNDEFINED: u16 = 7;
const TYPE_SSHORT: u16 = 8;
const TYPE_SLONG: u16 = 9;
const TYPE_SRATIONAL: u16 = 10;
const TYPE_FLOAT: u16 = 11;
const TYPE_DOUBLE: u16 = 12;

/// Numeric values rendered into a raw tag before truncation.
const MAX_RENDERED_VALUES: usize = 8;

/// Directory a tag was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directory {
    Ifd0,
    Exif,
    Gps,
}

impl Directory {
    const fn source(self) -> &'static str {
        match self {
            Self::Ifd0 => "tiff:ifd0",
            Self::Exif => "tiff:exif",
            Self::Gps => "tiff:gps",
        }
    }
}

/// Single IFD entry (tag, type, count, value/offset) plus its position.
#[derive(Debug, Clone, Copy)]
struct IfdEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    value_offset: u32,
    position: usize,
}

/// GPS fields collected before conversion to signed degrees.
#[derive(Debug, Default)]
struct GpsFields {
    lat_ref: Option<u8>,
    lat: Option<f64>,
    lon_ref: Option<u8>,
    lon: Option<f64>,
}

/// Checks the TIFF header and returns the byte order and IFD0 offset.
#[must_use]
pub fn read_tiff_header(data: &[u8]) -> Option<(Endian, u32)> {
    let order = match slice(data, 0, 2)? {
        b"II" => Endian::Little,
        b"MM" => Endian::Big,
        _ => return None,
    };
    if order.read_u16(data, 2)? != TIFF_MAGIC {
        return None;
    }
    Some((order, order.read_u32(data, 4)?))
}

/// Decodes a TIFF stream into `metadata`.
///
/// Returns `false` if the header is invalid. Structured fields already set
/// are kept; raw tags are appended in walk order.
pub fn parse_tiff(data: &[u8], metadata: &mut ImageMetadata) -> bool {
    let Some((order, ifd0)) = read_tiff_header(data) else {
        debug!(len = data.len(), "no TIFF header");
        return false;
    };

    let mut visited = Vec::with_capacity(3);
    let pointers = walk_ifd(
        order,
        data,
        ifd0 as usize,
        Directory::Ifd0,
        &mut visited,
        metadata,
    );

    let mut gps = GpsFields::default();
    for (directory, offset) in pointers {
        if directory == Directory::Gps {
            walk_gps(order, data, offset, &mut visited, metadata, &mut gps);
        } else {
            walk_ifd(order, data, offset, directory, &mut visited, metadata);
        }
    }

    if metadata.gps_lat.is_none() {
        metadata.gps_lat = gps.lat.map(|v| signed(v, gps.lat_ref, b'S'));
    }
    if metadata.gps_lon.is_none() {
        metadata.gps_lon = gps.lon.map(|v| signed(v, gps.lon_ref, b'W'));
    }
    true
}

fn signed(degrees: f64, reference: Option<u8>, negative: u8) -> f64 {
    if reference.map(|r| r.to_ascii_uppercase()) == Some(negative) {
        -degrees
    } else {
        degrees
    }
}

/// Reads the entries of one IFD, recording raw tags and structured fields.
///
/// Returns the sub-IFD pointers found in IFD0 for the caller to follow.
/// Pointers inside sub-IFDs are only recorded as raw tags, which keeps
/// nesting one level deep.
fn walk_ifd(
    order: Endian,
    data: &[u8],
    offset: usize,
    directory: Directory,
    visited: &mut Vec<usize>,
    metadata: &mut ImageMetadata,
) -> Vec<(Directory, usize)> {
    let mut pointers = Vec::new();
    for entry in ifd_entries(order, data, offset, visited) {
        let value = render_value(order, data, entry);
        metadata.raw_tags.push(RawTag {
            source: directory.source().to_string(),
            key: tag_name(directory, entry.tag),
            value: value.clone().unwrap_or_else(|| "unreadable".to_string()),
        });

        let text = || value.clone().filter(|v| !v.is_empty());
        match (directory, entry.tag) {
            (Directory::Ifd0, TAG_MAKE) => metadata.make = metadata.make.take().or_else(text),
            (Directory::Ifd0, TAG_MODEL) => metadata.model = metadata.model.take().or_else(text),
            (Directory::Ifd0, TAG_SOFTWARE) => {
                metadata.software = metadata.software.take().or_else(text);
            }
            (Directory::Ifd0, TAG_DATE_TIME) => {
                metadata.date_time = metadata.date_time.take().or_else(text);
            }
            (Directory::Ifd0, TAG_EXIF_IFD) => {
                pointers.push((Directory::Exif, entry.value_offset as usize));
            }
            (Directory::Ifd0, TAG_GPS_IFD) => {
                pointers.push((Directory::Gps, entry.value_offset as usize));
            }
            (Directory::Exif, TAG_DATE_TIME_ORIGINAL) => {
                metadata.date_time_original = metadata.date_time_original.take().or_else(text);
            }
            _ => {}
        }
    }
    pointers
}

fn walk_gps(
    order: Endian,
    data: &[u8],
    offset: usize,
    visited: &mut Vec<usize>,
    metadata: &mut ImageMetadata,
    gps: &mut GpsFields,
) {
    for entry in ifd_entries(order, data, offset, visited) {
        let value = render_value(order, data, entry);
        metadata.raw_tags.push(RawTag {
            source: Directory::Gps.source().to_string(),
            key: tag_name(Directory::Gps, entry.tag),
            value: value.unwrap_or_else(|| "unreadable".to_string()),
        });

        match entry.tag {
            TAG_GPS_LAT_REF => gps.lat_ref = value_bytes(data, entry).and_then(first_byte),
            TAG_GPS_LON_REF => gps.lon_ref = value_bytes(data, entry).and_then(first_byte),
            TAG_GPS_LAT => gps.lat = read_degrees(order, data, entry),
            TAG_GPS_LON => gps.lon = read_degrees(order, data, entry),
            _ => {}
        }
    }
}

fn first_byte(bytes: &[u8]) -> Option<u8> {
    bytes.first().copied().filter(|&b| b != 0)
}

/// Reads the entries of the IFD at `offset`, skipping offsets already seen.
fn ifd_entries(
    order: Endian,
    data: &[u8],
    offset: usize,
    visited: &mut Vec<usize>,
) -> Vec<IfdEntry> {
    if offset < TIFF_HEADER_LEN || visited.contains(&offset) {
        debug!(offset, "skipping IFD: invalid or already visited");
        return Vec::new();
    }
    visited.push(offset);

    let Some(count) = order.read_u16(data, offset) else {
        return Vec::new();
    };
    let count = usize::from(count);
    if count > MAX_IFD_ENTRIES {
        debug!(offset, count, "IFD entry count capped");
    }

    (0..count.min(MAX_IFD_ENTRIES))
        .map_while(|i| {
            let position = offset
                .checked_add(2)?
                .checked_add(i.checked_mul(IFD_ENTRY_LEN)?)?;
            read_ifd_entry(order, data, position)
        })
        .collect()
}

fn read_ifd_entry(order: Endian, data: &[u8], position: usize) -> Option<IfdEntry> {
    slice(data, position, IFD_ENTRY_LEN)?;
    Some(IfdEntry {
        tag: order.read_u16(data, position)?,
        field_type: order.read_u16(data, position + 2)?,
        count: order.read_u32(data, position + 4)?,
        value_offset: order.read_u32(data, position + 8)?,
        position,
    })
}

const fn type_unit_size(field_type: u16) -> Option<usize> {
    match field_type {
        TYPE_BYTE | TYPE_ASCII | TYPE_SBYTE | TYPE_UNDEFINED => Some(1),
        TYPE_SHORT | TYPE_SSHORT => Some(2),
        TYPE_LONG | TYPE_SLONG | TYPE_FLOAT => Some(4),
        TYPE_RATIONAL | TYPE_SRATIONAL | TYPE_DOUBLE => Some(8),
        _ => None,
    }
}

/// Returns the value bytes of an entry, inline or dereferenced.
fn value_bytes(data: &[u8], entry: IfdEntry) -> Option<&[u8]> {
    let unit = type_unit_size(entry.field_type)?;
    let total = unit.checked_mul(entry.count as usize)?;
    if total <= 4 {
        slice(data, entry.position + 8, total)
    } else {
        slice(data, entry.value_offset as usize, total)
    }
}

fn render_value(order: Endian, data: &[u8], entry: IfdEntry) -> Option<String> {
    let bytes = value_bytes(data, entry)?;
    let short = |c: &[u8]| order.read_u16(c, 0).unwrap_or(0);
    let long = |c: &[u8]| order.read_u32(c, 0).unwrap_or(0);
    let rational = |c: &[u8]| {
        let num = order.read_u32(c, 0).unwrap_or(0);
        let den = order.read_u32(c, 4).unwrap_or(0);
        format!("{num}/{den}")
    };
    let rendered = match entry.field_type {
        TYPE_ASCII => trimmed_text(bytes),
        TYPE_SHORT => join(bytes.chunks_exact(2).map(short)),
        TYPE_LONG => join(bytes.chunks_exact(4).map(long)),
        TYPE_RATIONAL => join(bytes.chunks_exact(8).map(rational)),
        _ => format!("{} bytes", bytes.len()),
    };
    Some(rendered)
}

fn join<T: std::fmt::Display>(values: impl ExactSizeIterator<Item = T>) -> String {
    let total = values.len();
    let mut parts: Vec<String> = values
        .take(MAX_RENDERED_VALUES)
        .map(|v| v.to_string())
        .collect();
    if total > MAX_RENDERED_VALUES {
        parts.push(format!("(+{} more)", total - MAX_RENDERED_VALUES));
    }
    parts.join(", ")
}

/// Converts three rationals (degrees, minutes, seconds) into decimal degrees.
fn read_degrees(order: Endian, data: &[u8], entry: IfdEntry) -> Option<f64> {
    if entry.field_type != TYPE_RATIONAL || entry.count < 3 {
        return None;
    }
    let bytes = value_bytes(data, entry)?;
    let mut parts = [0.0; 3];
    for (i, part) in parts.iter_mut().enumerate() {
        let num = order.read_u32(bytes, i * 8)?;
        let den = order.read_u32(bytes, i * 8 + 4)?;
        if den == 0 {
            return None;
        }
        *part = f64::from(num) / f64::from(den);
    }
    Some(parts[0] + parts[1] / 60.0 + parts[2] / 3600.0)
}

fn tag_name(directory: Directory, tag: u16) -> String {
    let known = match (directory, tag) {
        (Directory::Ifd0, TAG_MAKE) => Some("Make"),
        (Directory::Ifd0, TAG_MODEL) => Some("Model"),
        (Directory::Ifd0, TAG_SOFTWARE) => Some("Software"),
        (Directory::Ifd0, TAG_DATE_TIME) => Some("DateTime"),
        (Directory::Ifd0, 0x010E) => Some("ImageDescription"),
        (Directory::Ifd0, 0x0112) => Some("Orientation"),
        (Directory::Ifd0, 0x013B) => Some("Artist"),
        (Directory::Ifd0, 0x8298) => Some("Copyright"),
        (Directory::Ifd0, TAG_EXIF_IFD) => Some("ExifIFDPointer"),
        (Directory::Ifd0, TAG_GPS_IFD) => Some("GPSInfoIFDPointer"),
        (Directory::Exif, TAG_DATE_TIME_ORIGINAL) => Some("DateTimeOriginal"),
        (Directory::Exif, TAG_DATE_TIME_DIGITIZED) => Some("DateTimeDigitized"),
        (Directory::Exif, 0xA434) => Some("LensModel"),
        (Directory::Gps, TAG_GPS_LAT_REF) => Some("GPSLatitudeRef"),
        (Directory::Gps, TAG_GPS_LAT) => Some("GPSLatitude"),
        (Directory::Gps, TAG_GPS_LON_REF) => Some("GPSLongitudeRef"),
        (Directory::Gps, TAG_GPS_LON) => Some("GPSLongitude"),
        _ => None,
    };
    known.map_or_else(|| format!("0x{tag:04X}"), str::to_string)
}
