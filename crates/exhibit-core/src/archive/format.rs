//! ZIP record signatures, fixed header sizes and flag bits.

/// Local file header signature (`PK\x03\x04`).
pub const LOCAL_HEADER_SIG: u32 = 0x0403_4B50;
/// Central directory file header signature (`PK\x01\x02`).
pub const CENTRAL_HEADER_SIG: u32 = 0x0201_4B50;
/// End of central directory signature (`PK\x05\x06`).
pub const EOCD_SIG: u32 = 0x0605_4B50;
/// Data descriptor / spanning marker signature (`PK\x07\x08`).
pub const DATA_DESCRIPTOR_SIG: u32 = 0x0807_4B50;

/// Fixed part of a local file header.
pub const LOCAL_HEADER_LEN: usize = 30;
/// Fixed part of a central directory header.
pub const CENTRAL_HEADER_LEN: usize = 46;
/// Fixed part of the EOCD record.
pub const EOCD_LEN: usize = 22;
/// Largest ZIP comment, bounding the backward EOCD search.
pub const MAX_COMMENT_LEN: usize = 0xFFFF;

/// General purpose flag: entry is encrypted.
pub const FLAG_ENCRYPTED: u16 = 1 << 0;
/// General purpose flag: sizes and CRC follow the data in a descriptor.
pub const FLAG_STREAMED: u16 = 1 << 3;
/// General purpose flag: name and comment are UTF-8.
pub const FLAG_UTF8: u16 = 1 << 11;

/// "Version needed to extract" written for stored entries (2.0).
pub const VERSION_STORE: u16 = 20;
/// Compression method: stored (no compression).
pub const METHOD_STORE: u16 = 0;
