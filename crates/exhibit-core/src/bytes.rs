//! Bounds-checked readers over untrusted byte buffers.
//!
//! Every multi-byte read in the parsers goes through these helpers. A read
//! that would leave the buffer (including offset overflow) yields `None` and is
//! never attempted.

/// Byte order of a multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Least significant byte first (`II` in TIFF, all of ZIP).
    Little,
    /// Most significant byte first (`MM` in TIFF, PNG chunk lengths).
    Big,
}

impl Endian {
    /// Reads a `u16` at `offset`.
    #[inline]
    #[must_use]
    pub fn read_u16(self, data: &[u8], offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = slice(data, offset, 2)?.try_into().ok()?;
        Some(match self {
            Self::Little => u16::from_le_bytes(bytes),
            Self::Big => u16::from_be_bytes(bytes),
        })
    }

    /// Reads a `u32` at `offset`.
    #[inline]
    #[must_use]
    pub fn read_u32(self, data: &[u8], offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = slice(data, offset, 4)?.try_into().ok()?;
        Some(match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        })
    }
}

/// Returns `data[offset..offset + len]` if the whole range is in bounds.
#[inline]
#[must_use]
pub fn slice(data: &[u8], offset: usize, len: usize) -> Option<&[u8]> {
    let end = offset.checked_add(len)?;
    data.get(offset..end)
}

/// Reads a little-endian `u16`.
#[inline]
#[must_use]
pub fn le_u16(data: &[u8], offset: usize) -> Option<u16> {
    Endian::Little.read_u16(data, offset)
}

/// Reads a little-endian `u32`.
#[inline]
#[must_use]
pub fn le_u32(data: &[u8], offset: usize) -> Option<u32> {
    Endian::Little.read_u32(data, offset)
}

/// Reads a big-endian `u16`.
#[inline]
#[must_use]
pub fn be_u16(data: &[u8], offset: usize) -> Option<u16> {
    Endian::Big.read_u16(data, offset)
}

/// Reads a big-endian `u32`.
#[inline]
#[must_use]
pub fn be_u32(data: &[u8], offset: usize) -> Option<u32> {
    Endian::Big.read_u32(data, offset)
}

/// Decodes bytes as ASCII-ish text, dropping trailing NULs and whitespace.
///
/// Invalid UTF-8 is replaced rather than rejected; metadata strings written
/// by cameras are frequently padded or mis-encoded.
#[must_use]
pub fn trimmed_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_in_bounds() {
        let data = [0x50, 0x4B, 0x03, 0x04];
        assert_eq!(le_u32(&data, 0), Some(0x0403_4B50));
        assert_eq!(be_u32(&data, 0), Some(0x504B_0304));
        assert_eq!(le_u16(&data, 2), Some(0x0403));
        assert_eq!(be_u16(&data, 0), Some(0x504B));
    }

    #[test]
    fn test_reads_out_of_bounds() {
        let data = [1, 2, 3];
        assert_eq!(le_u32(&data, 0), None);
        assert_eq!(le_u16(&data, 2), None);
        assert_eq!(le_u16(&data, usize::MAX), None);
        assert_eq!(slice(&data, usize::MAX - 1, 4), None);
    }

    #[test]
    fn test_trimmed_text() {
        assert_eq!(trimmed_text(b"TestCam\0"), "TestCam");
        assert_eq!(trimmed_text(b"  Model X \0\0junk"), "Model X");
        assert_eq!(trimmed_text(b""), "");
    }
}
