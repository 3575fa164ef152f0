//! CRC32 checksum (IEEE 802.3, reflected polynomial `0xEDB88320`).
//!
//! Computed bit by bit without a lookup table. Used by the archive writer and
//! for quick integrity lines in reports; it detects corruption, not tampering.

const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Incremental CRC32 hasher.
///
/// # Examples
///
/// ```
/// use exhibit_core::checksum::Crc32;
///
/// let mut crc = Crc32::new();
/// crc.update(b"1234");
/// crc.update(b"56789");
/// assert_eq!(crc.finalize(), 0xCBF4_3926);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    /// Creates a hasher in its initial state.
    #[must_use]
    pub const fn new() -> Self {
        Self { state: 0xFFFF_FFFF }
    }

    /// Feeds bytes into the checksum.
    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.state;
        for &byte in data {
            crc ^= u32::from(byte);
            for _ in 0..8 {
                let mask = (crc & 1).wrapping_neg();
                crc = (crc >> 1) ^ (POLYNOMIAL & mask);
            }
        }
        self.state = crc;
    }

    /// Returns the final checksum value.
    #[must_use]
    pub const fn finalize(self) -> u32 {
        !self.state
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the CRC32 of `data` in one call.
///
/// # Examples
///
/// ```
/// use exhibit_core::checksum::crc32;
///
/// assert_eq!(crc32(b""), 0);
/// assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
/// ```
#[must_use]
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(data);
    crc.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_empty() {
        assert_eq!(crc32(b""), 0x0000_0000);
    }

    #[test]
    fn test_crc32_check_value() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_crc32_known_strings() {
        assert_eq!(crc32(b"a"), 0xE8B7_BE43);
        assert_eq!(
            crc32(b"The quick brown fox jumps over the lazy dog"),
            0x414F_A339
        );
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let data = b"chain-of-custody entry";
        let mut crc = Crc32::default();
        for chunk in data.chunks(5) {
            crc.update(chunk);
        }
        assert_eq!(crc.finalize(), crc32(data));
    }
}
