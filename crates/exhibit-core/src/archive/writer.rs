//! Deterministic store-only ZIP writer for evidence bundles.
//!
//! Entries are written uncompressed with zeroed timestamps, so identical
//! ordered input always produces identical bytes.

use crate::ForensicError;
use crate::Result;
use crate::archive::format::CENTRAL_HEADER_LEN;
use crate::archive::format::CENTRAL_HEADER_SIG;
use crate::archive::format::EOCD_SIG;
use crate::archive::format::FLAG_UTF8;
use crate::archive::format::LOCAL_HEADER_LEN;
use crate::archive::format::LOCAL_HEADER_SIG;
use crate::archive::format::METHOD_STORE;
use crate::archive::format::VERSION_STORE;
use crate::checksum::crc32;

/// Central directory bookkeeping for one written entry.
#[derive(Debug)]
struct CentralRecord {
    name: Vec<u8>,
    flags: u16,
    crc: u32,
    size: u32,
    local_offset: u32,
}

/// Builds a store-method ZIP archive in memory.
///
/// # Examples
///
/// ```
/// use exhibit_core::archive::ArchiveWriter;
///
/// # fn main() -> Result<(), exhibit_core::ForensicError> {
/// let mut writer = ArchiveWriter::new();
/// writer.add("forensic-report.json", b"{}")?;
/// writer.add("chain-of-custody.log", b"received\n")?;
/// let zip = writer.finish()?;
/// assert_eq!(&zip[..4], b"PK\x03\x04");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ArchiveWriter {
    buffer: Vec<u8>,
    records: Vec<CentralRecord>,
}

impl ArchiveWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no entry has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the name exceeds 65535 bytes, the payload or the
    /// archive exceeds 4 GiB, or the entry count exceeds 65535.
    pub fn add(&mut self, name: impl AsRef<str>, data: &[u8]) -> Result<&mut Self> {
        let name = name.as_ref();
        let name_len = u16::try_from(name.len())
            .map_err(|_| ForensicError::EntryNameTooLong { len: name.len() })?;
        if self.records.len() >= usize::from(u16::MAX) {
            return Err(ForensicError::TooManyEntries {
                count: self.records.len() + 1,
            });
        }
        let too_large = || ForensicError::EntryTooLarge {
            name: name.to_string(),
            size: data.len() as u64,
        };
        let size = u32::try_from(data.len()).map_err(|_| too_large())?;
        let local_offset = u32::try_from(self.buffer.len()).map_err(|_| too_large())?;
        let end = self
            .buffer
            .len()
            .checked_add(LOCAL_HEADER_LEN + name.len() + data.len())
            .ok_or_else(too_large)?;
        u32::try_from(end).map_err(|_| too_large())?;

        let flags = if name.is_ascii() { 0 } else { FLAG_UTF8 };
        let crc = crc32(data);

        let out = &mut self.buffer;
        put_u32(out, LOCAL_HEADER_SIG);
        put_u16(out, VERSION_STORE);
        put_u16(out, flags);
        put_u16(out, METHOD_STORE);
        put_u16(out, 0); // mod time
        put_u16(out, 0); // mod date
        put_u32(out, crc);
        put_u32(out, size);
        put_u32(out, size);
        put_u16(out, name_len);
        put_u16(out, 0); // extra length
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(data);

        self.records.push(CentralRecord {
            name: name.as_bytes().to_vec(),
            flags,
            crc,
            size,
            local_offset,
        });
        Ok(self)
    }

    /// Writes the central directory and EOCD and returns the archive bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the central directory would push offsets past the
    /// 32-bit ZIP limit.
    pub fn finish(self) -> Result<Vec<u8>> {
        let Self {
            mut buffer,
            records,
        } = self;
        let overflow = |len: usize| ForensicError::EntryTooLarge {
            name: "central directory".to_string(),
            size: len as u64,
        };

        let directory_offset = u32::try_from(buffer.len()).map_err(|_| overflow(buffer.len()))?;
        for record in &records {
            put_u32(&mut buffer, CENTRAL_HEADER_SIG);
            put_u16(&mut buffer, VERSION_STORE); // version made by
            put_u16(&mut buffer, VERSION_STORE); // version needed
            put_u16(&mut buffer, record.flags);
            put_u16(&mut buffer, METHOD_STORE);
            put_u16(&mut buffer, 0);
            put_u16(&mut buffer, 0);
            put_u32(&mut buffer, record.crc);
            put_u32(&mut buffer, record.size);
            put_u32(&mut buffer, record.size);
            put_u16(&mut buffer, record.name.len() as u16);
            put_u16(&mut buffer, 0); // extra length
            put_u16(&mut buffer, 0); // comment length
            put_u16(&mut buffer, 0); // disk number start
            put_u16(&mut buffer, 0); // internal attributes
            put_u32(&mut buffer, 0); // external attributes
            put_u32(&mut buffer, record.local_offset);
            buffer.extend_from_slice(&record.name);
        }
        let directory_len = buffer.len() - directory_offset as usize;
        debug_assert_eq!(
            directory_len,
            records
                .iter()
                .map(|r| CENTRAL_HEADER_LEN + r.name.len())
                .sum::<usize>()
        );
        let directory_size = u32::try_from(directory_len).map_err(|_| overflow(directory_len))?;
        u32::try_from(buffer.len()).map_err(|_| overflow(buffer.len()))?;

        let count = records.len() as u16;
        put_u32(&mut buffer, EOCD_SIG);
        put_u16(&mut buffer, 0); // this disk
        put_u16(&mut buffer, 0); // directory disk
        put_u16(&mut buffer, count);
        put_u16(&mut buffer, count);
        put_u32(&mut buffer, directory_size);
        put_u32(&mut buffer, directory_offset);
        put_u16(&mut buffer, 0); // comment length

        Ok(buffer)
    }
}

/// Writes `(name, bytes)` pairs, in order, into a store-only archive.
///
/// # Errors
///
/// Propagates [`ArchiveWriter::add`] and [`ArchiveWriter::finish`] errors.
pub fn write_store_zip<N: AsRef<str>, D: AsRef<[u8]>>(entries: &[(N, D)]) -> Result<Vec<u8>> {
    let mut writer = ArchiveWriter::new();
    for (name, data) in entries {
        writer.add(name, data.as_ref())?;
    }
    writer.finish()
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_archive_is_bare_eocd() {
        let zip = ArchiveWriter::new().finish().unwrap();
        assert_eq!(
            zip,
            vec![
                0x50, 0x4B, 0x05, 0x06, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0
            ]
        );
    }

    #[test]
    fn test_single_entry_layout() {
        let zip = write_store_zip(&[("a.txt", b"hi")]).unwrap();

        let mut expected = Vec::new();
        // Local header
        expected.extend_from_slice(b"PK\x03\x04");
        expected.extend_from_slice(&[20, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        expected.extend_from_slice(&crc32(b"hi").to_le_bytes());
        expected.extend_from_slice(&[2, 0, 0, 0, 2, 0, 0, 0, 5, 0, 0, 0]);
        expected.extend_from_slice(b"a.txt");
        expected.extend_from_slice(b"hi");
        // Central directory header
        expected.extend_from_slice(b"PK\x01\x02");
        expected.extend_from_slice(&[20, 0, 20, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        expected.extend_from_slice(&crc32(b"hi").to_le_bytes());
        expected.extend_from_slice(&[2, 0, 0, 0, 2, 0, 0, 0, 5, 0, 0, 0, 0, 0]);
        expected.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        expected.extend_from_slice(b"a.txt");
        // EOCD
        expected.extend_from_slice(b"PK\x05\x06");
        expected.extend_from_slice(&[0, 0, 0, 0, 1, 0, 1, 0]);
        expected.extend_from_slice(&51u32.to_le_bytes());
        expected.extend_from_slice(&37u32.to_le_bytes());
        expected.extend_from_slice(&[0, 0]);

        assert_eq!(zip, expected);
    }

    #[test]
    fn test_output_is_deterministic() {
        let entries = [("one.txt", &b"first"[..]), ("two/two.txt", &b"second"[..])];
        assert_eq!(
            write_store_zip(&entries).unwrap(),
            write_store_zip(&entries).unwrap()
        );
    }

    #[test]
    fn test_utf8_name_sets_flag() {
        let zip = write_store_zip(&[("r\u{e9}sum\u{e9}.txt", b"")]).unwrap();
        let flags = u16::from_le_bytes([zip[6], zip[7]]);
        assert_eq!(flags & FLAG_UTF8, FLAG_UTF8);
    }

    #[test]
    fn test_name_too_long_rejected() {
        let name = "n".repeat(usize::from(u16::MAX) + 1);
        let err = ArchiveWriter::new().add(&name, b"").unwrap_err();
        assert!(matches!(err, ForensicError::EntryNameTooLong { .. }));
    }

    #[test]
    fn test_len_tracks_entries() {
        let mut writer = ArchiveWriter::new();
        assert!(writer.is_empty());
        writer.add("a", b"1").unwrap().add("b", b"2").unwrap();
        assert_eq!(writer.len(), 2);
    }
}
