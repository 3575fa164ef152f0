//! Extraction-free ZIP structural scanner.
//!
//! The inspector reads only headers. Entry payloads are never decompressed,
//! so hostile content cannot run or expand during analysis. Every length and
//! offset in the input is treated as attacker-controlled.

use memchr::memmem;
use tracing::debug;

use crate::InspectionConfig;
use crate::archive::bomb::CompressionMetrics;
use crate::archive::bomb::assess_bomb;
use crate::archive::entry::ArchiveScanResult;
use crate::archive::entry::ParseMode;
use crate::archive::entry::ZipEntry;
use crate::archive::format::CENTRAL_HEADER_LEN;
use crate::archive::format::CENTRAL_HEADER_SIG;
use crate::archive::format::DATA_DESCRIPTOR_SIG;
use crate::archive::format::EOCD_LEN;
use crate::archive::format::EOCD_SIG;
use crate::archive::format::FLAG_ENCRYPTED;
use crate::archive::format::FLAG_STREAMED;
use crate::archive::format::FLAG_UTF8;
use crate::archive::format::LOCAL_HEADER_LEN;
use crate::archive::format::LOCAL_HEADER_SIG;
use crate::archive::format::MAX_COMMENT_LEN;
use crate::archive::signals::classify_entry;
use crate::archive::trust::trust_score;
use crate::bytes::le_u16;
use crate::bytes::le_u32;
use crate::bytes::slice;
use crate::types::Finding;
use crate::types::FindingCategory;
use crate::types::Severity;

/// Entry names quoted in one aggregate finding.
const MAX_EXAMPLES: usize = 3;

/// Location and counts from the end-of-central-directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EndOfCentralDirectory {
    total_entries: u16,
    directory_offset: u32,
}

/// Entries recovered by one directory walk.
#[derive(Debug, Default)]
struct DirectoryWalk {
    entries: Vec<ZipEntry>,
    partial: bool,
}

/// Scans a ZIP buffer and scores its structural risk.
///
/// Never fails: malformed input produces a low-trust result. Input without a
/// ZIP signature at offset 0 short-circuits to a fixed trust score of 12.
///
/// # Examples
///
/// ```
/// use exhibit_core::InspectionConfig;
/// use exhibit_core::archive::ArchiveWriter;
/// use exhibit_core::archive::inspect_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut writer = ArchiveWriter::new();
/// writer.add("notes/readme.txt", b"hello")?;
/// let zip = writer.finish()?;
///
/// let result = inspect_archive(&zip, &InspectionConfig::default());
/// assert!(result.valid_zip);
/// assert_eq!(result.entries[0].name, "notes/readme.txt");
///
/// let garbage = inspect_archive(b"not a zip", &InspectionConfig::default());
/// assert!(!garbage.valid_zip);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn inspect_archive(data: &[u8], config: &InspectionConfig) -> ArchiveScanResult {
    if !has_zip_signature(data) {
        debug!(len = data.len(), "no ZIP signature at offset 0");
        return ArchiveScanResult::invalid();
    }

    let eocd = find_eocd(data);
    let mut parse_mode = ParseMode::CentralDirectory;
    let mut walk = eocd.map_or_else(DirectoryWalk::default, |eocd| {
        walk_central_directory(data, eocd)
    });

    if walk.entries.is_empty() {
        let scanned = scan_local_headers(data);
        if !scanned.entries.is_empty() || eocd.is_none() {
            debug!(
                found = scanned.entries.len(),
                has_eocd = eocd.is_some(),
                "falling back to local header scan"
            );
            parse_mode = ParseMode::LocalHeaderScan;
            walk = scanned;
        }
    }

    build_result(walk, parse_mode, eocd, config)
}

/// Returns `true` if a local header, EOCD or data descriptor signature sits at
/// offset 0.
#[must_use]
pub fn has_zip_signature(data: &[u8]) -> bool {
    matches!(
        le_u32(data, 0),
        Some(LOCAL_HEADER_SIG | EOCD_SIG | DATA_DESCRIPTOR_SIG)
    )
}

fn find_eocd(data: &[u8]) -> Option<EndOfCentralDirectory> {
    let start = data.len().checked_sub(EOCD_LEN)?;
    let lowest = data.len().saturating_sub(MAX_COMMENT_LEN + 1 + EOCD_LEN);
    (lowest..=start).rev().find_map(|pos| {
        if le_u32(data, pos)? != EOCD_SIG {
            return None;
        }
        Some(EndOfCentralDirectory {
            total_entries: le_u16(data, pos + 10)?,
            directory_offset: le_u32(data, pos + 16)?,
        })
    })
}

fn walk_central_directory(data: &[u8], eocd: EndOfCentralDirectory) -> DirectoryWalk {
    let mut walk = DirectoryWalk::default();
    let mut offset = eocd.directory_offset as usize;

    for index in 0..eocd.total_entries {
        match read_central_header(data, offset) {
            Some((entry, next)) => {
                walk.entries.push(entry);
                offset = next;
            }
            None => {
                debug!(
                    index,
                    offset,
                    declared = eocd.total_entries,
                    "central directory walk stopped"
                );
                walk.partial = true;
                break;
            }
        }
    }

    walk
}

fn read_central_header(data: &[u8], offset: usize) -> Option<(ZipEntry, usize)> {
    if le_u32(data, offset)? != CENTRAL_HEADER_SIG {
        return None;
    }
    let flags = le_u16(data, offset + 8)?;
    let compressed = le_u32(data, offset + 20)?;
    let uncompressed = le_u32(data, offset + 24)?;
    let name_len = usize::from(le_u16(data, offset + 28)?);
    let extra_len = usize::from(le_u16(data, offset + 30)?);
    let comment_len = usize::from(le_u16(data, offset + 32)?);

    let name_start = offset.checked_add(CENTRAL_HEADER_LEN)?;
    let name = slice(data, name_start, name_len)?;
    let next = name_start
        .checked_add(name_len)?
        .checked_add(extra_len)?
        .checked_add(comment_len)?;
    if next > data.len() {
        return None;
    }

    Some((make_entry(name, flags, compressed, uncompressed), next))
}

/// Best-effort walk over local file headers.
///
/// Streamed entries (flag bit 3) store their sizes after the payload, so the
/// payload cannot be skipped reliably; the scan resumes right after the header
/// and the entry keeps whatever placeholder sizes the header declared.
fn scan_local_headers(data: &[u8]) -> DirectoryWalk {
    let sig_bytes = LOCAL_HEADER_SIG.to_le_bytes();
    let finder = memmem::Finder::new(&sig_bytes);
    let mut walk = DirectoryWalk::default();
    let mut pos = 0;

    while pos < data.len() {
        let Some(found) = finder.find(&data[pos..]) else {
            break;
        };
        let at = pos + found;
        match read_local_header(data, at) {
            Some((entry, resume, truncated)) => {
                walk.entries.push(entry);
                walk.partial |= truncated;
                pos = resume;
            }
            None => {
                walk.partial = true;
                pos = at + 4;
            }
        }
    }

    walk
}

fn read_local_header(data: &[u8], offset: usize) -> Option<(ZipEntry, usize, bool)> {
    let flags = le_u16(data, offset + 6)?;
    let compressed = le_u32(data, offset + 18)?;
    let uncompressed = le_u32(data, offset + 22)?;
    let name_len = usize::from(le_u16(data, offset + 26)?);
    let extra_len = usize::from(le_u16(data, offset + 28)?);

    let name_start = offset.checked_add(LOCAL_HEADER_LEN)?;
    let name = slice(data, name_start, name_len)?;
    let header_end = name_start.checked_add(name_len)?.checked_add(extra_len)?;
    if header_end > data.len() {
        return None;
    }

    let entry = make_entry(name, flags, compressed, uncompressed);
    if entry.streamed {
        return Some((entry, header_end, false));
    }
    match header_end.checked_add(compressed as usize) {
        Some(payload_end) if payload_end <= data.len() => Some((entry, payload_end, false)),
        _ => Some((entry, header_end, true)),
    }
}

fn make_entry(name: &[u8], flags: u16, compressed: u32, uncompressed: u32) -> ZipEntry {
    ZipEntry {
        name: decode_name(name, flags & FLAG_UTF8 != 0),
        compressed_size: u64::from(compressed),
        uncompressed_size: u64::from(uncompressed),
        encrypted: flags & FLAG_ENCRYPTED != 0,
        streamed: flags & FLAG_STREAMED != 0,
    }
}

/// Decodes an entry name: UTF-8 when flagged, otherwise each byte maps to the
/// code point of the same value.
fn decode_name(raw: &[u8], utf8: bool) -> String {
    if utf8 {
        String::from_utf8_lossy(raw).into_owned()
    } else {
        raw.iter().map(|&b| char::from(b)).collect()
    }
}

/// Names of entries matching a predicate, in directory order.
struct SignalTally<'a> {
    names: Vec<&'a str>,
}

impl<'a> SignalTally<'a> {
    const fn new() -> Self {
        Self { names: Vec::new() }
    }

    fn record(&mut self, hit: bool, name: &'a str) {
        if hit {
            self.names.push(name);
        }
    }

    fn count(&self) -> usize {
        self.names.len()
    }

    fn finding(
        &self,
        severity: Severity,
        category: FindingCategory,
        what: &str,
    ) -> Option<Finding> {
        let first = self.names.first()?;
        let examples = self
            .names
            .iter()
            .take(MAX_EXAMPLES)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        let more = self.count().saturating_sub(MAX_EXAMPLES);
        let suffix = if more > 0 {
            format!(" and {more} more")
        } else {
            String::new()
        };
        Some(
            Finding::new(
                severity,
                category,
                format!("{} {what}: {examples}{suffix}", self.count()),
            )
            .with_entry(*first),
        )
    }
}

fn build_result(
    walk: DirectoryWalk,
    parse_mode: ParseMode,
    eocd: Option<EndOfCentralDirectory>,
    config: &InspectionConfig,
) -> ArchiveScanResult {
    let mut encrypted = SignalTally::new();
    let mut traversal = SignalTally::new();
    let mut double_ext = SignalTally::new();
    let mut high_risk = SignalTally::new();
    let mut macros = SignalTally::new();
    let mut nested = SignalTally::new();

    for entry in &walk.entries {
        let signals = classify_entry(&entry.name);
        encrypted.record(entry.encrypted, &entry.name);
        traversal.record(signals.traversal, &entry.name);
        double_ext.record(signals.double_extension, &entry.name);
        high_risk.record(signals.high_risk, &entry.name);
        macros.record(signals.macro_document, &entry.name);
        nested.record(signals.nested_archive, &entry.name);
    }

    let metrics = CompressionMetrics::from_entries(&walk.entries);
    let indicators = assess_bomb(walk.entries.len(), &metrics, config);

    let mut findings = Vec::new();
    if parse_mode == ParseMode::LocalHeaderScan {
        findings.push(Finding::new(
            Severity::Warning,
            FindingCategory::Structure,
            "Central directory missing or empty; entries recovered from local headers \
             (sizes of streamed entries are unreliable)",
        ));
    }
    if walk.partial {
        findings.push(Finding::new(
            Severity::Warning,
            FindingCategory::Structure,
            format!(
                "Directory walk stopped on an inconsistent record after {} of {} entries",
                walk.entries.len(),
                eocd.map_or_else(|| "?".to_string(), |e| e.total_entries.to_string())
            ),
        ));
    }
    findings.extend(traversal.finding(
        Severity::Critical,
        FindingCategory::PathTraversal,
        "entry name(s) escape the extraction root",
    ));
    findings.extend(double_ext.finding(
        Severity::Critical,
        FindingCategory::DoubleExtension,
        "executable payload(s) disguised with a document extension",
    ));
    findings.extend(high_risk.finding(
        Severity::Critical,
        FindingCategory::Executable,
        "executable or script payload(s)",
    ));
    if !indicators.is_empty() {
        let reasons = indicators
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        findings.push(Finding::new(
            Severity::Critical,
            FindingCategory::ArchiveBomb,
            format!("Possible archive bomb: {reasons}"),
        ));
    }
    findings.extend(encrypted.finding(
        Severity::Warning,
        FindingCategory::Encryption,
        "encrypted entr(ies) cannot be inspected",
    ));
    findings.extend(macros.finding(
        Severity::Warning,
        FindingCategory::Macro,
        "macro-enabled Office document(s)",
    ));
    findings.extend(nested.finding(
        Severity::Info,
        FindingCategory::NestedArchive,
        "nested archive(s) hide a second layer",
    ));

    let mut result = ArchiveScanResult {
        valid_zip: true,
        parse_mode,
        partial: walk.partial,
        declared_entry_count: eocd.map(|e| usize::from(e.total_entries)),
        encrypted_count: encrypted.count(),
        traversal_count: traversal.count(),
        double_extension_count: double_ext.count(),
        high_risk_file_count: high_risk.count(),
        macro_file_count: macros.count(),
        nested_archive_count: nested.count(),
        total_compressed: metrics.total_compressed,
        total_uncompressed: metrics.total_uncompressed,
        max_compression_ratio: metrics.max_ratio,
        possible_bomb: !indicators.is_empty(),
        trust_score: 0,
        findings,
        entries: Vec::new(),
    };
    result.trust_score = trust_score(&result);
    result.entries = walk.entries;
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::archive::ArchiveWriter;

    fn store_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ArchiveWriter::new();
        for (name, data) in entries {
            writer.add(*name, data).unwrap();
        }
        writer.finish().unwrap()
    }

    /// Hand-built local header with arbitrary flags and sizes.
    fn local_header(name: &str, flags: u16, compressed: u32, uncompressed: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&LOCAL_HEADER_SIG.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&flags.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&[0; 8]);
        out.extend_from_slice(&compressed.to_le_bytes());
        out.extend_from_slice(&uncompressed.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out
    }

    #[test]
    fn test_invalid_signature_short_circuits() {
        let result = inspect_archive(b"%PDF-1.7 not a zip", &InspectionConfig::default());
        assert!(!result.valid_zip);
        assert_eq!(result.parse_mode, ParseMode::Invalid);
        assert_eq!(result.trust_score, 12);
        assert!(result.entries.is_empty());
    }

    #[test]
    fn test_empty_and_tiny_inputs() {
        let config = InspectionConfig::default();
        assert!(!inspect_archive(b"", &config).valid_zip);
        assert!(!inspect_archive(b"PK", &config).valid_zip);
        let result = inspect_archive(&LOCAL_HEADER_SIG.to_le_bytes(), &config);
        assert!(result.valid_zip);
        assert!(result.entries.is_empty());
    }

    #[test]
    fn test_clean_archive() {
        let zip = store_zip(&[("folder/file.txt", b"hello"), ("b.txt", b"world")]);
        let result = inspect_archive(&zip, &InspectionConfig::default());
        assert!(result.valid_zip);
        assert_eq!(result.parse_mode, ParseMode::CentralDirectory);
        assert!(!result.partial);
        assert_eq!(result.entry_count(), 2);
        assert_eq!(result.declared_entry_count, Some(2));
        assert_eq!(result.traversal_count, 0);
        assert_eq!(result.trust_score, 96);
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_traversal_entries_counted() {
        let zip = store_zip(&[
            ("../../etc/passwd", b"x"),
            ("C:/Windows/x", b"y"),
            ("folder/file.txt", b"z"),
        ]);
        let result = inspect_archive(&zip, &InspectionConfig::default());
        assert_eq!(result.traversal_count, 2);
        let finding = result
            .findings
            .iter()
            .find(|f| f.category == FindingCategory::PathTraversal)
            .unwrap();
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.entry.as_deref(), Some("../../etc/passwd"));
    }

    #[test]
    fn test_high_risk_case_insensitive_counts_once_each() {
        let zip = store_zip(&[("x.EXE", b""), ("x.exe", b"")]);
        let result = inspect_archive(&zip, &InspectionConfig::default());
        assert_eq!(result.high_risk_file_count, 2);
    }

    #[test]
    fn test_fallback_when_central_directory_missing() {
        let mut data = local_header("a.txt", 0, 3, 3);
        data.extend_from_slice(b"abc");
        data.extend(local_header("payload.exe", 0, 2, 2));
        data.extend_from_slice(b"MZ");

        let result = inspect_archive(&data, &InspectionConfig::default());
        assert_eq!(result.parse_mode, ParseMode::LocalHeaderScan);
        assert_eq!(result.entry_count(), 2);
        assert_eq!(result.entries[1].name, "payload.exe");
        assert_eq!(result.high_risk_file_count, 1);
        assert!(
            result
                .findings
                .iter()
                .any(|f| f.category == FindingCategory::Structure)
        );
    }

    #[test]
    fn test_fallback_streamed_entry_is_best_effort() {
        let mut data = local_header("streamed.bin", FLAG_STREAMED, 0, 0);
        data.extend_from_slice(b"payload bytes");
        data.extend(local_header("second.txt", 0, 1, 1));
        data.push(b'x');

        let result = inspect_archive(&data, &InspectionConfig::default());
        assert_eq!(result.entry_count(), 2);
        assert!(result.entries[0].streamed);
        assert_eq!(result.entries[0].compressed_size, 0);
        assert_eq!(result.entries[1].name, "second.txt");
    }

    #[test]
    fn test_truncated_central_directory_keeps_decoded_entries() {
        let zip = store_zip(&[("one.txt", b"1"), ("two.txt", b"2"), ("three.txt", b"3")]);
        let eocd_pos = zip.len() - EOCD_LEN;
        let cd_offset = le_u32(&zip, eocd_pos + 16).unwrap() as usize;

        // Corrupt the second central header signature.
        let second = cd_offset + CENTRAL_HEADER_LEN + "one.txt".len();
        let mut corrupted = zip.clone();
        corrupted[second] = 0;

        let result = inspect_archive(&corrupted, &InspectionConfig::default());
        assert!(result.partial);
        assert_eq!(result.entry_count(), 1);
        assert_eq!(result.entries[0].name, "one.txt");
        assert!(result.trust_score < 96);
    }

    #[test]
    fn test_hostile_directory_offset() {
        let mut zip = store_zip(&[("a.txt", b"a")]);
        let eocd_pos = zip.len() - EOCD_LEN;
        zip[eocd_pos + 16..eocd_pos + 20].copy_from_slice(&u32::MAX.to_le_bytes());
        zip[eocd_pos + 10..eocd_pos + 12].copy_from_slice(&u16::MAX.to_le_bytes());

        let result = inspect_archive(&zip, &InspectionConfig::default());
        assert!(result.valid_zip);
        // Central walk yields nothing; the local header scan still finds a.txt.
        assert_eq!(result.parse_mode, ParseMode::LocalHeaderScan);
        assert_eq!(result.entries[0].name, "a.txt");
    }

    #[test]
    fn test_encrypted_flag_and_non_utf8_name() {
        let mut data = local_header("", FLAG_ENCRYPTED, 0, 0);
        // Patch in a Latin-1 name byte.
        data[26] = 1;
        data.push(0xE9);

        let result = inspect_archive(&data, &InspectionConfig::default());
        assert_eq!(result.encrypted_count, 1);
        assert_eq!(result.entries[0].name, "\u{e9}");
    }

    #[test]
    fn test_declared_ratio_triggers_bomb() {
        let mut data = local_header("huge.txt", 0, 1_000, 500_000_000);
        data.extend(std::iter::repeat_n(0u8, 1_000));

        let result = inspect_archive(&data, &InspectionConfig::default());
        assert!(result.possible_bomb);
        assert!(
            result
                .findings
                .iter()
                .any(|f| f.category == FindingCategory::ArchiveBomb)
        );
    }

    #[test]
    fn test_findings_are_deterministic() {
        let zip = store_zip(&[("a.exe", b""), ("../b.txt", b""), ("c.docm", b"")]);
        let first = inspect_archive(&zip, &InspectionConfig::default());
        let second = inspect_archive(&zip, &InspectionConfig::default());
        assert_eq!(first.findings, second.findings);
    }
}
