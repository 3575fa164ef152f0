//! Structural trust scoring for scanned archives.
//!
//! The score starts high and loses a capped amount per signal class, so a
//! flood of one kind of entry cannot drown out every other signal.

use crate::archive::entry::ArchiveScanResult;
use crate::archive::entry::ParseMode;

/// Score before any deduction.
pub const BASELINE: u8 = 96;
/// Lowest score a parsed archive can reach.
pub const FLOOR: u8 = 10;

/// Deduction rule for one signal class.
#[derive(Debug, Clone, Copy)]
struct Deduction {
    first: u32,
    each_additional: u32,
    cap: u32,
}

impl Deduction {
    const fn new(first: u32, each_additional: u32, cap: u32) -> Self {
        Self {
            first,
            each_additional,
            cap,
        }
    }

    fn apply(self, count: usize) -> u32 {
        if count == 0 {
            return 0;
        }
        let extra = u32::try_from(count - 1).unwrap_or(u32::MAX);
        self.first
            .saturating_add(self.each_additional.saturating_mul(extra))
            .min(self.cap)
    }
}

const ENCRYPTION: Deduction = Deduction::new(10, 2, 20);
const TRAVERSAL: Deduction = Deduction::new(25, 5, 40);
const EXECUTABLE: Deduction = Deduction::new(18, 4, 30);
const DOUBLE_EXTENSION: Deduction = Deduction::new(16, 4, 24);
const MACRO: Deduction = Deduction::new(8, 3, 18);
const NESTED: Deduction = Deduction::new(4, 2, 12);

const BOMB: u32 = 40;
const ELEVATED_RATIO: f64 = 50.0;
const ELEVATED_RATIO_PENALTY: u32 = 8;
const FALLBACK_WALK_PENALTY: u32 = 6;
const PARTIAL_WALK_PENALTY: u32 = 4;

/// Per-class deductions, in report order.
#[must_use]
pub fn deductions(result: &ArchiveScanResult) -> [(&'static str, u32); 8] {
    let bomb = if result.possible_bomb {
        BOMB
    } else if result.max_compression_ratio > ELEVATED_RATIO {
        ELEVATED_RATIO_PENALTY
    } else {
        0
    };
    let mut structure = 0;
    if result.parse_mode == ParseMode::LocalHeaderScan {
        structure += FALLBACK_WALK_PENALTY;
    }
    if result.partial {
        structure += PARTIAL_WALK_PENALTY;
    }

    [
        ("encryption", ENCRYPTION.apply(result.encrypted_count)),
        ("traversal", TRAVERSAL.apply(result.traversal_count)),
        ("executables", EXECUTABLE.apply(result.high_risk_file_count)),
        ("double_extension", DOUBLE_EXTENSION.apply(result.double_extension_count)),
        ("macros", MACRO.apply(result.macro_file_count)),
        ("nested_archives", NESTED.apply(result.nested_archive_count)),
        ("bomb", bomb),
        ("structure", structure),
    ]
}

/// Computes the trust score, clamped to `[10, 96]`.
#[must_use]
pub fn trust_score(result: &ArchiveScanResult) -> u8 {
    let total: u32 = deductions(result).iter().map(|(_, d)| d).sum();
    let score = u32::from(BASELINE).saturating_sub(total);
    score.clamp(u32::from(FLOOR), u32::from(BASELINE)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean() -> ArchiveScanResult {
        ArchiveScanResult {
            valid_zip: true,
            parse_mode: ParseMode::CentralDirectory,
            findings: Vec::new(),
            ..ArchiveScanResult::invalid()
        }
    }

    #[test]
    fn test_clean_archive_scores_baseline() {
        assert_eq!(trust_score(&clean()), BASELINE);
    }

    #[test]
    fn test_deductions_are_capped() {
        let mut result = clean();
        result.high_risk_file_count = 1;
        assert_eq!(trust_score(&result), BASELINE - 18);
        result.high_risk_file_count = 1_000;
        assert_eq!(trust_score(&result), BASELINE - 30);
    }

    #[test]
    fn test_score_never_below_floor() {
        let mut result = clean();
        result.encrypted_count = 50;
        result.traversal_count = 50;
        result.high_risk_file_count = 50;
        result.double_extension_count = 50;
        result.possible_bomb = true;
        assert_eq!(trust_score(&result), FLOOR);
    }

    #[test]
    fn test_structure_penalties() {
        let mut result = clean();
        result.parse_mode = ParseMode::LocalHeaderScan;
        result.partial = true;
        assert_eq!(trust_score(&result), BASELINE - 10);
    }

    #[test]
    fn test_elevated_ratio_without_bomb() {
        let mut result = clean();
        result.max_compression_ratio = 80.0;
        assert_eq!(trust_score(&result), BASELINE - 8);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_huge_counts_saturate_at_cap() {
        // 2^32 + 2 entries must not wrap around to a single extra.
        let count = (1_usize << 32) + 2;
        assert_eq!(TRAVERSAL.apply(count), 40);
        assert_eq!(ENCRYPTION.apply(usize::MAX), 20);
    }
}
