//! Archive bomb heuristics over declared sizes.

use serde::Serialize;

use crate::InspectionConfig;
use crate::archive::entry::ZipEntry;

/// Aggregate compression figures for an entry list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompressionMetrics {
    /// Sum of declared compressed sizes.
    pub total_compressed: u64,
    /// Sum of declared uncompressed sizes.
    pub total_uncompressed: u64,
    /// Largest single-entry ratio.
    pub max_ratio: f64,
    /// Entry holding the largest ratio.
    pub max_ratio_entry: Option<String>,
}

impl CompressionMetrics {
    /// Computes metrics over the entries.
    ///
    /// Streamed entries count toward totals but never toward the ratio, since
    /// their declared sizes are placeholders.
    #[must_use]
    pub fn from_entries(entries: &[ZipEntry]) -> Self {
        let mut metrics = Self::default();
        for entry in entries {
            let (compressed, uncompressed) = (entry.compressed_size, entry.uncompressed_size);
            metrics.total_compressed = metrics.total_compressed.saturating_add(compressed);
            metrics.total_uncompressed = metrics.total_uncompressed.saturating_add(uncompressed);
            if entry.streamed {
                continue;
            }
            if let Some(ratio) = entry.compression_ratio()
                && ratio > metrics.max_ratio
            {
                metrics.max_ratio = ratio;
                metrics.max_ratio_entry = Some(entry.name.clone());
            }
        }
        metrics
    }
}

/// Which bomb rule fired.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BombIndicator {
    /// Too many entries.
    EntryFlood {
        /// Entries decoded.
        count: usize,
        /// Configured maximum.
        max: usize,
    },
    /// Total declared expansion too large.
    TotalSize {
        /// Declared uncompressed total.
        uncompressed: u64,
        /// Configured maximum.
        max: u64,
    },
    /// One entry expands too far.
    Ratio {
        /// Observed ratio.
        ratio: f64,
        /// Configured maximum.
        max: f64,
    },
    /// A small archive claims a very large payload.
    SmallArchiveExpansion {
        /// Declared compressed total.
        compressed: u64,
        /// Declared uncompressed total.
        uncompressed: u64,
    },
}

impl std::fmt::Display for BombIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntryFlood { count, max } => write!(f, "{count} entries (limit {max})"),
            Self::TotalSize { uncompressed, max } => {
                write!(f, "declared expansion {uncompressed} bytes (limit {max})")
            }
            Self::Ratio { ratio, max } => {
                write!(f, "compression ratio {ratio:.1}:1 (limit {max:.0}:1)")
            }
            Self::SmallArchiveExpansion {
                compressed,
                uncompressed,
            } => write!(
                f,
                "{compressed} compressed bytes expand to {uncompressed} bytes"
            ),
        }
    }
}

/// Evaluates the bomb rules; an empty result means no indicator fired.
///
/// # Examples
///
/// ```
/// use exhibit_core::InspectionConfig;
/// use exhibit_core::archive::bomb::CompressionMetrics;
/// use exhibit_core::archive::bomb::assess_bomb;
///
/// let metrics = CompressionMetrics {
///     total_compressed: 1_000,
///     total_uncompressed: 1_000_000,
///     max_ratio: 1000.0,
///     max_ratio_entry: None,
/// };
/// assert!(!assess_bomb(1, &metrics, &InspectionConfig::default()).is_empty());
/// ```
#[must_use]
pub fn assess_bomb(
    entry_count: usize,
    metrics: &CompressionMetrics,
    config: &InspectionConfig,
) -> Vec<BombIndicator> {
    let mut indicators = Vec::new();

    if entry_count > config.max_entry_count {
        indicators.push(BombIndicator::EntryFlood {
            count: entry_count,
            max: config.max_entry_count,
        });
    }
    if metrics.total_uncompressed > config.max_total_uncompressed {
        indicators.push(BombIndicator::TotalSize {
            uncompressed: metrics.total_uncompressed,
            max: config.max_total_uncompressed,
        });
    }
    if metrics.max_ratio > config.max_compression_ratio {
        indicators.push(BombIndicator::Ratio {
            ratio: metrics.max_ratio,
            max: config.max_compression_ratio,
        });
    }
    if metrics.total_compressed < config.small_archive_compressed
        && metrics.total_uncompressed > config.small_archive_uncompressed
    {
        indicators.push(BombIndicator::SmallArchiveExpansion {
            compressed: metrics.total_compressed,
            uncompressed: metrics.total_uncompressed,
        });
    }

    indicators
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, compressed: u64, uncompressed: u64, streamed: bool) -> ZipEntry {
        ZipEntry {
            name: name.to_string(),
            compressed_size: compressed,
            uncompressed_size: uncompressed,
            encrypted: false,
            streamed,
        }
    }

    #[test]
    fn test_metrics_track_max_ratio() {
        let entries = vec![
            entry("a.txt", 100, 1_000, false),
            entry("b.txt", 10, 5_000, false),
            entry("c.txt", 0, 9_999, false),
        ];
        let metrics = CompressionMetrics::from_entries(&entries);
        assert_eq!(metrics.total_compressed, 110);
        assert_eq!(metrics.total_uncompressed, 15_999);
        assert!((metrics.max_ratio - 500.0).abs() < f64::EPSILON);
        assert_eq!(metrics.max_ratio_entry.as_deref(), Some("b.txt"));
    }

    #[test]
    fn test_streamed_entries_skip_ratio() {
        let entries = vec![entry("s.bin", 1, 1_000_000, true)];
        let metrics = CompressionMetrics::from_entries(&entries);
        assert!(metrics.max_ratio.abs() < f64::EPSILON);
    }

    #[test]
    fn test_safe_archive_has_no_indicators() {
        let metrics = CompressionMetrics {
            total_compressed: 1_000,
            total_uncompressed: 10_000,
            max_ratio: 10.0,
            max_ratio_entry: None,
        };
        let config = InspectionConfig::default();
        assert!(assess_bomb(10, &metrics, &config).is_empty());
    }

    #[test]
    fn test_each_rule_fires() {
        let config = InspectionConfig::default();
        let flood = assess_bomb(4001, &CompressionMetrics::default(), &config);
        assert!(matches!(flood[0], BombIndicator::EntryFlood { .. }));

        let total = CompressionMetrics {
            total_compressed: 600_000_000,
            total_uncompressed: 2 * 1024 * 1024 * 1024,
            max_ratio: 4.0,
            max_ratio_entry: None,
        };
        assert!(matches!(
            assess_bomb(1, &total, &config)[0],
            BombIndicator::TotalSize { .. }
        ));

        let small = CompressionMetrics {
            total_compressed: 1_000_000,
            total_uncompressed: 300_000_000,
            max_ratio: 100.0,
            max_ratio_entry: None,
        };
        assert_eq!(
            assess_bomb(3, &small, &config),
            vec![BombIndicator::SmallArchiveExpansion {
                compressed: 1_000_000,
                uncompressed: 300_000_000,
            }]
        );
    }

    #[test]
    fn test_ratio_boundary_is_exclusive() {
        let metrics = CompressionMetrics {
            total_compressed: 10,
            total_uncompressed: 1_400,
            max_ratio: 140.0,
            max_ratio_entry: None,
        };
        let config = InspectionConfig::default();
        assert!(assess_bomb(1, &metrics, &config).is_empty());
    }
}
