//! Analysis configuration.
//!
//! The engine keeps no global settings: every entry point takes one of these
//! values explicitly.

use serde::Serialize;

/// Thresholds for the archive inspector's bomb heuristics.
///
/// # Examples
///
/// ```
/// use exhibit_core::InspectionConfig;
///
/// let config = InspectionConfig {
///     max_compression_ratio: 80.0,
///     ..Default::default()
/// };
/// assert_eq!(config.max_entry_count, 4000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectionConfig {
    /// Entry count above which the archive is treated as a possible bomb.
    pub max_entry_count: usize,

    /// Total declared uncompressed size above which the archive is a possible
    /// bomb.
    pub max_total_uncompressed: u64,

    /// Single-entry ratio (uncompressed / compressed) above which the archive
    /// is a possible bomb.
    pub max_compression_ratio: f64,

    /// Compressed total below which `small_archive_uncompressed` applies.
    pub small_archive_compressed: u64,

    /// Uncompressed total that is suspicious for a small archive.
    pub small_archive_uncompressed: u64,
}

impl Default for InspectionConfig {
    /// Default values:
    /// - `max_entry_count`: 4000
    /// - `max_total_uncompressed`: 1 GiB
    /// - `max_compression_ratio`: 140.0
    /// - `small_archive_compressed`: 2 MB
    /// - `small_archive_uncompressed`: 250 MB
    fn default() -> Self {
        Self {
            max_entry_count: 4000,
            max_total_uncompressed: 1024 * 1024 * 1024,
            max_compression_ratio: 140.0,
            small_archive_compressed: 2_000_000,
            small_archive_uncompressed: 250_000_000,
        }
    }
}

/// Parameters for pixel-domain tamper heuristics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TamperConfig {
    /// Cells per axis for hotspot partitioning.
    pub grid_cells: u32,

    /// Standard deviations above the mean cell variance a cell must exceed.
    pub hotspot_sigma: f64,

    /// Maximum number of hotspots reported.
    pub max_hotspots: usize,

    /// Smallest clone-detection block edge in pixels.
    pub min_block_size: u32,

    /// Image edge divisor used to scale the block edge.
    pub block_divisor: u32,

    /// Blocks closer than this (Manhattan, in block widths) are ignored.
    pub min_clone_distance_blocks: u32,

    /// Largest signature bucket still considered a clone candidate.
    pub max_bucket_size: usize,
}

impl Default for TamperConfig {
    fn default() -> Self {
        Self {
            grid_cells: 18,
            hotspot_sigma: 1.2,
            max_hotspots: 18,
            min_block_size: 10,
            block_divisor: 32,
            min_clone_distance_blocks: 3,
            max_bucket_size: 8,
        }
    }
}

/// Top-level configuration for [`crate::analyze_bytes`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    /// Largest input accepted, in bytes.
    pub max_input_bytes: u64,

    /// Archive inspection thresholds.
    pub inspection: InspectionConfig,

    /// Tamper heuristics parameters.
    pub tamper: TamperConfig,
}

impl Default for AnalysisConfig {
    /// Defaults to a 512 MiB input cap with default sub-configurations.
    fn default() -> Self {
        Self {
            max_input_bytes: 512 * 1024 * 1024,
            inspection: InspectionConfig::default(),
            tamper: TamperConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Creates a stricter configuration for high-suspicion intake queues.
    ///
    /// Cuts the entry limit to a quarter (1000). Halves the uncompressed
    /// total (512 MiB) and the ratio threshold (70). Caps input at 64 MiB,
    /// an eighth of the default.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_input_bytes: 64 * 1024 * 1024,
            inspection: InspectionConfig {
                max_entry_count: 1000,
                max_total_uncompressed: 512 * 1024 * 1024,
                max_compression_ratio: 70.0,
                ..Default::default()
            },
            tamper: TamperConfig::default(),
        }
    }
}
