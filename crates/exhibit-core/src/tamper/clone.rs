//! Duplicate-block (copy-move) detection.
//!
//! Each block gets a weak signature from six diagonal luma samples. Blocks
//! sharing a signature and lying far apart are reported as clone candidates.
//! Signatures collide on natural texture, so matches carry a deliberately low
//! confidence and only rank images for review.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::TamperConfig;
use crate::tamper::PixelGrid;

/// Luma levels per quantisation step.
const QUANT_STEP: f64 = 16.0;
/// Modulus of the primary signature hash.
const HASH_MOD_A: u64 = 1_000_003;
/// Modulus of the secondary signature hash.
const HASH_MOD_B: u64 = 65_521;
/// Matches kept in a report; further pairs are only counted.
pub const MAX_REPORTED_MATCHES: usize = 256;

/// Top-left corner of a block, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct BlockOrigin {
    /// Column in pixels.
    pub x: u32,
    /// Row in pixels.
    pub y: u32,
}

impl BlockOrigin {
    const fn of_block(column: u32, row: u32, size: u32) -> Self {
        Self {
            x: column * size,
            y: row * size,
        }
    }
}

/// Two blocks with matching signatures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloneMatch {
    /// Earlier block in row-major order.
    pub source: BlockOrigin,
    /// Later block in row-major order.
    pub target: BlockOrigin,
    /// Block edge in pixels.
    pub block_size: u32,
    /// Low-precision match confidence.
    pub confidence: f64,
}

/// Clone candidates found in a grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CloneScan {
    /// Block edge used for the scan.
    pub block_size: u32,
    /// Total qualifying pairs.
    pub signal_count: usize,
    /// The first pairs, at most [`MAX_REPORTED_MATCHES`].
    pub matches: Vec<CloneMatch>,
}

/// Block edge for an image: `max(min_block_size, min(w, h) / block_divisor)`.
#[must_use]
pub fn block_size(grid: &PixelGrid, config: &TamperConfig) -> u32 {
    let short_side = grid.width().min(grid.height());
    config
        .min_block_size
        .max(short_side / config.block_divisor.max(1))
        .max(1)
}

/// Scans the grid for repeated blocks.
#[must_use]
pub fn find_clones(grid: &PixelGrid, config: &TamperConfig) -> CloneScan {
    let size = block_size(grid, config);
    let blocks_x = grid.width() / size;
    let blocks_y = grid.height() / size;

    let mut buckets: BTreeMap<u64, Vec<(u32, u32)>> = BTreeMap::new();
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            if let Some(signature) = block_signature(grid, bx * size, by * size, size) {
                buckets.entry(signature).or_default().push((bx, by));
            }
        }
    }

    let mut scan = CloneScan {
        block_size: size,
        ..CloneScan::default()
    };
    for members in buckets.values() {
        if members.len() < 2 || members.len() > config.max_bucket_size {
            continue;
        }
        let confidence = match_confidence(members.len());
        for (i, &(ax, ay)) in members.iter().enumerate() {
            for &(bx, by) in &members[i + 1..] {
                if ax.abs_diff(bx) + ay.abs_diff(by) <= config.min_clone_distance_blocks {
                    continue;
                }
                scan.signal_count += 1;
                if scan.matches.len() < MAX_REPORTED_MATCHES {
                    scan.matches.push(CloneMatch {
                        source: BlockOrigin::of_block(ax, ay, size),
                        target: BlockOrigin::of_block(bx, by, size),
                        block_size: size,
                        confidence,
                    });
                }
            }
        }
    }
    scan
}

/// Confidence falls as more blocks share a signature.
fn match_confidence(bucket_len: usize) -> f64 {
    (0.4 / (bucket_len.saturating_sub(1).max(1)) as f64).max(0.1)
}

/// Signature of one block, or `None` for a flat block.
fn block_signature(grid: &PixelGrid, x0: u32, y0: u32, size: u32) -> Option<u64> {
    let mut samples = [0u64; 6];
    for k in 1..=3u32 {
        let offset = size * k / 4;
        let main = grid.luma(x0 + offset, y0 + offset);
        let anti = grid.luma(x0 + size - 1 - offset, y0 + offset);
        samples[(k - 1) as usize] = quantize(main);
        samples[(k + 2) as usize] = quantize(anti);
    }
    if samples.iter().all(|&s| s == samples[0]) {
        return None;
    }

    let (mut a, mut b) = (0u64, 0u64);
    for &sample in &samples {
        a = (a * 31 + sample + 1) % HASH_MOD_A;
        b = (b * 131 + sample + 7) % HASH_MOD_B;
    }
    Some((a << 17) | b)
}

fn quantize(luma: f64) -> u64 {
    (luma / QUANT_STEP).floor().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(v: u8) -> [u8; 4] {
        [v, v, v, 255]
    }

    fn patch(lx: u32, ly: u32) -> [u8; 4] {
        gray(((lx * 37 + ly * 91) % 256) as u8)
    }

    #[test]
    fn test_block_size_scales() {
        let config = TamperConfig::default();
        let small = PixelGrid::from_fn(64, 64, |_, _| gray(0));
        let large = PixelGrid::from_fn(640, 480, |_, _| gray(0));
        assert_eq!(block_size(&small, &config), 10);
        assert_eq!(block_size(&large, &config), 15);
    }

    #[test]
    fn test_flat_image_has_no_clones() {
        let grid = PixelGrid::from_fn(128, 128, |_, _| gray(200));
        let scan = find_clones(&grid, &TamperConfig::default());
        assert_eq!(scan.signal_count, 0);
        assert!(scan.matches.is_empty());
    }

    #[test]
    fn test_copied_block_far_away() {
        // Block size is 10; copy block (0, 0) to block (8, 8).
        let grid = PixelGrid::from_fn(128, 128, |x, y| {
            if x < 10 && y < 10 {
                patch(x, y)
            } else if (80..90).contains(&x) && (80..90).contains(&y) {
                patch(x - 80, y - 80)
            } else {
                gray(60)
            }
        });
        let scan = find_clones(&grid, &TamperConfig::default());
        assert_eq!(scan.signal_count, 1);
        let found = &scan.matches[0];
        assert_eq!(found.source, BlockOrigin { x: 0, y: 0 });
        assert_eq!(found.target, BlockOrigin { x: 80, y: 80 });
        assert_eq!(found.block_size, 10);
        assert!(found.confidence < 0.5);
    }

    #[test]
    fn test_adjacent_copy_ignored() {
        // Copy block (0, 0) to block (1, 0): distance 1, natural repetition.
        let grid = PixelGrid::from_fn(64, 64, |x, y| {
            if x < 20 && y < 10 {
                patch(x % 10, y)
            } else {
                gray(60)
            }
        });
        let scan = find_clones(&grid, &TamperConfig::default());
        assert_eq!(scan.signal_count, 0);
    }

    #[test]
    fn test_oversized_bucket_ignored() {
        // Nine identical blocks in a row exceed the bucket bound of eight.
        let grid = PixelGrid::from_fn(100, 100, |x, y| {
            if x < 90 && y < 10 {
                patch(x % 10, y)
            } else {
                gray(60)
            }
        });
        let scan = find_clones(&grid, &TamperConfig::default());
        assert_eq!(scan.signal_count, 0);
    }
}
