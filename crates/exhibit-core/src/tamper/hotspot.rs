//! Local-variance hotspot detection.
//!
//! The grid is split into uniform cells. Cells whose luma variance stands out
//! from the image-wide distribution are reported, strongest first.

use serde::Serialize;

use crate::TamperConfig;
use crate::tamper::PixelGrid;

/// Lower bound on hotspot confidence.
pub const MIN_CONFIDENCE: f64 = 0.08;
/// Upper bound on hotspot confidence.
pub const MAX_CONFIDENCE: f64 = 0.99;

/// A cell whose texture variance is anomalous.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForensicHotspot {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
    /// Luma variance of the cell.
    pub score: f64,
    /// Strength relative to the image, in `[0.08, 0.99]`.
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    variance: f64,
}

/// Finds high-variance cells, at most `config.max_hotspots` of them.
///
/// Ties keep row-major cell order. A uniform image has no hotspots.
#[must_use]
pub fn find_hotspots(grid: &PixelGrid, config: &TamperConfig) -> Vec<ForensicHotspot> {
    let cells = cell_variances(grid, config.grid_cells);
    if cells.len() < 2 {
        return Vec::new();
    }

    let count = cells.len() as f64;
    let mean = cells.iter().map(|c| c.variance).sum::<f64>() / count;
    let spread: f64 = cells.iter().map(|c| (c.variance - mean).powi(2)).sum();
    let stddev = (spread / count).sqrt();
    if stddev <= f64::EPSILON {
        return Vec::new();
    }

    let threshold = config.hotspot_sigma.mul_add(stddev, mean);
    let mut flagged = cells;
    flagged.retain(|c| c.variance > threshold);
    // Stable sort keeps row-major order among equal scores.
    flagged.sort_by(|a, b| b.variance.total_cmp(&a.variance));
    flagged.truncate(config.max_hotspots);

    flagged
        .into_iter()
        .map(|cell| {
            let z = (cell.variance - mean) / (3.0 * stddev);
            ForensicHotspot {
                x: cell.x,
                y: cell.y,
                w: cell.w,
                h: cell.h,
                score: cell.variance,
                confidence: z.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE),
            }
        })
        .collect()
}

/// Luma variance per cell, row-major, sampling every second pixel.
fn cell_variances(grid: &PixelGrid, grid_cells: u32) -> Vec<Cell> {
    let (width, height) = (grid.width(), grid.height());
    let cells_x = grid_cells.min(width);
    let cells_y = grid_cells.min(height);
    if cells_x == 0 || cells_y == 0 {
        return Vec::new();
    }

    let bound = |index: u32, cells: u32, extent: u32| {
        (u64::from(index) * u64::from(extent) / u64::from(cells)) as u32
    };

    let mut out = Vec::with_capacity((cells_x * cells_y) as usize);
    for cy in 0..cells_y {
        let (y0, y1) = (bound(cy, cells_y, height), bound(cy + 1, cells_y, height));
        for cx in 0..cells_x {
            let (x0, x1) = (bound(cx, cells_x, width), bound(cx + 1, cells_x, width));

            let (mut n, mut sum, mut sum_sq) = (0.0f64, 0.0f64, 0.0f64);
            for y in (y0..y1).step_by(2) {
                for x in (x0..x1).step_by(2) {
                    let luma = grid.luma(x, y);
                    n += 1.0;
                    sum += luma;
                    sum_sq = luma.mul_add(luma, sum_sq);
                }
            }
            let variance = if n > 0.0 {
                let mean = sum / n;
                (sum_sq / n - mean * mean).max(0.0)
            } else {
                0.0
            };
            out.push(Cell {
                x: x0,
                y: y0,
                w: x1 - x0,
                h: y1 - y0,
                variance,
            });
        }
    }
    out
}
