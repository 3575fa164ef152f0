//! Pixel-domain tamper heuristics.
//!
//! Hotspots and clone matches rank images for human review. Neither is
//! proof of manipulation.

pub mod clone;
pub mod grid;
pub mod hotspot;

use serde::Serialize;
use tracing::debug;

use crate::TamperConfig;

pub use clone::BlockOrigin;
pub use clone::CloneMatch;
pub use grid::PixelGrid;
pub use hotspot::ForensicHotspot;

/// Upper bound of the combined tamper signal.
pub const MAX_TAMPER_SIGNAL: u32 = 100;

/// Result of tamper analysis on one pixel grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TamperReport {
    /// Grid width in pixels.
    pub width: u32,
    /// Grid height in pixels.
    pub height: u32,
    /// Anomalous-variance cells, strongest first.
    pub hotspots: Vec<ForensicHotspot>,
    /// Block edge used by clone detection.
    pub block_size: u32,
    /// Number of far-apart matching block pairs.
    pub clone_signal_count: usize,
    /// Reported clone pairs (possibly fewer than `clone_signal_count`).
    pub clones: Vec<CloneMatch>,
    /// Combined signal in `[0, 100]`.
    pub tamper_signal: u32,
}

/// Combines hotspot and clone counts: `clamp(4·hotspots + 6·clones, 0, 100)`.
///
/// # Examples
///
/// ```
/// use exhibit_core::tamper::tamper_signal;
///
/// assert_eq!(tamper_signal(0, 0), 0);
/// assert_eq!(tamper_signal(3, 2), 24);
/// assert_eq!(tamper_signal(18, 50), 100);
/// ```
#[must_use]
pub fn tamper_signal(hotspots: usize, clone_signals: usize) -> u32 {
    let raw = hotspots
        .saturating_mul(4)
        .saturating_add(clone_signals.saturating_mul(6));
    u32::try_from(raw).map_or(MAX_TAMPER_SIGNAL, |v| v.min(MAX_TAMPER_SIGNAL))
}

/// Runs hotspot and clone detection on `grid`.
#[must_use]
pub fn analyze_tamper(grid: &PixelGrid, config: &TamperConfig) -> TamperReport {
    let hotspots = hotspot::find_hotspots(grid, config);
    let clones = clone::find_clones(grid, config);
    let signal = tamper_signal(hotspots.len(), clones.signal_count);

    debug!(
        width = grid.width(),
        height = grid.height(),
        hotspots = hotspots.len(),
        clones = clones.signal_count,
        signal,
        "tamper analysis complete"
    );

    TamperReport {
        width: grid.width(),
        height: grid.height(),
        hotspots,
        block_size: clones.block_size,
        clone_signal_count: clones.signal_count,
        clones: clones.matches,
        tamper_signal: signal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_grid_is_clean() {
        let grid = PixelGrid::from_fn(120, 80, |_, _| [90, 90, 90, 255]);
        let report = analyze_tamper(&grid, &TamperConfig::default());
        assert!(report.hotspots.is_empty());
        assert_eq!(report.clone_signal_count, 0);
        assert_eq!(report.tamper_signal, 0);
        assert_eq!((report.width, report.height), (120, 80));
    }

    #[test]
    fn test_signal_saturates() {
        assert_eq!(tamper_signal(usize::MAX, usize::MAX), MAX_TAMPER_SIGNAL);
        assert_eq!(tamper_signal(25, 0), 100);
        assert_eq!(tamper_signal(0, 16), 96);
    }
}
