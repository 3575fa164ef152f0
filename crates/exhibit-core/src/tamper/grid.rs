//! Validated RGBA pixel buffer.

use crate::ForensicError;
use crate::Result;

/// An RGBA image, 4 bytes per pixel, row-major.
///
/// # Examples
///
/// ```
/// use exhibit_core::tamper::PixelGrid;
///
/// let grid = PixelGrid::new(2, 1, vec![255, 255, 255, 255, 0, 0, 0, 255]).unwrap();
/// assert!((grid.luma(0, 0) - 255.0).abs() < 1e-9);
/// assert!(grid.luma(1, 0).abs() < 1e-9);
///
/// assert!(PixelGrid::new(2, 2, vec![0; 4]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl PixelGrid {
    /// Wraps `rgba`, checking its length against the dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ForensicError::InvalidPixelGrid`] if `rgba.len()` is not
    /// `width * height * 4`.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4));
        if expected != Some(rgba.len()) {
            return Err(ForensicError::InvalidPixelGrid {
                width,
                height,
                expected: expected.unwrap_or(usize::MAX),
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Builds a grid by evaluating `pixel(x, y)` for every position.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut pixel: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&pixel(x, y));
            }
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.rgba
    }

    /// Luma (`0.299R + 0.587G + 0.114B`) at `(x, y)`; `0.0` outside the grid.
    #[must_use]
    pub fn luma(&self, x: u32, y: u32) -> f64 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        let index = (y as usize * self.width as usize + x as usize) * 4;
        match self.rgba.get(index..index + 3) {
            Some(&[r, g, b]) => {
                let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
                0.299f64.mul_add(r, 0.587f64.mul_add(g, 0.114 * b))
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_length_validated() {
        let err = PixelGrid::new(3, 3, vec![0; 35]).unwrap_err();
        assert!(matches!(
            err,
            ForensicError::InvalidPixelGrid {
                expected: 36,
                actual: 35,
                ..
            }
        ));
        assert!(PixelGrid::new(0, 0, Vec::new()).is_ok());
    }

    #[test]
    fn test_luma_weights() {
        let rgba = vec![255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255];
        let grid = PixelGrid::new(3, 1, rgba).unwrap();
        assert!((grid.luma(0, 0) - 76.245).abs() < 1e-9);
        assert!((grid.luma(1, 0) - 149.685).abs() < 1e-9);
        assert!((grid.luma(2, 0) - 29.07).abs() < 1e-9);
        assert!(grid.luma(5, 5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_fn_layout() {
        let grid = PixelGrid::from_fn(2, 2, |x, y| [(x * 10) as u8, (y * 10) as u8, 0, 255]);
        assert_eq!(grid.as_bytes().len(), 16);
        assert_eq!(&grid.as_bytes()[12..16], &[10, 10, 0, 255]);
    }
}
