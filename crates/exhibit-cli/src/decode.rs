//! Pixel decoding for tamper analysis.

use crate::error::add_source_context;
use anyhow::Result;
use anyhow::anyhow;
use exhibit_core::PixelGrid;
use std::path::Path;

/// Decodes PNG, JPEG or WebP bytes into an RGBA grid.
pub fn decode_pixels(bytes: &[u8], source: &Path) -> Result<PixelGrid> {
    let image = image::load_from_memory(bytes).map_err(|err| {
        anyhow!(
            "Cannot decode '{}' for pixel analysis: {}\n\
             HINT: Pixel analysis supports PNG, JPEG and WebP images.",
            source.display(),
            err
        )
    })?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    add_source_context(PixelGrid::new(width, height, rgba.into_raw()), source)
}
