//! ZIP structural inspection and store-only archive writing.

pub mod bomb;
pub mod entry;
pub mod format;
pub mod inspector;
pub mod signals;
pub mod trust;
pub mod writer;

// Re-export public types and functions
pub use bomb::BombIndicator;
pub use bomb::CompressionMetrics;
pub use entry::ArchiveScanResult;
pub use entry::ParseMode;
pub use entry::ZipEntry;
pub use inspector::has_zip_signature;
pub use inspector::inspect_archive;
pub use writer::ArchiveWriter;
pub use writer::write_store_zip;
