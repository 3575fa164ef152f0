//! Shared result types used across the analysis modules.

pub mod finding;
pub mod severity;

pub use finding::Finding;
pub use finding::FindingCategory;
pub use severity::Severity;
