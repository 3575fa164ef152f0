//! Evidence export: report, chain of custody and the packaged bundle.

pub mod bundle;
pub mod custody;
pub mod report;

pub use bundle::Artifact;
pub use bundle::EvidenceBundle;
pub use custody::CustodyEvent;
pub use custody::CustodyLog;
pub use report::ForensicReport;
