//! Score aggregation: authenticity score and risk tier.

pub mod authenticity;
pub mod risk;

pub use authenticity::AuthenticityBreakdown;
pub use authenticity::AuthenticityInputs;
pub use authenticity::AuthenticityScore;
pub use authenticity::score_authenticity;
pub use risk::ArchiveRisk;
pub use risk::RiskTier;
pub use risk::classify_risk;
pub use risk::composite_from_authenticity;
pub use risk::composite_from_trust;
