//! Authenticity score aggregation.

use serde::Serialize;

use crate::Severity;
use crate::metadata::MetadataReport;
use crate::tamper::TamperReport;

/// Lowest reported score.
pub const MIN_SCORE: u8 = 1;
/// Highest reported score.
pub const MAX_SCORE: u8 = 99;

const TAMPER_WEIGHT: f64 = 0.42;
const CLONE_PENALTY: u32 = 7;
const CLONE_CAP: u32 = 28;
const EDIT_PENALTY: u32 = 2;
const EDIT_CAP: u32 = 16;

/// Signals feeding the authenticity score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthenticityInputs {
    /// Combined tamper signal, `0..=100`.
    pub tamper_signal: u32,
    /// Far-apart duplicate block pairs.
    pub clone_signals: usize,
    /// Severity of each metadata flag.
    pub flag_severities: Vec<Severity>,
    /// Edit-related metadata flags.
    pub edit_count: usize,
}

impl AuthenticityInputs {
    /// Collects inputs from whichever analyses ran.
    #[must_use]
    pub fn from_reports(metadata: Option<&MetadataReport>, tamper: Option<&TamperReport>) -> Self {
        Self {
            tamper_signal: tamper.map_or(0, |t| t.tamper_signal),
            clone_signals: tamper.map_or(0, |t| t.clone_signal_count),
            flag_severities: metadata.map(MetadataReport::severities).unwrap_or_default(),
            edit_count: metadata.map_or(0, MetadataReport::edit_count),
        }
    }
}

/// One deduction in the score, kept for auditability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticityBreakdown {
    /// Component name.
    pub label: String,
    /// Points deducted.
    pub weight: u32,
    /// How the deduction was computed.
    pub detail: String,
}

/// Score in `[1, 99]` with its four-row breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticityScore {
    /// Higher means more likely authentic.
    pub score: u8,
    /// Tamper, clone, metadata and edit deductions, in that order.
    pub breakdown: Vec<AuthenticityBreakdown>,
}

/// Scores authenticity.
///
/// `clamp(100 − round(0.42·tamper) − min(28, 7·clones) − Σ penalties −
/// min(16, 2·edits), 1, 99)` where flag penalties are 12 for critical, 6 for
/// warning and 1 for info.
///
/// # Examples
///
/// ```
/// use exhibit_core::Severity;
/// use exhibit_core::scoring::AuthenticityInputs;
/// use exhibit_core::scoring::score_authenticity;
///
/// let clean = score_authenticity(&AuthenticityInputs::default());
/// assert_eq!(clean.score, 99);
///
/// let edited = score_authenticity(&AuthenticityInputs {
///     tamper_signal: 20,
///     clone_signals: 1,
///     flag_severities: vec![Severity::Warning],
///     edit_count: 1,
/// });
/// assert_eq!(edited.score, 100 - 8 - 7 - 6 - 2);
/// ```
#[must_use]
pub fn score_authenticity(inputs: &AuthenticityInputs) -> AuthenticityScore {
    let tamper = (TAMPER_WEIGHT * f64::from(inputs.tamper_signal)).round() as u32;
    let clones = saturating_u32(inputs.clone_signals)
        .saturating_mul(CLONE_PENALTY)
        .min(CLONE_CAP);
    let metadata = inputs
        .flag_severities
        .iter()
        .map(|s| s.metadata_penalty())
        .fold(0u32, u32::saturating_add);
    let edits = saturating_u32(inputs.edit_count)
        .saturating_mul(EDIT_PENALTY)
        .min(EDIT_CAP);

    let total = tamper
        .saturating_add(clones)
        .saturating_add(metadata)
        .saturating_add(edits);
    let score = 100u32
        .saturating_sub(total)
        .clamp(u32::from(MIN_SCORE), u32::from(MAX_SCORE)) as u8;

    let row = |label: &str, weight: u32, detail: String| AuthenticityBreakdown {
        label: label.to_string(),
        weight,
        detail,
    };
    let (signal, pairs) = (inputs.tamper_signal, inputs.clone_signals);
    let (flags, edit_count) = (inputs.flag_severities.len(), inputs.edit_count);
    let tamper_detail = format!("signal {signal} x {TAMPER_WEIGHT}");
    let clone_detail = format!("{pairs} pairs x {CLONE_PENALTY}, cap {CLONE_CAP}");
    let edit_detail = format!("{edit_count} edits x {EDIT_PENALTY}, cap {EDIT_CAP}");
    AuthenticityScore {
        score,
        breakdown: vec![
            row("tamper", tamper, tamper_detail),
            row("clone", clones, clone_detail),
            row("metadata", metadata, format!("{flags} flags")),
            row("edits", edits, edit_detail),
        ],
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(
        tamper: u32,
        clones: usize,
        severities: &[Severity],
        edits: usize,
    ) -> AuthenticityInputs {
        AuthenticityInputs {
            tamper_signal: tamper,
            clone_signals: clones,
            flag_severities: severities.to_vec(),
            edit_count: edits,
        }
    }

    #[test]
    fn test_clean_input_scores_99() {
        let result = score_authenticity(&AuthenticityInputs::default());
        assert_eq!(result.score, MAX_SCORE);
        assert_eq!(result.breakdown.len(), 4);
        assert!(result.breakdown.iter().all(|row| row.weight == 0));
    }

    #[test]
    fn test_floor_at_one() {
        let result = score_authenticity(&inputs(100, 100, &[Severity::Critical; 10], 100));
        assert_eq!(result.score, MIN_SCORE);
    }

    #[test]
    fn test_caps_apply() {
        let result = score_authenticity(&inputs(0, 10, &[], 20));
        assert_eq!(result.breakdown[1].weight, 28);
        assert_eq!(result.breakdown[3].weight, 16);
        assert_eq!(result.score, 100 - 28 - 16);
    }

    #[test]
    fn test_metadata_penalties() {
        let flags = [Severity::Critical, Severity::Warning, Severity::Info];
        let result = score_authenticity(&inputs(0, 0, &flags, 0));
        assert_eq!(result.breakdown[2].weight, 19);
        assert_eq!(result.score, 81);
    }

    #[test]
    fn test_tamper_rounding() {
        for (signal, weight) in [(5, 2), (9, 4), (100, 42)] {
            let result = score_authenticity(&inputs(signal, 0, &[], 0));
            assert_eq!(result.breakdown[0].weight, weight);
        }
    }

    #[test]
    fn test_breakdown_labels_in_order() {
        let labels: Vec<_> = score_authenticity(&AuthenticityInputs::default())
            .breakdown
            .into_iter()
            .map(|row| row.label)
            .collect();
        assert_eq!(labels, ["tamper", "clone", "metadata", "edits"]);
    }
}
