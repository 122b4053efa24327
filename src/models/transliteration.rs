//! Transliteration candidates and per-word validation records.

use serde::{Deserialize, Serialize};

use super::query::Confidence;

/// A single fired detector pattern within one input word.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Pattern {
    #[schema(value_type = String)]
    pub detector: &'static str,
    pub position: usize,
    pub length: usize,
    #[schema(value_type = String)]
    pub hebrew_letter: char,
    pub confidence: f64,
}

/// A candidate Hebrew rendering of one input word, produced either by the
/// rule engine (combining fired patterns) or by the hand-curated exception
/// map for ambiguous short tokens.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Variant {
    pub hebrew: String,
    /// Names of the detectors that contributed to this variant, in firing order.
    #[schema(value_type = Vec<String>)]
    pub rules_fired: Vec<&'static str>,
    /// Product of the contributing patterns' confidences, in [0, 1].
    pub confidence: f64,
    /// Set when this variant came from the hand-curated exception map rather
    /// than detector combination.
    pub from_exception: bool,
}

/// The kind of follow-up the caller needs to resolve, mirrored from the
/// original validation workflow's closed set of outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValidationType {
    /// No ambiguity; nothing to confirm.
    None,
    /// A single low-confidence word; offer alternatives.
    Clarify,
    /// Several plausible phrase segmentations; let the caller choose one.
    Choose,
    /// Could not produce any validated variant.
    Unknown,
}

/// Validation outcome for one input token (or token span).
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WordValidation {
    pub original: String,
    pub best_match: Option<String>,
    pub alternatives: Vec<String>,
    pub confidence: Confidence,
    pub needs_validation: bool,
    #[schema(value_type = Vec<String>)]
    pub rules_fired: Vec<&'static str>,
    pub validation_type: ValidationType,
}
