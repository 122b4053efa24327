//! DECIPHER's result type.

use serde::{Deserialize, Serialize};

use super::query::Confidence;
use super::transliteration::WordValidation;

/// How DECIPHER arrived at its Hebrew term(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DecipherMethod {
    Dictionary,
    Rules,
    MixedExtraction,
    Passthrough,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DecipherResult {
    pub success: bool,
    /// Single best phrase - the first element of `hebrew_terms`, kept for
    /// callers that only care about one topic.
    pub hebrew_term: String,
    /// One or more phrases; preserves multi-topic queries (e.g. comparisons).
    pub hebrew_terms: Vec<String>,
    pub confidence: Confidence,
    pub method: DecipherMethod,
    pub is_mixed_query: bool,
    pub is_pure_english: bool,
    pub original_query: String,
    pub extraction_confident: bool,
    pub needs_validation: bool,
    pub word_validations: Vec<WordValidation>,
    pub message: String,
}

impl DecipherResult {
    pub fn passthrough(original_query: &str) -> Self {
        Self {
            success: true,
            hebrew_term: String::new(),
            hebrew_terms: Vec::new(),
            confidence: Confidence::High,
            method: DecipherMethod::Passthrough,
            is_mixed_query: false,
            is_pure_english: true,
            original_query: original_query.to_string(),
            extraction_confident: true,
            needs_validation: false,
            word_validations: Vec::new(),
            message: "query is pure English; no transliteration needed".to_string(),
        }
    }

    pub fn failed(original_query: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            hebrew_term: String::new(),
            hebrew_terms: Vec::new(),
            confidence: Confidence::Low,
            method: DecipherMethod::Failed,
            is_mixed_query: false,
            is_pure_english: false,
            original_query: original_query.to_string(),
            extraction_confident: false,
            needs_validation: false,
            word_validations: Vec::new(),
            message: message.into(),
        }
    }
}
