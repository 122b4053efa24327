//! UNDERSTAND's output: the search strategy handed to SEARCH.

use serde::{Deserialize, Serialize};

use super::query::Confidence;
use crate::services::llm::{LLMAnalysisResponseTrait, LLMScenario};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum QueryType {
    Concept,
    SugyaReference,
    AuthorCitation,
    Comparison,
    HalachicPractice,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FetchStrategy {
    TrickleUp,
    TrickleDown,
    DirectRef,
    BroadScan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Basic,
    Standard,
    Deep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Critical,
    Important,
    Related,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RelatedSugya {
    #[serde(rename = "ref")]
    pub reference: String,
    pub importance: Importance,
    pub connection_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Strategy {
    pub query_type: QueryType,
    pub primary_sources: Vec<String>,
    pub target_authors: Vec<String>,
    pub related_sugyos: Vec<RelatedSugya>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comparison_terms: Vec<String>,
    pub fetch_strategy: FetchStrategy,
    pub depth: Depth,
    pub confidence: Confidence,
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clarification_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clarification_options: Vec<String>,
}

impl Strategy {
    /// Invariant: `query_type=comparison` implies `|comparison_terms| >= 2`.
    /// Invariant: `fetch_strategy=direct-ref` implies `primary_sources` non-empty.
    /// Invariant: `confidence=low` implies `clarification_prompt` is set.
    pub fn check_invariants(&self) -> Result<(), String> {
        if matches!(self.query_type, QueryType::Comparison) && self.comparison_terms.len() < 2 {
            return Err("comparison query_type requires >=2 comparison_terms".to_string());
        }
        if matches!(self.fetch_strategy, FetchStrategy::DirectRef) && self.primary_sources.is_empty()
        {
            return Err("direct-ref fetch_strategy requires non-empty primary_sources".to_string());
        }
        if matches!(self.confidence, Confidence::Low) && self.clarification_prompt.is_none() {
            return Err("low confidence requires a clarification_prompt".to_string());
        }
        Ok(())
    }

    /// The original source additionally emitted a singular `primary_source`
    /// field for backwards compatibility; we only emit the list and derive
    /// the singular here for callers that still want it.
    pub fn primary_source(&self) -> Option<&str> {
        self.primary_sources.first().map(String::as_str)
    }

    pub fn needs_clarification(&self) -> bool {
        self.clarification_prompt.is_some()
    }
}

impl LLMAnalysisResponseTrait for Strategy {
    fn summary(&self) -> &str {
        &self.reasoning
    }

    fn confidence(&self) -> Option<f64> {
        Some(match self.confidence {
            Confidence::Low => 0.3,
            Confidence::Medium => 0.6,
            Confidence::High => 0.9,
        })
    }
}

/// Request payload sent to the LLM for the UNDERSTAND stage.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct StrategyRequest {
    pub query: String,
    pub hebrew_terms: Vec<String>,
    pub corpus_profile: serde_json::Value,
}

impl crate::services::llm::LLMAnalysisRequestTrait for StrategyRequest {
    fn scenario(&self) -> LLMScenario {
        LLMScenario::QueryStrategy
    }

    fn system_prompt(&self) -> String {
        crate::understand::prompts::strategy_system_prompt()
    }

    fn cache_key(&self) -> String {
        let mut terms = self.hebrew_terms.clone();
        terms.sort();
        format!("strategy:{}:{}", terms.join("|"), self.context_hash())
    }

    fn query_hash(&self) -> String {
        crate::utils::fingerprint(&self.query)
    }

    fn context_hash(&self) -> String {
        crate::utils::fingerprint(&self.corpus_profile.to_string())
    }
}
