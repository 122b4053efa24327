//! SEARCH phase B's LLM request/response shapes - "are these the right
//! sugyot?" (§4.9 phase B).

use serde::{Deserialize, Serialize};

use crate::services::llm::{LLMAnalysisRequestTrait, LLMAnalysisResponseTrait, LLMScenario};

#[derive(Debug, Clone, Serialize)]
pub struct SugyaValidationRequest {
    pub query: String,
    pub hebrew_terms: Vec<String>,
    pub strategy_reasoning: String,
    pub candidate_refs: Vec<String>,
}

impl LLMAnalysisRequestTrait for SugyaValidationRequest {
    fn scenario(&self) -> LLMScenario {
        LLMScenario::SearchValidation
    }

    fn system_prompt(&self) -> String {
        crate::understand::prompts::validation_system_prompt()
    }

    fn cache_key(&self) -> String {
        let mut refs = self.candidate_refs.clone();
        refs.sort();
        format!("validation:{}:{}", refs.join("|"), self.context_hash())
    }

    fn query_hash(&self) -> String {
        crate::utils::fingerprint(&self.query)
    }

    fn context_hash(&self) -> String {
        crate::utils::fingerprint(&self.candidate_refs.join("|"))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SugyaValidationResponse {
    #[serde(default)]
    pub validated_refs: Vec<String>,
    #[serde(default)]
    pub rejected_refs: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl LLMAnalysisResponseTrait for SugyaValidationResponse {
    fn summary(&self) -> &str {
        &self.notes
    }

    fn confidence(&self) -> Option<f64> {
        None
    }

    /// An all-empty response is the orchestration's signal to skip LLM
    /// validation entirely and trust phase A's located refs as-is - there
    /// is no safe way to invent a replacement list without the LLM.
    fn fallback() -> Option<Self> {
        Some(Self {
            validated_refs: Vec::new(),
            rejected_refs: Vec::new(),
            notes: "LLM validation unavailable; located refs used unvalidated".to_string(),
        })
    }
}
