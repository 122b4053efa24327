//! LLM data model: the scenarios UNDERSTAND/SEARCH issue, per-call token
//! bookkeeping, and the error taxonomy LLM calls can raise.

use serde::{Deserialize, Serialize};

/// Which pipeline stage issued an LLM call - used as part of the cache key
/// namespace and for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LLMScenario {
    /// UNDERSTAND's strategy-emitting analysis call.
    QueryStrategy,
    /// SEARCH phase B's "are these the right sugyot?" validation call.
    SearchValidation,
}

impl LLMScenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryStrategy => "query_strategy",
            Self::SearchValidation => "search_validation",
        }
    }
}

/// Token accounting attached to every LLM call result. Logging these is
/// ambient observability, not account/billing management, so it is carried
/// even though the Non-goals exclude user-account features.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub estimated_cost_usd: f64,
}

impl TokenUsage {
    /// Rough per-1K-token pricing; good enough for logs, not for billing.
    pub fn estimate(input_tokens: u32, output_tokens: u32) -> Self {
        let cost = (input_tokens as f64 / 1000.0) * 0.003 + (output_tokens as f64 / 1000.0) * 0.015;
        Self { input_tokens, output_tokens, estimated_cost_usd: cost }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("LLM service disabled (no API key configured)")]
    Disabled,

    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("LLM response could not be parsed even after repair: {0}")]
    ParseError(String),

    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl LLMError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::ApiError(_))
    }
}
