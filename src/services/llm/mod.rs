//! LLM Service Module
//!
//! Generic "call an LLM, cache the result, repair malformed JSON" capability
//! that both UNDERSTAND (strategy generation) and SEARCH (sugya validation)
//! build their scenario-specific requests on top of.

mod client;
mod models;
mod service;

pub use models::{LLMError, LLMScenario, TokenUsage};
pub use service::{LLMAnalysisRequestTrait, LLMAnalysisResponseTrait, LLMAnalysisResult, LLMService, LLMServiceImpl};

pub(crate) use client::LLMClient;
