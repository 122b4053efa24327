//! Sugya Source-Finder library.
//!
//! This library contains the core modules for the three-stage retrieval
//! pipeline (DECIPHER -> UNDERSTAND -> SEARCH) described in the design
//! notes, plus the ambient stack (config, cache, corpus client, LLM
//! client) that backs it.

use std::sync::Arc;

pub mod authors;
pub mod cache;
pub mod clarification;
pub mod config;
pub mod corpus;
pub mod decipher;
pub mod dictionary;
pub mod handlers;
pub mod models;
pub mod search;
pub mod services;
pub mod transliteration;
pub mod understand;
pub mod utils;
pub mod validator;

pub use config::Config;
pub use services::llm::{LLMError, LLMService, LLMServiceImpl};

use cache::Cache;
use clarification::ClarificationStore;
use corpus::CorpusClient;
use dictionary::WordDictionary;
use validator::TermValidator;

/// Application shared state.
///
/// Design philosophy: Rust's type system is the DI container - every
/// collaborator the pipeline needs is an `Arc` here, cheap to clone into
/// each handler, with no service-locator indirection.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dictionary: Arc<WordDictionary>,
    pub validator: Arc<TermValidator>,
    pub corpus: Arc<dyn CorpusClient>,
    pub llm: Arc<dyn LLMService>,
    pub clarifications: Arc<ClarificationStore>,
    pub corpus_cache: Arc<dyn Cache<serde_json::Value>>,
    pub llm_cache: Arc<dyn Cache<serde_json::Value>>,
}
