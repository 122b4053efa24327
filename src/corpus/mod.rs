//! Corpus Client - a thin async client over the external Jewish-texts
//! corpus HTTP API (modeled on Sefaria's public search/texts/related/name
//! endpoints).

mod sefaria;
mod types;

pub use sefaria::SefariaCorpusClient;
pub use types::*;

use async_trait::async_trait;

use crate::utils::ApiResult;

#[async_trait]
pub trait CorpusClient: Send + Sync {
    async fn search(&self, hebrew_term: &str, size: usize) -> ApiResult<SearchResponse>;
    async fn get_text(&self, reference: &str) -> ApiResult<TextResponse>;
    async fn get_related(&self, reference: &str) -> ApiResult<RelatedResponse>;
    async fn name_lookup(&self, token: &str) -> ApiResult<Vec<NameDisambiguation>>;
}
