//! UNDERSTAND - turns deciphered Hebrew terms into a `Strategy` SEARCH can
//! execute (§4.8): a deterministic known-sugya shortcut first, then a
//! corpus-profile-grounded LLM call, with a context-aware deterministic
//! fallback when the LLM is unavailable or its output cannot be repaired.

pub mod known_sugyos;
pub mod prompts;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use crate::corpus::CorpusClient;
use crate::models::{
    Confidence, Depth, FetchStrategy, Importance, QueryType, RelatedSugya, Strategy,
};
use crate::services::llm::{LLMAnalysisResult, LLMService};
use crate::models::strategy::StrategyRequest;
use crate::utils::ApiResult;

/// Number of corpus hits sampled per Hebrew term when building the profile
/// handed to the LLM (and used for the deterministic fallback).
const PROFILE_SAMPLE_SIZE: usize = 10;

/// Builds the search strategy for a deciphered query.
pub async fn build_strategy(
    llm: &dyn LLMService,
    corpus: &dyn CorpusClient,
    query: &str,
    hebrew_terms: &[String],
) -> ApiResult<Strategy> {
    if let Some(known) = known_sugyos::find_match(query, hebrew_terms) {
        tracing::debug!(topic = known.topic_key, "known-sugya shortcut matched, skipping LLM");
        return Ok(strategy_from_known_sugya(known));
    }

    let profile = gather_corpus_profile(corpus, hebrew_terms).await;

    let request = StrategyRequest {
        query: query.to_string(),
        hebrew_terms: hebrew_terms.to_vec(),
        corpus_profile: profile.clone(),
    };

    match llm.analyze::<StrategyRequest, Strategy>(&request).await {
        Ok(LLMAnalysisResult { response, from_cache, was_repaired, .. }) => {
            tracing::debug!(from_cache, was_repaired, "UNDERSTAND strategy produced");
            match response.check_invariants() {
                Ok(()) => Ok(response),
                Err(reason) => {
                    tracing::warn!("LLM strategy violated invariants ({reason}); using deterministic fallback");
                    Ok(fallback_strategy(query, hebrew_terms, &profile))
                },
            }
        },
        Err(e) => {
            tracing::warn!("UNDERSTAND LLM call failed ({e}); using deterministic fallback");
            Ok(fallback_strategy(query, hebrew_terms, &profile))
        },
    }
}

/// Calls `corpus.search` for each Hebrew term and assembles the corpus
/// profile handed to the LLM prompt and the deterministic fallback: total
/// hits, top refs, category breakdown, the top-3 tractate breakdown, and a
/// few sample snippets (§4.8 step 2). Best effort - a term whose search
/// fails just contributes an empty entry.
async fn gather_corpus_profile(corpus: &dyn CorpusClient, hebrew_terms: &[String]) -> serde_json::Value {
    let mut per_term = serde_json::Map::new();
    for term in hebrew_terms {
        let entry = match corpus.search(term, PROFILE_SAMPLE_SIZE).await {
            Ok(response) => json!({
                "total_hits": response.total_hits,
                "top_refs": response.top_refs,
                "by_category": response.by_category,
                "by_tractate": response.by_tractate,
                "sample_hits": response.sample_hits.iter().map(|s| json!({
                    "ref": s.reference,
                    "hebrew_snippet": s.hebrew_snippet,
                    "english_snippet": s.english_snippet,
                })).collect::<Vec<_>>(),
            }),
            Err(e) => {
                tracing::debug!("corpus profile lookup failed for {term:?}: {e}");
                json!({ "total_hits": 0, "top_refs": [], "by_category": {}, "by_tractate": {}, "sample_hits": [] })
            },
        };
        per_term.insert(term.clone(), entry);
    }
    serde_json::Value::Object(per_term)
}

fn strategy_from_known_sugya(known: &known_sugyos::KnownSugya) -> Strategy {
    let related_sugyos = known
        .primary_refs
        .iter()
        .skip(1)
        .map(|r| RelatedSugya {
            reference: r.to_string(),
            importance: known.importance,
            connection_text: "co-located in the known-topics catalog".to_string(),
        })
        .collect();

    Strategy {
        query_type: QueryType::Concept,
        primary_sources: known.primary_refs.iter().map(|s| s.to_string()).collect(),
        target_authors: known.target_authors.iter().map(|s| s.to_string()).collect(),
        related_sugyos,
        comparison_terms: Vec::new(),
        fetch_strategy: FetchStrategy::DirectRef,
        depth: Depth::Standard,
        confidence: known.confidence,
        reasoning: format!("matched known topic '{}' via deterministic catalog lookup", known.topic_key),
        clarification_prompt: None,
        clarification_options: Vec::new(),
    }
}

/// Builds a safe, always-valid strategy out of whatever the corpus profile
/// already contains, for use when the LLM is disabled or its response
/// could not be repaired into a valid `Strategy`. Per-term top refs (in
/// the order `hebrew_terms` were given) seed `primary_sources`; the best
/// single ref is the first entry of the first non-empty term's top_refs.
fn fallback_strategy(query: &str, hebrew_terms: &[String], profile: &serde_json::Value) -> Strategy {
    let top_refs_by_term: HashMap<&str, Vec<String>> = hebrew_terms
        .iter()
        .map(|term| {
            let refs = profile
                .get(term)
                .and_then(|v| v.get("top_refs"))
                .and_then(|v| v.as_array())
                .map(|arr| arr.iter().filter_map(|r| r.as_str().map(str::to_string)).collect())
                .unwrap_or_default();
            (term.as_str(), refs)
        })
        .collect();

    let primary_sources: Vec<String> = hebrew_terms
        .iter()
        .filter_map(|t| top_refs_by_term.get(t.as_str()).and_then(|r| r.first()).cloned())
        .collect();

    let query_type = if hebrew_terms.len() >= 2 { QueryType::Comparison } else { QueryType::Unknown };
    let comparison_terms = if matches!(query_type, QueryType::Comparison) { hebrew_terms.to_vec() } else { Vec::new() };

    let clarification_options: Vec<String> = hebrew_terms
        .iter()
        .flat_map(|t| top_refs_by_term.get(t.as_str()).cloned().unwrap_or_default())
        .take(4)
        .collect();

    let (fetch_strategy, clarification_prompt, clarification_options) = if primary_sources.is_empty() {
        (
            FetchStrategy::BroadScan,
            Some(format!(
                "I couldn't confidently place \"{query}\" in the corpus. Could you narrow it down, \
                 e.g. name a tractate or page?"
            )),
            if clarification_options.is_empty() {
                vec!["Try a more specific tractate/daf".to_string(), "Rephrase with an author name".to_string()]
            } else {
                clarification_options
            },
        )
    } else {
        (FetchStrategy::TrickleUp, None, Vec::new())
    };

    Strategy {
        query_type,
        primary_sources,
        target_authors: Vec::new(),
        related_sugyos: Vec::new(),
        comparison_terms,
        fetch_strategy,
        depth: Depth::Standard,
        confidence: if clarification_prompt.is_some() { Confidence::Low } else { Confidence::Medium },
        reasoning: "LLM strategy unavailable; derived from corpus search profile only".to_string(),
        clarification_prompt,
        clarification_options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{NameDisambiguation, RelatedResponse, SearchResponse, TextResponse};
    use crate::services::llm::{LLMAnalysisRequestTrait, LLMError};
    use async_trait::async_trait;
    use std::collections::HashMap as Map;

    struct MockCorpus {
        hits: Map<&'static str, (u64, Vec<&'static str>)>,
    }

    #[async_trait]
    impl CorpusClient for MockCorpus {
        async fn search(&self, hebrew_term: &str, _size: usize) -> ApiResult<SearchResponse> {
            let (total, refs) = self.hits.get(hebrew_term).cloned().unwrap_or((0, Vec::new()));
            Ok(SearchResponse {
                total_hits: total,
                by_category: HashMap::new(),
                by_tractate: HashMap::new(),
                top_refs: refs.into_iter().map(str::to_string).collect(),
                sample_hits: Vec::new(),
            })
        }
        async fn get_text(&self, reference: &str) -> ApiResult<TextResponse> {
            Ok(TextResponse { hebrew: String::new(), english: String::new(), canonical_ref: reference.to_string() })
        }
        async fn get_related(&self, _reference: &str) -> ApiResult<RelatedResponse> {
            Ok(RelatedResponse { commentaries: Vec::new(), links: Vec::new() })
        }
        async fn name_lookup(&self, _token: &str) -> ApiResult<Vec<NameDisambiguation>> {
            Ok(Vec::new())
        }
    }

    struct DisabledLlm;

    #[async_trait]
    impl LLMService for DisabledLlm {
        fn is_available(&self) -> bool {
            false
        }
        async fn analyze<Req, Resp>(&self, _request: &Req) -> Result<LLMAnalysisResult<Resp>, LLMError>
        where
            Req: LLMAnalysisRequestTrait,
            Resp: crate::services::llm::LLMAnalysisResponseTrait,
        {
            Err(LLMError::Disabled)
        }
    }

    #[tokio::test]
    async fn known_sugya_shortcut_bypasses_llm() {
        let corpus = MockCorpus { hits: Map::new() };
        let llm = DisabledLlm;
        let strategy = build_strategy(&llm, &corpus, "chezkas haguf", &[]).await.unwrap();
        assert_eq!(strategy.confidence, Confidence::High);
        assert_eq!(strategy.primary_sources, vec!["Kesubot 12b".to_string(), "Bava Batra 92b".to_string()]);
    }

    #[tokio::test]
    async fn fallback_uses_profile_top_ref_when_llm_disabled() {
        let corpus =
            MockCorpus { hits: Map::from([("חידוש", (40u64, vec!["Bava Metzia 10a"]))]) };
        let llm = DisabledLlm;
        let strategy =
            build_strategy(&llm, &corpus, "some unmapped concept", &["חידוש".to_string()]).await.unwrap();
        assert_eq!(strategy.primary_sources, vec!["Bava Metzia 10a".to_string()]);
        assert!(strategy.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn fallback_asks_for_clarification_when_profile_is_empty() {
        let corpus = MockCorpus { hits: Map::new() };
        let llm = DisabledLlm;
        let strategy =
            build_strategy(&llm, &corpus, "totally unknown", &["לא ידוע".to_string()]).await.unwrap();
        assert_eq!(strategy.confidence, Confidence::Low);
        assert!(strategy.clarification_prompt.is_some());
        assert!(strategy.check_invariants().is_ok());
    }
}
