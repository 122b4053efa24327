//! End-to-end pipeline scenarios (DECIPHER -> UNDERSTAND -> SEARCH),
//! exercising the documented concrete scenarios against mock corpus/LLM
//! collaborators rather than the real external services.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use sugya_finder::corpus::{CorpusClient, NameDisambiguation, RelatedResponse, SearchResponse, TextResponse};
use sugya_finder::decipher::{self, DecipherDeps};
use sugya_finder::dictionary::WordDictionary;
use sugya_finder::models::{DecipherMethod, EntryProvenance, SourceLevel};
use sugya_finder::search::{self, SearchDeps};
use sugya_finder::services::llm::{LLMAnalysisResponseTrait, LLMAnalysisResult, LLMError, LLMService};
use sugya_finder::understand;
use sugya_finder::utils::ApiResult;
use sugya_finder::validator::TermValidator;
use sugya_finder::clarification::ClarificationStore;

struct MockCorpus {
    hits: HashMap<&'static str, (u64, Vec<&'static str>)>,
    /// ref -> Hebrew body text returned by `get_text`; absence means NotFound.
    bodies: HashMap<&'static str, &'static str>,
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
        match self.bodies.get(reference) {
            Some(body) => Ok(TextResponse { hebrew: body.to_string(), english: String::new(), canonical_ref: reference.to_string() }),
            None => Err(sugya_finder::utils::ApiError::not_found(format!("no such ref: {reference}"))),
        }
    }

    async fn get_related(&self, _reference: &str) -> ApiResult<RelatedResponse> {
        Ok(RelatedResponse { commentaries: Vec::new(), links: Vec::new() })
    }

    async fn name_lookup(&self, _token: &str) -> ApiResult<Vec<NameDisambiguation>> {
        Ok(Vec::new())
    }
}

/// An LLM that is never actually reachable - UNDERSTAND's deterministic
/// fallback is what these tests exercise.
struct DisabledLlm;

#[async_trait]
impl LLMService for DisabledLlm {
    fn is_available(&self) -> bool {
        false
    }

    async fn analyze<Req, Resp>(&self, _request: &Req) -> Result<LLMAnalysisResult<Resp>, LLMError>
    where
        Req: sugya_finder::services::llm::LLMAnalysisRequestTrait,
        Resp: LLMAnalysisResponseTrait,
    {
        Err(LLMError::Disabled)
    }
}

/// Scenario 1: pure-English pass-through skips the dictionary/rule engine
/// entirely and must never reach UNDERSTAND with a fabricated Hebrew term.
#[tokio::test]
async fn pure_english_query_passes_through() {
    let dictionary = WordDictionary::in_memory();
    let corpus = Arc::new(MockCorpus { hits: HashMap::new(), bodies: HashMap::new() });
    let validator = TermValidator::new(corpus, 4);
    let deps = DecipherDeps { dictionary: &dictionary, validator: &validator, max_variants: 15 };

    let result = decipher::decipher(&deps, "sources for women covering hair").await;

    assert!(result.is_pure_english);
    assert_eq!(result.method, DecipherMethod::Passthrough);
    assert!(result.hebrew_terms.is_empty());
}

/// Scenario 4: a comparison query deciphers into two Hebrew terms, and
/// UNDERSTAND's deterministic fallback (no LLM available) must still
/// classify it as a comparison and hand SEARCH two populated, disjoint
/// term buckets.
#[tokio::test]
async fn comparison_query_produces_disjoint_term_buckets() {
    let dictionary = WordDictionary::in_memory();
    dictionary.record("chezkas haguf", "חזקת הגוף", EntryProvenance::Manual).unwrap();
    dictionary.record("chezkas mammon", "חזקת ממון", EntryProvenance::Manual).unwrap();

    let corpus = Arc::new(MockCorpus {
        hits: HashMap::from([
            ("חזקת הגוף", (20u64, vec!["Kesubot 12b"])),
            ("חזקת ממון", (15u64, vec!["Bava Kamma 46a"])),
        ]),
        bodies: HashMap::from([
            ("Kesubot 12b", "דין חזקת הגוף בעדים"),
            ("Bava Kamma 46a", "דין חזקת ממון על הנתבע"),
        ]),
    });
    let validator = TermValidator::new(corpus.clone(), 4);
    let decipher_deps = DecipherDeps { dictionary: &dictionary, validator: &validator, max_variants: 15 };

    let query = "chezkas haguf vs chezkas mammon";
    let deciphered = decipher::decipher(&decipher_deps, query).await;
    assert!(deciphered.success, "decipher failed: {}", deciphered.message);
    assert_eq!(deciphered.hebrew_terms.len(), 2);

    let llm = DisabledLlm;
    let strategy = understand::build_strategy(&llm, corpus.as_ref(), query, &deciphered.hebrew_terms).await.unwrap();
    assert_eq!(strategy.comparison_terms.len(), 2);
    assert!(strategy.check_invariants().is_ok());

    let clarifications = ClarificationStore::new(30);
    let search_deps = SearchDeps { llm: &llm, corpus: corpus.as_ref(), clarifications: &clarifications, fetch_concurrency: 4 };
    let result = search::run_search(&search_deps, query, deciphered.hebrew_terms, strategy).await.unwrap();

    let by_term = &result.sources_by_term;
    assert_eq!(by_term.len(), 2);
    let term_a: std::collections::HashSet<_> = by_term["חזקת הגוף"].iter().map(|s| s.reference.clone()).collect();
    let term_b: std::collections::HashSet<_> = by_term["חזקת ממון"].iter().map(|s| s.reference.clone()).collect();
    assert!(term_a.is_disjoint(&term_b));
    assert!(!term_a.is_empty() || !term_b.is_empty());
}

/// Level totality: every source in a populated result carries one of the
/// closed set of `SourceLevel` variants, and `sources_by_level` partitions
/// `sources` with no duplication or loss.
#[tokio::test]
async fn sources_by_level_partitions_sources() {
    let dictionary = WordDictionary::in_memory();
    dictionary.record("chezkas mammon", "חזקת ממון", EntryProvenance::Manual).unwrap();
    let corpus = Arc::new(MockCorpus {
        hits: HashMap::from([("חזקת ממון", (10u64, vec!["Bava Kamma 46a", "Rashi on Bava Kamma 46a"]))]),
        bodies: HashMap::from([
            ("Bava Kamma 46a", "דין חזקת ממון"),
            ("Rashi on Bava Kamma 46a", "פירוש על חזקת ממון"),
        ]),
    });
    let validator = TermValidator::new(corpus.clone(), 4);
    let decipher_deps = DecipherDeps { dictionary: &dictionary, validator: &validator, max_variants: 15 };

    let query = "chezkas mammon";
    let deciphered = decipher::decipher(&decipher_deps, query).await;
    let llm = DisabledLlm;
    let strategy = understand::build_strategy(&llm, corpus.as_ref(), query, &deciphered.hebrew_terms).await.unwrap();

    let clarifications = ClarificationStore::new(30);
    let search_deps = SearchDeps { llm: &llm, corpus: corpus.as_ref(), clarifications: &clarifications, fetch_concurrency: 4 };
    let result = search::run_search(&search_deps, query, deciphered.hebrew_terms, strategy).await.unwrap();

    let total_in_buckets: usize = result.sources_by_level.values().map(Vec::len).sum();
    assert_eq!(total_in_buckets, result.sources.len());
    for source in &result.sources {
        assert!(SourceLevel::all().contains(&source.level));
    }
}
