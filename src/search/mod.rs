//! SEARCH - "sugya archaeology": locate candidate anchors, validate them
//! against the corpus (and an LLM second opinion), trickle out to
//! commentaries and codifiers, then fetch and group the result (§4.9).

pub mod llm;
pub mod priority;

use futures::stream::{self, StreamExt};

use crate::authors;
use crate::clarification::{ClarificationKind, ClarificationStore, PendingClarification};
use crate::corpus::CorpusClient;
use crate::decipher::{self, DecipherDeps};
use crate::models::{
    Confidence, DecipherMethod, DecipherResult, FetchStrategy, QueryType, SearchResult, Source, SourceLevel,
    Strategy, WordValidation,
};
use crate::services::llm::{LLMAnalysisResult, LLMService};
use crate::understand;
use crate::utils::{unique_ordered, ApiResult};

use llm::{SugyaValidationRequest, SugyaValidationResponse};
use priority::{classical_priority_weight, depth_cap, extract_talmud_refs, is_codified_work_ref};

/// How many hits `corpus.search` is asked to return per term while locating
/// candidate anchors (wider than UNDERSTAND's profile sample).
const LOCATE_SEARCH_SIZE: usize = 20;

/// Two candidate locations are "comparably prominent" - and thus ambiguous
/// enough to ask the user - when the runner-up's score is within this
/// fraction of the leader's.
const AMBIGUITY_RATIO_THRESHOLD: f64 = 0.8;

/// How many of the top-ranked candidates phase A actually visits to extract
/// cited Talmud refs from (visiting all of them would be unbounded).
const LOCATE_VISIT_CAP: usize = 5;

/// Collaborators SEARCH needs; bundled so `run_search` doesn't take five
/// positional references.
pub struct SearchDeps<'a> {
    pub llm: &'a dyn LLMService,
    pub corpus: &'a dyn CorpusClient,
    pub clarifications: &'a ClarificationStore,
    pub fetch_concurrency: usize,
}

struct CandidateLocation {
    reference: String,
    score: f64,
}

enum LocateOutcome {
    Anchors(Vec<String>),
    Ambiguous(Vec<CandidateLocation>),
    None,
}

/// Runs the full four-phase pipeline for a deciphered, strategized query.
pub async fn run_search(
    deps: &SearchDeps<'_>,
    query: &str,
    hebrew_terms: Vec<String>,
    strategy: Strategy,
) -> ApiResult<SearchResult> {
    let located = locate(deps, &strategy, &hebrew_terms).await;

    let anchors = match located {
        LocateOutcome::Anchors(refs) => refs,
        LocateOutcome::Ambiguous(candidates) => {
            let options: Vec<String> = candidates.iter().map(|c| c.reference.clone()).collect();
            let context = serde_json::json!({
                "candidates": options,
                "hebrew_terms": hebrew_terms,
            });
            let query_id = deps.clarifications.suspend(ClarificationKind::SearchLocate, query, context);
            return Ok(SearchResult::needing_clarification(
                query,
                query_id,
                "Several similarly prominent locations discuss this topic. Which one did you mean?".to_string(),
                options,
            ));
        },
        LocateOutcome::None => {
            return Ok(SearchResult::empty_with_message(
                query,
                "no candidate sources were found for this query in the corpus",
            ));
        },
    };

    let validated_anchors = validate(deps, query, &hebrew_terms, &strategy, anchors).await;
    if validated_anchors.is_empty() {
        return Ok(SearchResult::empty_with_message(query, "every candidate source failed corpus validation"));
    }

    let kept_refs = trickle(deps, &strategy, &validated_anchors).await;
    let sources = fetch_and_assign_levels(deps, kept_refs).await;

    let mut result = SearchResult::group_by_level(query, hebrew_terms, sources);
    result.interpretation = strategy.reasoning.clone();
    result.confidence = strategy.confidence;

    if matches!(strategy.query_type, QueryType::Comparison) && strategy.comparison_terms.len() >= 2 {
        result.sources_by_term = group_by_comparison_term(&strategy.comparison_terms, &result.sources);
    }

    result.message = format!("found {} source(s) across {} level(s)", result.total_sources, result.levels_present.len());
    Ok(result)
}

/// Resumes a suspended pipeline after the client answers a disambiguation
/// question, dispatching on which stage suspended it (§2: "Clarifications
/// can suspend and resume either after DECIPHER or after UNDERSTAND").
pub async fn resume_after_clarification(
    deps: &SearchDeps<'_>,
    decipher_deps: &DecipherDeps<'_>,
    query_id: &str,
    selected_option_id: &str,
) -> ApiResult<SearchResult> {
    let Some(pending) = deps.clarifications.take(query_id) else {
        return Ok(SearchResult::empty_with_message(
            selected_option_id,
            "this clarification has expired or was already answered",
        ));
    };

    match pending.kind {
        ClarificationKind::SearchLocate => resume_locate_clarification(deps, pending, selected_option_id).await,
        ClarificationKind::Decipher => resume_decipher_clarification(deps, decipher_deps, pending, selected_option_id).await,
    }
}

/// Resumes SEARCH's own phase-A ambiguity by picking one of the offered
/// candidate anchor refs.
async fn resume_locate_clarification(
    deps: &SearchDeps<'_>,
    pending: PendingClarification,
    chosen_ref: &str,
) -> ApiResult<SearchResult> {
    let hebrew_terms: Vec<String> = pending
        .context
        .get("hebrew_terms")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|t| t.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    let candidates: Vec<String> = pending
        .context
        .get("candidates")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|r| r.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    if !candidates.iter().any(|c| c == chosen_ref) {
        return Ok(SearchResult::empty_with_message(
            &pending.original_query,
            "the chosen reference was not among the offered candidates",
        ));
    }

    // A resumed search skips straight to validate/trickle/fetch with the
    // user's chosen anchor standing in for phase A's output.
    let strategy = Strategy {
        query_type: QueryType::Unknown,
        primary_sources: vec![chosen_ref.to_string()],
        target_authors: Vec::new(),
        related_sugyos: Vec::new(),
        comparison_terms: Vec::new(),
        fetch_strategy: FetchStrategy::DirectRef,
        depth: crate::models::Depth::Standard,
        confidence: Confidence::Medium,
        reasoning: "resumed after user clarified which location was meant".to_string(),
        clarification_prompt: None,
        clarification_options: Vec::new(),
    };

    let validated_anchors = validate(deps, &pending.original_query, &hebrew_terms, &strategy, vec![chosen_ref.to_string()]).await;
    if validated_anchors.is_empty() {
        return Ok(SearchResult::empty_with_message(&pending.original_query, "the chosen reference failed corpus validation"));
    }

    let kept_refs = trickle(deps, &strategy, &validated_anchors).await;
    let sources = fetch_and_assign_levels(deps, kept_refs).await;

    let mut result = SearchResult::group_by_level(&pending.original_query, hebrew_terms, sources);
    result.interpretation = strategy.reasoning;
    result.confidence = strategy.confidence;
    result.message = format!("found {} source(s) across {} level(s)", result.total_sources, result.levels_present.len());
    Ok(result)
}

/// Resumes a DECIPHER-phase ambiguity suspended mid-`/search` (§4.7 step 4):
/// re-applies the user's word choice to the in-flight `DecipherResult`
/// reconstructed from the suspended context, then - if that resolves every
/// pending word - continues straight into UNDERSTAND and SEARCH exactly as
/// `run_search` would have. A query with further pending words re-suspends
/// for another round of `/search/clarify`.
async fn resume_decipher_clarification(
    deps: &SearchDeps<'_>,
    decipher_deps: &DecipherDeps<'_>,
    pending: PendingClarification,
    chosen_hebrew: &str,
) -> ApiResult<SearchResult> {
    let query = pending.original_query.clone();

    let hebrew_terms_so_far: Vec<String> = pending
        .context
        .get("hebrew_terms")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|t| t.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    let word_validations: Vec<WordValidation> = pending
        .context
        .get("word_validations")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    if word_validations.is_empty() {
        return Ok(SearchResult::empty_with_message(&query, "no pending word validation to resolve"));
    }

    let in_flight = DecipherResult {
        success: false,
        hebrew_term: hebrew_terms_so_far.first().cloned().unwrap_or_default(),
        hebrew_terms: hebrew_terms_so_far,
        confidence: Confidence::Low,
        method: DecipherMethod::MixedExtraction,
        is_mixed_query: true,
        is_pure_english: false,
        original_query: query.clone(),
        extraction_confident: false,
        needs_validation: true,
        word_validations,
        message: String::new(),
    };

    let resolved = decipher::confirm_word(decipher_deps.dictionary, in_flight, 0, chosen_hebrew)?;

    if resolved.needs_validation {
        let prompt = resolved
            .word_validations
            .first()
            .map(|w| format!("I'm not confident how to read \"{}\". Which did you mean?", w.original))
            .unwrap_or_else(|| "some terms in this query are ambiguous".to_string());
        let options = resolved.word_validations.first().map(|w| w.alternatives.clone()).unwrap_or_default();
        let context = serde_json::json!({
            "word_validations": resolved.word_validations,
            "hebrew_terms": resolved.hebrew_terms,
        });
        let query_id = deps.clarifications.suspend(ClarificationKind::Decipher, &query, context);
        return Ok(SearchResult::needing_clarification(&query, query_id, prompt, options));
    }

    if !resolved.success || resolved.hebrew_terms.is_empty() {
        return Ok(SearchResult::empty_with_message(&query, resolved.message));
    }

    let strategy = understand::build_strategy(deps.llm, deps.corpus, &query, &resolved.hebrew_terms).await?;
    run_search(deps, &query, resolved.hebrew_terms, strategy).await
}

/// Phase A: locate one or more anchor references to build out from.
async fn locate(deps: &SearchDeps<'_>, strategy: &Strategy, hebrew_terms: &[String]) -> LocateOutcome {
    if matches!(strategy.fetch_strategy, FetchStrategy::DirectRef) && !strategy.primary_sources.is_empty() {
        return LocateOutcome::Anchors(strategy.primary_sources.clone());
    }

    let mut candidates: Vec<CandidateLocation> = Vec::new();
    for term in hebrew_terms {
        let response = match deps.corpus.search(term, LOCATE_SEARCH_SIZE).await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("locate search failed for {term:?}: {e}");
                continue;
            },
        };
        let categories: Vec<String> = response.by_category.keys().cloned().collect();
        let weight = classical_priority_weight(&categories);

        let codified_refs: Vec<&String> = response.top_refs.iter().filter(|r| is_codified_work_ref(r)).collect();
        let refs_to_rank: Vec<&String> = if codified_refs.is_empty() { response.top_refs.iter().collect() } else { codified_refs };

        for (idx, reference) in refs_to_rank.iter().enumerate() {
            let density = (response.total_hits as f64) / (idx as f64 + 1.0);
            candidates.push(CandidateLocation { reference: (*reference).clone(), score: density * weight });
        }
    }

    if candidates.is_empty() {
        return if strategy.primary_sources.is_empty() {
            LocateOutcome::None
        } else {
            LocateOutcome::Anchors(strategy.primary_sources.clone())
        };
    }

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    if candidates.len() >= 2 && strategy.confidence != Confidence::High {
        let top = candidates[0].score;
        let runner_up = candidates[1].score;
        if top > 0.0 && runner_up / top >= AMBIGUITY_RATIO_THRESHOLD {
            candidates.truncate(4);
            return LocateOutcome::Ambiguous(candidates);
        }
    }

    let mut anchor_refs = strategy.primary_sources.clone();
    for candidate in candidates.into_iter().take(LOCATE_VISIT_CAP.max(depth_cap(strategy.depth).min(LOCATE_VISIT_CAP))) {
        anchor_refs.push(candidate.reference.clone());
        if let Ok(text) = deps.corpus.get_text(&candidate.reference).await {
            anchor_refs.extend(extract_talmud_refs(&text.hebrew));
            anchor_refs.extend(extract_talmud_refs(&text.english));
        }
    }

    LocateOutcome::Anchors(unique_ordered(anchor_refs))
}

/// Phase B: ask the LLM which located refs are actually relevant, then
/// hallucination-guard whatever it (or its empty fallback) returns by
/// re-fetching every proposed ref from the real corpus. Refs that don't
/// resolve are silently dropped - never surfaced.
async fn validate(
    deps: &SearchDeps<'_>,
    query: &str,
    hebrew_terms: &[String],
    strategy: &Strategy,
    candidate_refs: Vec<String>,
) -> Vec<String> {
    let request = SugyaValidationRequest {
        query: query.to_string(),
        hebrew_terms: hebrew_terms.to_vec(),
        strategy_reasoning: strategy.reasoning.clone(),
        candidate_refs: candidate_refs.clone(),
    };

    let proposed: Vec<String> = match deps.llm.analyze::<SugyaValidationRequest, SugyaValidationResponse>(&request).await {
        Ok(LLMAnalysisResult { response, .. }) if !response.validated_refs.is_empty() => response.validated_refs,
        Ok(_) => candidate_refs,
        Err(e) => {
            tracing::warn!("SEARCH validation LLM call failed ({e}); trusting located refs unvalidated");
            candidate_refs
        },
    };

    let corpus = deps.corpus;
    let checked: Vec<Option<String>> = stream::iter(proposed.into_iter())
        .map(|reference| async move {
            match corpus.get_text(&reference).await {
                Ok(_) => Some(reference),
                Err(_) => None,
            }
        })
        .buffer_unordered(deps.fetch_concurrency.max(1))
        .collect()
        .await;

    unique_ordered(checked.into_iter().flatten().collect())
}

/// Phase C: for each validated anchor, pull its related commentaries (and,
/// for halachic-practice queries, walk upward into the codes), keeping only
/// target-author matches up to the depth's per-level cap.
async fn trickle(deps: &SearchDeps<'_>, strategy: &Strategy, anchors: &[String]) -> Vec<String> {
    let cap = depth_cap(strategy.depth);
    let mut kept: Vec<String> = Vec::new();

    for anchor in anchors {
        kept.push(anchor.clone());

        let level = classify_level(anchor).0;
        let target_authors: Vec<String> = if strategy.target_authors.is_empty() {
            authors::default_authors_for_level(level).into_iter().map(str::to_string).collect()
        } else {
            strategy.target_authors.clone()
        };

        if let Ok(related) = deps.corpus.get_related(anchor).await {
            let mut taken = 0usize;
            for link in related.commentaries.iter().chain(related.links.iter()) {
                if taken >= cap {
                    break;
                }
                let detected = link
                    .collective_title
                    .as_deref()
                    .and_then(authors::matches)
                    .or_else(|| authors::matches(&link.category));
                if detected.map(|key| target_authors.iter().any(|t| t == key)).unwrap_or(false) {
                    kept.push(link.reference.clone());
                    taken += 1;
                }
            }
        }

        if matches!(strategy.query_type, QueryType::HalachicPractice) {
            if let Ok(response) = deps.corpus.search(anchor, 10).await {
                let upward = response
                    .top_refs
                    .iter()
                    .filter(|r| r.starts_with("Mishneh Torah") || is_codified_work_ref(r))
                    .take(cap);
                kept.extend(upward.cloned());
            }
        }
    }

    unique_ordered(kept)
}

/// Phase D: fetch full text for every kept ref (best effort - a ref that
/// fails to fetch is dropped rather than failing the whole search),
/// classify its authority level, and sort deterministically by reference.
async fn fetch_and_assign_levels(deps: &SearchDeps<'_>, refs: Vec<String>) -> Vec<Source> {
    let corpus = deps.corpus;
    let fetched: Vec<Option<Source>> = stream::iter(refs.into_iter())
        .map(|reference| async move {
            match corpus.get_text(&reference).await {
                Ok(text) => {
                    let (level, author_key) = classify_level(&reference);
                    let hebrew_label = author_key
                        .as_deref()
                        .and_then(authors::author)
                        .map(|a| a.primary_name_he.to_string())
                        .unwrap_or_else(|| text.canonical_ref.clone());
                    Some(Source::new(text.canonical_ref.clone(), hebrew_label, author_key, level, text.hebrew, text.english))
                },
                Err(e) => {
                    tracing::debug!("fetch failed for {reference:?}, dropping: {e}");
                    None
                },
            }
        })
        .buffer_unordered(deps.fetch_concurrency.max(1))
        .collect()
        .await;

    let mut sources: Vec<Source> = fetched.into_iter().flatten().collect();
    sources.sort_by(|a, b| a.reference.cmp(&b.reference));
    sources
}

/// Classifies a reference's authority level: a recognized author token in
/// the ref string wins first, then known work-family prefixes, then a bare
/// Talmud citation, else `Other`.
fn classify_level(reference: &str) -> (SourceLevel, Option<String>) {
    if let Some(key) = authors::detect_in_text(reference).into_iter().next() {
        if let Some(author) = authors::author(key) {
            return (author.level, Some(key.to_string()));
        }
    }
    if reference.starts_with("Mishneh Torah") {
        return (SourceLevel::Rambam, None);
    }
    if is_codified_work_ref(reference) {
        let level = if reference.starts_with("Tur") { SourceLevel::Tur } else { SourceLevel::ShulchanAruch };
        return (level, None);
    }
    if priority::is_chumash_ref(reference) {
        return (SourceLevel::Chumash, None);
    }
    if reference.starts_with("Mishnah ") {
        return (SourceLevel::Mishnah, None);
    }
    if priority::looks_like_bare_talmud_ref(reference) {
        return (SourceLevel::Gemara, None);
    }
    (SourceLevel::Other, None)
}

/// For comparison queries, assigns each source to whichever comparison term
/// it mentions most often; ties favor the earlier term in `terms`. Returned
/// in `terms` order (not sorted) so the comparison reads left-to-right the
/// way the query posed it.
fn group_by_comparison_term(terms: &[String], sources: &[Source]) -> indexmap::IndexMap<String, Vec<Source>> {
    let mut map: indexmap::IndexMap<String, Vec<Source>> =
        terms.iter().map(|t| (t.clone(), Vec::new())).collect();

    for source in sources {
        let body = format!("{} {}", source.hebrew_body, source.english_body);
        let mut best_idx = 0usize;
        let mut best_count: i64 = -1;
        for (idx, term) in terms.iter().enumerate() {
            let count = body.matches(term.as_str()).count() as i64;
            if count > best_count {
                best_count = count;
                best_idx = idx;
            }
        }
        map.get_mut(&terms[best_idx]).expect("best_idx indexes terms").push(source.clone());
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{NameDisambiguation, RelatedLink, RelatedResponse, SearchResponse, TextResponse};
    use crate::services::llm::{LLMAnalysisRequestTrait, LLMAnalysisResponseTrait, LLMError};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MockCorpus {
        search_results: HashMap<&'static str, (u64, Vec<&'static str>)>,
        related: HashMap<&'static str, Vec<(&'static str, &'static str)>>,
        known_refs: Vec<&'static str>,
    }

    #[async_trait]
    impl CorpusClient for MockCorpus {
        async fn search(&self, hebrew_term: &str, _size: usize) -> ApiResult<SearchResponse> {
            let (total, refs) = self.search_results.get(hebrew_term).cloned().unwrap_or((0, Vec::new()));
            Ok(SearchResponse {
                total_hits: total,
                by_category: HashMap::from([("Talmud".to_string(), total)]),
                by_tractate: HashMap::new(),
                top_refs: refs.into_iter().map(str::to_string).collect(),
                sample_hits: Vec::new(),
            })
        }

        async fn get_text(&self, reference: &str) -> ApiResult<TextResponse> {
            if self.known_refs.iter().any(|r| *r == reference) {
                Ok(TextResponse { hebrew: String::new(), english: String::new(), canonical_ref: reference.to_string() })
            } else {
                Err(crate::utils::ApiError::not_found(format!("no such ref: {reference}")))
            }
        }

        async fn get_related(&self, reference: &str) -> ApiResult<RelatedResponse> {
            let links = self
                .related
                .get(reference)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|(reference, collective_title)| RelatedLink {
                    reference: reference.to_string(),
                    category: "Commentary".to_string(),
                    collective_title: Some(collective_title.to_string()),
                })
                .collect();
            Ok(RelatedResponse { commentaries: links, links: Vec::new() })
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
            Resp: LLMAnalysisResponseTrait,
        {
            Resp::fallback()
                .map(|response| LLMAnalysisResult {
                    response,
                    from_cache: false,
                    token_usage: Default::default(),
                    was_repaired: false,
                })
                .ok_or(LLMError::Disabled)
        }
    }

    fn direct_ref_strategy(refs: Vec<&str>) -> Strategy {
        Strategy {
            query_type: QueryType::SugyaReference,
            primary_sources: refs.into_iter().map(str::to_string).collect(),
            target_authors: vec!["rashi".to_string()],
            related_sugyos: Vec::new(),
            comparison_terms: Vec::new(),
            fetch_strategy: FetchStrategy::DirectRef,
            depth: crate::models::Depth::Standard,
            confidence: Confidence::High,
            reasoning: "direct reference test".to_string(),
            clarification_prompt: None,
            clarification_options: Vec::new(),
        }
    }

    #[tokio::test]
    async fn direct_ref_strategy_skips_locate_search() {
        let corpus = MockCorpus {
            search_results: HashMap::new(),
            related: HashMap::from([("Bava Kamma 46a", vec![("Rashi on Bava Kamma 46a", "Rashi")])]),
            known_refs: vec!["Bava Kamma 46a", "Rashi on Bava Kamma 46a"],
        };
        let llm = DisabledLlm;
        let clarifications = ClarificationStore::new(30);
        let deps = SearchDeps { llm: &llm, corpus: &corpus, clarifications: &clarifications, fetch_concurrency: 4 };

        let strategy = direct_ref_strategy(vec!["Bava Kamma 46a"]);
        let result = run_search(&deps, "chezkas mammon", vec!["חזקת ממון".to_string()], strategy).await.unwrap();

        assert!(!result.needs_clarification);
        assert!(result.sources.iter().any(|s| s.reference == "Bava Kamma 46a"));
        assert!(result.sources.iter().any(|s| s.reference == "Rashi on Bava Kamma 46a"));
    }

    #[tokio::test]
    async fn hallucinated_validated_ref_is_dropped_silently() {
        let corpus = MockCorpus {
            search_results: HashMap::new(),
            related: HashMap::new(),
            known_refs: vec!["Bava Kamma 46a"],
        };
        let llm = DisabledLlm;
        let clarifications = ClarificationStore::new(30);
        let deps = SearchDeps { llm: &llm, corpus: &corpus, clarifications: &clarifications, fetch_concurrency: 4 };

        let strategy = direct_ref_strategy(vec!["Bava Kamma 46a", "Imaginary Tractate 99z"]);
        let result = run_search(&deps, "q", vec![], strategy).await.unwrap();

        assert!(result.sources.iter().all(|s| s.reference != "Imaginary Tractate 99z"));
        assert!(result.sources.iter().any(|s| s.reference == "Bava Kamma 46a"));
    }

    #[tokio::test]
    async fn no_candidates_yields_empty_result_not_error() {
        let corpus = MockCorpus { search_results: HashMap::new(), related: HashMap::new(), known_refs: Vec::new() };
        let llm = DisabledLlm;
        let clarifications = ClarificationStore::new(30);
        let deps = SearchDeps { llm: &llm, corpus: &corpus, clarifications: &clarifications, fetch_concurrency: 4 };

        let strategy = Strategy {
            query_type: QueryType::Unknown,
            primary_sources: Vec::new(),
            target_authors: Vec::new(),
            related_sugyos: Vec::new(),
            comparison_terms: Vec::new(),
            fetch_strategy: FetchStrategy::BroadScan,
            depth: crate::models::Depth::Basic,
            confidence: Confidence::Low,
            reasoning: "nothing found".to_string(),
            clarification_prompt: None,
            clarification_options: Vec::new(),
        };

        let result = run_search(&deps, "nonsense", vec!["לא קיים".to_string()], strategy).await.unwrap();
        assert_eq!(result.total_sources, 0);
        assert!(!result.needs_clarification);
    }

    #[test]
    fn classify_level_recognizes_author_and_codified_prefixes() {
        assert_eq!(classify_level("Rashi on Bava Kamma 46a").0, SourceLevel::Rashi);
        assert_eq!(classify_level("Shulchan Arukh, Orach Chaim 1:1").0, SourceLevel::ShulchanAruch);
        assert_eq!(classify_level("Bava Kamma 46a").0, SourceLevel::Gemara);
        assert_eq!(classify_level("Genesis 1:1").0, SourceLevel::Chumash);
    }

    #[test]
    fn comparison_grouping_breaks_ties_to_first_term() {
        let terms = vec!["אבן".to_string(), "עץ".to_string()];
        let sources = vec![Source::new("Ref 1", "Ref 1", None, SourceLevel::Other, "אבן אבן עץ", "")];
        let grouped = group_by_comparison_term(&terms, &sources);
        assert_eq!(grouped.get("אבן").map(Vec::len), Some(1));
        assert_eq!(grouped.get("עץ").map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn resume_after_decipher_clarification_continues_into_search() {
        use crate::dictionary::WordDictionary;
        use crate::models::ValidationType;
        use crate::validator::TermValidator;
        use std::sync::Arc;

        let corpus = Arc::new(MockCorpus {
            search_results: HashMap::from([("חזקת הגוף", (5u64, vec!["Kesubot 12b"]))]),
            related: HashMap::new(),
            known_refs: vec!["Kesubot 12b"],
        });
        let llm = DisabledLlm;
        let clarifications = ClarificationStore::new(30);
        let deps = SearchDeps { llm: &llm, corpus: corpus.as_ref(), clarifications: &clarifications, fetch_concurrency: 4 };

        let dictionary = WordDictionary::in_memory();
        let validator = TermValidator::new(corpus.clone(), 4);
        let decipher_deps = DecipherDeps { dictionary: &dictionary, validator: &validator, max_variants: 15 };

        let word_validation = WordValidation {
            original: "chezkas".to_string(),
            best_match: None,
            alternatives: vec!["חזקת".to_string()],
            confidence: Confidence::Low,
            needs_validation: true,
            rules_fired: Vec::new(),
            validation_type: ValidationType::Clarify,
        };
        let context = serde_json::json!({
            "word_validations": vec![word_validation],
            "hebrew_terms": Vec::<String>::new(),
        });
        let query_id = clarifications.suspend(ClarificationKind::Decipher, "chezkas haguf", context);

        let result = resume_after_clarification(&deps, &decipher_deps, &query_id, "חזקת הגוף").await.unwrap();

        assert!(!result.needs_clarification);
        assert!(result.sources.iter().any(|s| s.reference == "Kesubot 12b"));
        assert_eq!(dictionary.get("chezkas").map(|e| e.hebrew), Some("חזקת הגוף".to_string()));
    }
}
