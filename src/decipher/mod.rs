//! DECIPHER - turns a raw user query into one or more Hebrew search terms
//! (§4.7): classify pure-Hebrew/pure-English/mixed, extract candidate
//! phrases skipping known author tokens, resolve each via the Word
//! Dictionary first and the Transliteration Rules + Term Validator second,
//! and surface ambiguity as a `needs_validation` payload rather than guessing.

use std::collections::HashSet;

use crate::authors;
use crate::dictionary::WordDictionary;
use crate::models::{Confidence, DecipherMethod, DecipherResult, EntryProvenance};
use crate::transliteration::{generate_variants, normalize_input};
use crate::utils::{ApiError, ApiResult};
use crate::validator::TermValidator;

/// Collaborators DECIPHER needs for one request.
pub struct DecipherDeps<'a> {
    pub dictionary: &'a WordDictionary,
    pub validator: &'a TermValidator,
    pub max_variants: usize,
}

/// English stopwords/markers common enough in source-finder queries that
/// three or more of them, with no word producing a transliteration
/// pattern, signal "this is plain English" (§4.7 step 1).
const ENGLISH_MARKERS: &[&str] = &[
    "the", "is", "are", "what", "where", "when", "how", "why", "compare", "tell", "me", "about",
    "find", "sources", "source", "for", "on", "and", "discussing", "explain", "show", "does",
    "can", "you", "between", "difference", "please",
];

/// Phrase-boundary markers a multi-topic (comparison) query splits on.
const PHRASE_SPLIT_MARKERS: &[&str] = &["vs", "vs.", "versus"];

/// Glue words stripped alongside author tokens before segmentation - "rashi
/// on chezkas haguf" should extract the phrase "chezkas haguf", not choke
/// on "on".
const EXTRACTION_STOPWORDS: &[&str] = &["on", "of", "the", "a", "an", "in", "re", "regarding"];

enum Segment {
    Known(String),
    Unknown(String),
}

fn is_pure_hebrew(text: &str) -> bool {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    !letters.is_empty() && letters.iter().all(|c| ('\u{0590}'..='\u{05FF}').contains(c))
}

/// Approximates "≥3 recognized English markers and no transliteration
/// patterns": nearly every short transliterated word coincidentally fires
/// *some* rule-based pattern (that ambiguity is the whole reason the rule
/// engine exists), so instead of requiring zero pattern hits we require
/// English markers to dominate the query - at least 3 of them, covering at
/// least half its words.
fn is_pure_english(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 3 {
        return false;
    }
    let marker_count = words
        .iter()
        .filter(|w| {
            let cleaned: String = w.chars().filter(|c| c.is_alphanumeric()).collect();
            ENGLISH_MARKERS.contains(&cleaned.to_lowercase().as_str())
        })
        .count();
    marker_count >= 3 && (marker_count as f64 / words.len() as f64) >= 0.5
}

fn split_candidate_phrases(text: &str) -> Vec<String> {
    let mut current: Vec<&str> = Vec::new();
    let mut phrases = Vec::new();
    for word in text.split_whitespace() {
        let cleaned: String = word.chars().filter(|c| c.is_alphanumeric() || *c == '.').collect();
        if PHRASE_SPLIT_MARKERS.contains(&cleaned.to_lowercase().as_str()) {
            if !current.is_empty() {
                phrases.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(word);
        }
    }
    if !current.is_empty() {
        phrases.push(current.join(" "));
    }
    if phrases.is_empty() {
        vec![text.to_string()]
    } else {
        phrases
    }
}

/// Greedy longest-non-overlapping-span segmentation against the dictionary,
/// positionally aware so unmatched gaps can be routed to the rule engine -
/// the same algorithm `WordDictionary::lookup_all` runs internally, kept
/// local here because only `get` (not the private entries map) is public.
fn segment_phrase(dictionary: &WordDictionary, words: &[&str]) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < words.len() {
        let mut matched = false;
        for span_len in (1..=(words.len() - i)).rev() {
            let span = words[i..i + span_len].join(" ");
            if let Some(entry) = dictionary.get(&span) {
                out.push(Segment::Known(entry.hebrew));
                i += span_len;
                matched = true;
                break;
            }
        }
        if !matched {
            out.push(Segment::Unknown(words[i].to_string()));
            i += 1;
        }
    }
    out
}

/// Runs the full DECIPHER pipeline for one query.
pub async fn decipher(deps: &DecipherDeps<'_>, query: &str) -> DecipherResult {
    let normalized = normalize_input(query);
    if normalized.is_empty() {
        return DecipherResult::failed(query, "empty query");
    }

    if is_pure_hebrew(&normalized) {
        return DecipherResult {
            success: true,
            hebrew_term: normalized.clone(),
            hebrew_terms: vec![normalized],
            confidence: Confidence::High,
            method: DecipherMethod::Passthrough,
            is_mixed_query: false,
            is_pure_english: false,
            original_query: query.to_string(),
            extraction_confident: true,
            needs_validation: false,
            word_validations: Vec::new(),
            message: "query is pure Hebrew; no transliteration needed".to_string(),
        };
    }

    if is_pure_english(&normalized) {
        return DecipherResult::passthrough(query);
    }

    let author_tokens: Vec<&str> = normalized.split_whitespace().filter(|t| authors::is_author(t)).collect();
    let stripped: String = normalized
        .split_whitespace()
        .filter(|t| !authors::is_author(t) && !EXTRACTION_STOPWORDS.contains(t))
        .collect::<Vec<_>>()
        .join(" ");

    if stripped.is_empty() {
        return DecipherResult {
            success: true,
            hebrew_term: String::new(),
            hebrew_terms: Vec::new(),
            confidence: Confidence::High,
            method: DecipherMethod::MixedExtraction,
            is_mixed_query: true,
            is_pure_english: false,
            original_query: query.to_string(),
            extraction_confident: true,
            needs_validation: false,
            word_validations: Vec::new(),
            message: format!("query consists entirely of recognized author name(s): {}", author_tokens.join(", ")),
        };
    }

    let phrases = split_candidate_phrases(&stripped);
    let mut hebrew_terms = Vec::new();
    let mut methods_used: HashSet<DecipherMethod> = HashSet::new();

    for phrase in &phrases {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        let segments = segment_phrase(deps.dictionary, &words);

        let mut phrase_hebrew = String::new();
        let mut pending_validations = Vec::new();

        for segment in segments {
            match segment {
                Segment::Known(hebrew) => {
                    methods_used.insert(DecipherMethod::Dictionary);
                    if !phrase_hebrew.is_empty() {
                        phrase_hebrew.push(' ');
                    }
                    phrase_hebrew.push_str(&hebrew);
                },
                Segment::Unknown(word) => {
                    let variants = generate_variants(&word, deps.max_variants);
                    let validation = deps.validator.validate_word(&word, &variants).await;
                    if validation.confidence == Confidence::High && validation.best_match.is_some() {
                        methods_used.insert(DecipherMethod::Rules);
                        if !phrase_hebrew.is_empty() {
                            phrase_hebrew.push(' ');
                        }
                        phrase_hebrew.push_str(validation.best_match.as_deref().unwrap_or_default());
                    } else {
                        pending_validations.push(validation);
                    }
                },
            }
        }

        if !pending_validations.is_empty() {
            return DecipherResult {
                success: false,
                hebrew_term: hebrew_terms.first().cloned().unwrap_or_default(),
                hebrew_terms,
                confidence: Confidence::Low,
                method: DecipherMethod::MixedExtraction,
                is_mixed_query: true,
                is_pure_english: false,
                original_query: query.to_string(),
                extraction_confident: false,
                needs_validation: true,
                word_validations: pending_validations,
                message: "one or more words could not be confidently deciphered; please confirm".to_string(),
            };
        }

        if phrase_hebrew.is_empty() {
            return DecipherResult::failed(query, format!("could not decipher phrase: {phrase:?}"));
        }
        hebrew_terms.push(phrase_hebrew);
    }

    let method = if methods_used.len() > 1 {
        DecipherMethod::MixedExtraction
    } else if methods_used.contains(&DecipherMethod::Rules) {
        DecipherMethod::Rules
    } else {
        DecipherMethod::Dictionary
    };

    DecipherResult {
        success: true,
        hebrew_term: hebrew_terms.first().cloned().unwrap_or_default(),
        hebrew_terms,
        confidence: Confidence::High,
        method,
        is_mixed_query: phrases.len() > 1,
        is_pure_english: false,
        original_query: query.to_string(),
        extraction_confident: true,
        needs_validation: false,
        word_validations: Vec::new(),
        message: "deciphered successfully".to_string(),
    }
}

/// §4.7 step 4: the user picked `chosen_hebrew` for the word validation at
/// `index`. Records it in the dictionary as user-confirmed, substitutes it
/// into the in-progress result, and re-emits a completed `DecipherResult`
/// if that resolves the last pending ambiguity.
pub fn confirm_word(
    dictionary: &WordDictionary,
    mut pending: DecipherResult,
    index: usize,
    chosen_hebrew: &str,
) -> ApiResult<DecipherResult> {
    if index >= pending.word_validations.len() {
        return Err(ApiError::bad_input(format!("no pending word validation at index {index}")));
    }
    let original = pending.word_validations[index].original.clone();
    dictionary.record(&original, chosen_hebrew, EntryProvenance::UserConfirmed)?;
    pending.word_validations.remove(index);

    if pending.hebrew_terms.is_empty() {
        pending.hebrew_terms.push(chosen_hebrew.to_string());
    } else {
        let last = pending.hebrew_terms.len() - 1;
        pending.hebrew_terms[last] = format!("{} {chosen_hebrew}", pending.hebrew_terms[last]).trim().to_string();
    }
    pending.hebrew_term = pending.hebrew_terms.first().cloned().unwrap_or_default();

    pending.needs_validation = !pending.word_validations.is_empty();
    if !pending.needs_validation {
        pending.success = true;
        pending.confidence = Confidence::High;
        pending.method = DecipherMethod::MixedExtraction;
        pending.extraction_confident = true;
        pending.message = "clarification applied; term confirmed and recorded".to_string();
    }
    Ok(pending)
}

/// §4.7 step 4's negative path: the user rejected the proposed word
/// entirely, dropping it rather than substituting a replacement.
pub fn reject_word(mut pending: DecipherResult, index: usize) -> DecipherResult {
    if index < pending.word_validations.len() {
        pending.word_validations.remove(index);
    }
    pending.needs_validation = !pending.word_validations.is_empty();
    if !pending.needs_validation && pending.hebrew_terms.is_empty() {
        pending.success = false;
        pending.confidence = Confidence::Low;
        pending.method = DecipherMethod::Failed;
        pending.message = "all candidate words were rejected; could not decipher query".to_string();
    }
    pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusClient, NameDisambiguation, RelatedResponse, SearchResponse, TextResponse};
    use crate::utils::ApiResult as Res;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct MockCorpus {
        hits: HashMap<&'static str, u64>,
    }

    #[async_trait]
    impl CorpusClient for MockCorpus {
        async fn search(&self, hebrew_term: &str, _size: usize) -> Res<SearchResponse> {
            let total = self.hits.get(hebrew_term).copied().unwrap_or(0);
            Ok(SearchResponse {
                total_hits: total,
                by_category: HashMap::new(),
                by_tractate: HashMap::new(),
                top_refs: if total > 0 { vec!["Pesachim 4b".to_string()] } else { Vec::new() },
                sample_hits: Vec::new(),
            })
        }
        async fn get_text(&self, reference: &str) -> Res<TextResponse> {
            Ok(TextResponse { hebrew: String::new(), english: String::new(), canonical_ref: reference.to_string() })
        }
        async fn get_related(&self, _reference: &str) -> Res<RelatedResponse> {
            Ok(RelatedResponse { commentaries: Vec::new(), links: Vec::new() })
        }
        async fn name_lookup(&self, _token: &str) -> Res<Vec<NameDisambiguation>> {
            Ok(Vec::new())
        }
    }

    fn deps(hits: HashMap<&'static str, u64>, dictionary: &WordDictionary, validator: &TermValidator) -> DecipherDeps<'_> {
        let _ = hits;
        DecipherDeps { dictionary, validator, max_variants: 15 }
    }

    #[tokio::test]
    async fn pure_english_query_passes_through_unchanged() {
        let dictionary = WordDictionary::in_memory();
        let corpus = Arc::new(MockCorpus { hits: HashMap::new() });
        let validator = TermValidator::new(corpus, 4);
        let d = deps(HashMap::new(), &dictionary, &validator);

        let result = decipher(&d, "what is the difference between these sources").await;
        assert!(result.is_pure_english);
        assert_eq!(result.method, DecipherMethod::Passthrough);
    }

    #[tokio::test]
    async fn pure_hebrew_query_passes_through_unchanged() {
        let dictionary = WordDictionary::in_memory();
        let corpus = Arc::new(MockCorpus { hits: HashMap::new() });
        let validator = TermValidator::new(corpus, 4);
        let d = deps(HashMap::new(), &dictionary, &validator);

        let result = decipher(&d, "חזקת הגוף").await;
        assert!(result.success);
        assert_eq!(result.hebrew_terms, vec!["חזקת הגוף".to_string()]);
        assert_eq!(result.method, DecipherMethod::Passthrough);
    }

    #[tokio::test]
    async fn known_dictionary_phrase_resolves_without_rules() {
        let dictionary = WordDictionary::in_memory();
        dictionary.record("chezkas haguf", "חזקת הגוף", EntryProvenance::Manual).unwrap();
        let corpus = Arc::new(MockCorpus { hits: HashMap::new() });
        let validator = TermValidator::new(corpus, 4);
        let d = deps(HashMap::new(), &dictionary, &validator);

        let result = decipher(&d, "chezkas haguf").await;
        assert!(result.success);
        assert_eq!(result.method, DecipherMethod::Dictionary);
        assert_eq!(result.hebrew_terms, vec!["חזקת הגוף".to_string()]);
    }

    #[tokio::test]
    async fn author_token_is_skipped_not_retransliterated() {
        let dictionary = WordDictionary::in_memory();
        dictionary.record("chezkas haguf", "חזקת הגוף", EntryProvenance::Manual).unwrap();
        let corpus = Arc::new(MockCorpus { hits: HashMap::new() });
        let validator = TermValidator::new(corpus, 4);
        let d = deps(HashMap::new(), &dictionary, &validator);

        let result = decipher(&d, "rashi on chezkas haguf").await;
        assert!(result.success);
        assert_eq!(result.hebrew_terms, vec!["חזקת הגוף".to_string()]);
    }

    #[tokio::test]
    async fn low_confidence_word_requests_validation_instead_of_guessing() {
        let dictionary = WordDictionary::in_memory();
        let corpus = Arc::new(MockCorpus { hits: HashMap::new() });
        let validator = TermValidator::new(corpus, 4);
        let d = deps(HashMap::new(), &dictionary, &validator);

        let result = decipher(&d, "completely unrecognized gibberish term").await;
        assert!(!result.success);
        assert!(result.needs_validation);
        assert!(!result.word_validations.is_empty());
    }

    #[tokio::test]
    async fn confirm_word_records_and_completes_result() {
        let dictionary = WordDictionary::in_memory();
        let corpus = Arc::new(MockCorpus { hits: HashMap::new() });
        let validator = TermValidator::new(corpus, 4);
        let d = deps(HashMap::new(), &dictionary, &validator);

        let pending = decipher(&d, "zzqqxx").await;
        assert!(pending.needs_validation);

        let resolved = confirm_word(&dictionary, pending, 0, "זקק").unwrap();
        assert!(!resolved.needs_validation);
        assert!(resolved.success);
        assert_eq!(dictionary.get("zzqqxx").map(|e| e.hebrew), Some("זקק".to_string()));
    }
}
