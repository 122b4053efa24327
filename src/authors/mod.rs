//! Authors KB - the static catalog of rabbinic authors, their works,
//! acronyms and canonical corpus reference patterns (§4.6).
//!
//! Built once, behind a `Lazy`, and never mutated after init - safe to
//! share across requests without a lock, matching DESIGN NOTES §9's
//! "Authors KB is immutable post-load" instruction.

mod data;

use std::collections::HashMap;

use once_cell::sync::Lazy;

pub use data::AuthorEra;
use data::AUTHOR_CATALOG;

use crate::models::SourceLevel;

/// A single catalog entry: one author, their works and how to recognize them.
#[derive(Debug, Clone)]
pub struct Author {
    pub key: &'static str,
    pub primary_name_he: &'static str,
    pub variations: &'static [&'static str],
    pub era: AuthorEra,
    pub region: &'static str,
    pub works: &'static [&'static str],
    pub level: SourceLevel,
    /// `{}` is substituted with the base tractate+daf ref, e.g. `"Rashi on {}"`.
    pub ref_pattern: &'static str,
}

/// Normalizes a surface form the same way everywhere it's compared:
/// lowercase, trim, collapse internal whitespace, strip the punctuation
/// Hebrew acronyms carry (גרשיים / geresh / quote marks).
pub fn normalize_token(token: &str) -> String {
    let stripped: String = token
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '\u{05F3}' | '\u{05F4}' | '.' | '\u{2019}' | '\u{201C}' | '\u{201D}'))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ").trim().to_lowercase()
}

struct AuthorsKb {
    /// Reverse lookup: normalized surface form -> author key. Built once
    /// with a dedup pass so one surface form never maps to two authors
    /// (the "FIXES APPLIED" invariant carried from the source catalog).
    lookup: HashMap<String, &'static str>,
    by_key: HashMap<&'static str, &'static Author>,
}

impl AuthorsKb {
    fn build() -> Self {
        let mut lookup: HashMap<String, &'static str> = HashMap::new();
        let mut collisions: Vec<(String, &'static str, &'static str)> = Vec::new();
        let mut by_key = HashMap::new();

        for author in AUTHOR_CATALOG.iter() {
            by_key.insert(author.key, author);
            let mut surface_forms: Vec<&'static str> = vec![author.primary_name_he];
            surface_forms.extend(author.variations.iter().copied());
            for form in surface_forms {
                let normalized = normalize_token(form);
                if normalized.is_empty() {
                    continue;
                }
                match lookup.get(normalized.as_str()) {
                    Some(existing) if *existing != author.key => {
                        collisions.push((normalized.clone(), existing, author.key));
                    },
                    _ => {
                        lookup.insert(normalized, author.key);
                    },
                }
            }
        }

        for (form, first, second) in &collisions {
            tracing::warn!(
                "authors KB: surface form {form:?} matches both {first} and {second}; keeping {first}"
            );
        }

        Self { lookup, by_key }
    }
}

static KB: Lazy<AuthorsKb> = Lazy::new(AuthorsKb::build);

/// `true` iff `token` (in any known surface form) names a catalogued author.
pub fn is_author(token: &str) -> bool {
    KB.lookup.contains_key(&normalize_token(token))
}

/// The single author key a surface form resolves to, if any.
pub fn matches(token: &str) -> Option<&'static str> {
    KB.lookup.get(&normalize_token(token)).copied()
}

/// Disambiguates an ambiguous token using surrounding context words; falls
/// back to the plain surface-form match when context does not narrow it
/// further (the catalog is already deduplicated, so most tokens never reach
/// the ambiguous path).
pub fn disambiguate(token: &str, context: &[&str]) -> Option<&'static str> {
    if let Some(key) = matches(token) {
        return Some(key);
    }
    // No direct match: see whether a context word names a work uniquely
    // associated with one author (e.g. "rashi" elsewhere in the query).
    for word in context {
        if let Some(key) = matches(word) {
            return Some(key);
        }
    }
    None
}

pub fn author(key: &str) -> Option<&'static Author> {
    KB.by_key.get(key).copied()
}

/// Builds a canonical corpus reference for `author_key` over `base_ref`
/// (e.g. `corpus_ref("rashi", "Pesachim 4b") == "Rashi on Pesachim 4b"`).
pub fn corpus_ref(author_key: &str, base_ref: &str) -> Option<String> {
    author(author_key).map(|a| a.ref_pattern.replace("{}", base_ref))
}

/// Scans free text token-by-token and returns every author key detected,
/// in first-seen order, deduplicated.
pub fn detect_in_text(text: &str) -> Vec<&'static str> {
    let mut found = Vec::new();
    for raw_token in text.split_whitespace() {
        if let Some(key) = matches(raw_token)
            && !found.contains(&key)
        {
            found.push(key);
        }
    }
    found
}

/// The default set of author keys to prefer at a given level when
/// `strategy.target_authors` is empty (§4.9 phase C).
pub fn default_authors_for_level(level: SourceLevel) -> Vec<&'static str> {
    AUTHOR_CATALOG.iter().filter(|a| a.level == level).map(|a| a.key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rashi_acronym_and_variations_resolve_to_one_key() {
        assert_eq!(matches("rashi"), Some("rashi"));
        assert_eq!(matches("Rashi"), Some("rashi"));
        assert_eq!(matches("רש\"י"), Some("rashi"));
    }

    #[test]
    fn unknown_token_is_not_an_author() {
        assert!(!is_author("chezkas"));
        assert_eq!(matches("chezkas"), None);
    }

    #[test]
    fn reverse_lookup_never_maps_one_surface_form_to_two_authors() {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for author in AUTHOR_CATALOG.iter() {
            let mut forms: Vec<&str> = vec![author.primary_name_he];
            forms.extend(author.variations.iter().copied());
            for form in forms {
                let normalized = normalize_token(form);
                if normalized.is_empty() {
                    continue;
                }
                if let Some(existing) = seen.get(normalized.as_str()) {
                    assert_eq!(
                        *existing, author.key,
                        "surface form {normalized:?} claimed by both {existing} and {}",
                        author.key
                    );
                } else {
                    seen.insert(normalized, author.key);
                }
            }
        }
    }

    #[test]
    fn corpus_ref_substitutes_base_ref() {
        assert_eq!(corpus_ref("rashi", "Pesachim 4b").as_deref(), Some("Rashi on Pesachim 4b"));
    }

    #[test]
    fn detect_in_text_finds_author_tokens_only() {
        let found = detect_in_text("show me rashi and tosfos on this sugya");
        assert!(found.contains(&"rashi"));
        assert!(found.contains(&"tosfos"));
        assert!(!found.contains(&"sugya"));
    }
}
