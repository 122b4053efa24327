//! The known-sugyos table (§4.8 step 1): a static catalog of topics the
//! pipeline already knows how to answer without spending an LLM call.
//! Grounded in `known_sugyos.py`'s topic -> {refs, terms, importance} map.

use once_cell::sync::Lazy;

use crate::models::{Confidence, Importance};

pub struct KnownSugya {
    pub topic_key: &'static str,
    pub primary_refs: &'static [&'static str],
    /// Hebrew terms that, if present verbatim in `hebrew_terms`, match this entry.
    pub key_terms: &'static [&'static str],
    /// Latin transliteration phrases; every word must appear as a whole,
    /// contiguous run of tokens in the normalized query (§8 word-boundary
    /// invariant) - never a raw substring check.
    pub transliteration_keys: &'static [&'static str],
    pub target_authors: &'static [&'static str],
    pub importance: Importance,
    pub confidence: Confidence,
}

pub static KNOWN_SUGYOS: Lazy<Vec<KnownSugya>> = Lazy::new(|| {
    vec![
        KnownSugya {
            topic_key: "chazakas_haguf",
            primary_refs: &["Kesubot 12b", "Bava Batra 92b"],
            key_terms: &["חזקת הגוף"],
            transliteration_keys: &["chezkas haguf", "chazakas haguf", "chezkat haguf"],
            target_authors: &["rashi", "tosafos", "rambam"],
            importance: Importance::Critical,
            confidence: Confidence::High,
        },
        KnownSugya {
            topic_key: "chezkas_mammon",
            primary_refs: &["Bava Kamma 46a"],
            key_terms: &["חזקת ממון"],
            transliteration_keys: &["chezkas mammon", "chazakas mammon"],
            target_authors: &["rashi", "tosafos"],
            importance: Importance::Critical,
            confidence: Confidence::High,
        },
        KnownSugya {
            topic_key: "muktzeh",
            primary_refs: &["Shabbat 123a", "Beitzah 2a"],
            key_terms: &["מוקצה"],
            transliteration_keys: &["muktzah", "muktzeh"],
            target_authors: &["rashi", "tosafos", "shulchan_aruch"],
            importance: Importance::Important,
            confidence: Confidence::High,
        },
        // Deliberately NOT "mukas etz" - a regression fixture (§8 scenario 3):
        // "bedikas chometz" must never match this entry via substring bleed
        // across the "mukas" / "mu[k]" prefix the two queries happen to share.
        KnownSugya {
            topic_key: "mukas_etz",
            primary_refs: &["Chullin 51a"],
            key_terms: &["מוכה עץ"],
            transliteration_keys: &["mukas etz", "mukeh etz"],
            target_authors: &["rashi", "tosafos"],
            importance: Importance::Related,
            confidence: Confidence::Medium,
        },
        KnownSugya {
            topic_key: "bedikas_chametz",
            primary_refs: &["Pesachim 2a"],
            key_terms: &["בדיקת חמץ"],
            transliteration_keys: &["bedikas chometz", "bedikat chametz", "bedikas chametz"],
            target_authors: &["rashi", "tosafos", "shulchan_aruch"],
            importance: Importance::Critical,
            confidence: Confidence::High,
        },
        KnownSugya {
            topic_key: "kinyan_chalipin",
            primary_refs: &["Kiddushin 1b", "Bava Metzia 47a"],
            key_terms: &["קנין חליפין"],
            transliteration_keys: &["kinyan chalipin", "kinyan chalifin"],
            target_authors: &["rashi", "tosafos", "rambam"],
            importance: Importance::Important,
            confidence: Confidence::High,
        },
        KnownSugya {
            topic_key: "borer",
            primary_refs: &["Shabbat 73a", "Shabbat 74a"],
            key_terms: &["בורר"],
            transliteration_keys: &["borer"],
            target_authors: &["rashi", "tosafos", "shulchan_aruch"],
            importance: Importance::Important,
            confidence: Confidence::High,
        },
    ]
});

/// Lower-cases, strips punctuation, and splits on whitespace - the same
/// normalization every comparison in this module uses.
fn tokenize(s: &str) -> Vec<String> {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// `true` iff `key`'s words appear as a contiguous, whole-token run inside
/// `query_tokens` - the word-boundary-safe check §8 requires.
fn contains_whole_tokens(query_tokens: &[String], key: &str) -> bool {
    let key_tokens = tokenize(key);
    if key_tokens.is_empty() || key_tokens.len() > query_tokens.len() {
        return false;
    }
    query_tokens.windows(key_tokens.len()).any(|w| w == key_tokens.as_slice())
}

/// Matches a query against the known-sugyos table (§4.8 step 1). A match
/// requires either an exact Hebrew term overlap with `hebrew_terms`, or the
/// normalized query containing one of the entry's transliteration keys as
/// whole tokens.
pub fn find_match(query: &str, hebrew_terms: &[String]) -> Option<&'static KnownSugya> {
    let query_tokens = tokenize(query);
    KNOWN_SUGYOS.iter().find(|entry| {
        entry.key_terms.iter().any(|t| hebrew_terms.iter().any(|h| h == t))
            || entry.transliteration_keys.iter().any(|k| contains_whole_tokens(&query_tokens, k))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chezkas_haguf_matches_via_transliteration() {
        let found = find_match("chezkas haguf", &[]);
        assert_eq!(found.map(|e| e.topic_key), Some("chazakas_haguf"));
    }

    #[test]
    fn chezkas_haguf_matches_via_hebrew_term() {
        let found = find_match("some other wording", &["חזקת הגוף".to_string()]);
        assert_eq!(found.map(|e| e.topic_key), Some("chazakas_haguf"));
    }

    #[test]
    fn bedikas_chometz_never_matches_mukas_etz() {
        let found = find_match("bedikas chometz", &[]);
        assert_ne!(found.map(|e| e.topic_key), Some("mukas_etz"));
    }

    #[test]
    fn substring_bleed_is_rejected() {
        // "mukas" is a prefix of neither transliteration key's tokens once
        // word-boundary tokenized, so a naive substring scan would be the
        // only way this could ever false-positive.
        assert!(!contains_whole_tokens(&tokenize("mukaswhatever etz"), "mukas etz"));
    }
}
