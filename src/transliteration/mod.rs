//! Transliteration Rules - a purely rule-based engine that turns a
//! normalized Latin-script word into ranked candidate Hebrew strings
//! (§4.3). "Rules, not exceptions": the only hand-curated data is the
//! small exception map for truly ambiguous short tokens
//! (`tools/transliteration_map.py`'s `MINIMAL_EXCEPTIONS`).

mod detectors;
mod exceptions;

pub use detectors::PREFIX_MAP;

use crate::models::{Pattern, Variant};

/// Normalizes raw input the way every caller expects it: lower-cased,
/// whitespace-collapsed.
pub fn normalize_input(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Runs every detector over `word`, combines compatible patterns into a
/// Cartesian product of candidate Hebrew strings, ranks by the product of
/// contributing confidences, and returns the top `max_variants` (best
/// first). Exception-map hits are prepended with confidence 1.0 before
/// rule-based candidates, since the Term Validator, not this engine, makes
/// the final call.
pub fn generate_variants(word: &str, max_variants: usize) -> Vec<Variant> {
    let word = word.trim().to_lowercase();
    if word.is_empty() {
        return Vec::new();
    }

    let mut variants = Vec::new();
    if let Some(hebrew) = exceptions::lookup(&word) {
        variants.push(Variant {
            hebrew: hebrew.to_string(),
            rules_fired: vec!["exception"],
            confidence: 1.0,
            from_exception: true,
        });
    }

    let patterns = detectors::fire_all(&word);
    let combined = combine(&word, &patterns);
    variants.extend(combined);

    variants.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
    variants.dedup_by(|a, b| a.hebrew == b.hebrew);
    variants.truncate(max_variants.max(1));
    variants
}

/// Combines fired patterns into a ranked list of whole-word Hebrew
/// candidates. Patterns are grouped by their target position; positions
/// with more than one candidate letter fan out into a Cartesian product,
/// bounded implicitly by the small number of positions a short word has.
fn combine(word: &str, patterns: &[Pattern]) -> Vec<Variant> {
    if patterns.is_empty() {
        return Vec::new();
    }

    // Group patterns that touch the same position - these are alternatives
    // for that slot - while patterns at disjoint positions compose.
    let mut by_position: Vec<(usize, Vec<&Pattern>)> = Vec::new();
    for pattern in patterns {
        match by_position.iter_mut().find(|(pos, _)| *pos == pattern.position) {
            Some((_, group)) => group.push(pattern),
            None => by_position.push((pattern.position, vec![pattern])),
        }
    }
    by_position.sort_by_key(|(pos, _)| *pos);

    // Cartesian product across position-groups.
    let mut combos: Vec<(String, f64, Vec<&'static str>)> = vec![(String::new(), 1.0, Vec::new())];
    let mut cursor = 0usize;
    for (pos, group) in &by_position {
        if *pos > cursor {
            combos = combos
                .into_iter()
                .map(|(mut s, conf, fired)| {
                    s.push_str(&word[cursor..*pos]);
                    (s, conf, fired)
                })
                .collect();
        }
        let mut next = Vec::with_capacity(combos.len() * group.len());
        for (prefix, conf, fired) in &combos {
            for pattern in group {
                let mut s = prefix.clone();
                s.push(pattern.hebrew_letter);
                let mut fired = fired.clone();
                fired.push(pattern.detector);
                next.push((s, conf * pattern.confidence, fired));
            }
        }
        combos = next;
        cursor = pos + group[0].length;
    }
    if cursor < word.len() {
        combos = combos
            .into_iter()
            .map(|(mut s, conf, fired)| {
                s.push_str(&word[cursor..]);
                (s, conf, fired)
            })
            .collect();
    }

    combos
        .into_iter()
        .map(|(hebrew, confidence, rules_fired)| Variant {
            hebrew,
            rules_fired,
            confidence,
            from_exception: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feminine_hey_terminal_a_produces_heh_candidate() {
        let variants = generate_variants("chasa", 15);
        assert!(variants.iter().any(|v| v.hebrew.ends_with('ה')));
    }

    #[test]
    fn exception_map_entry_is_confidence_one_and_first() {
        let variants = generate_variants("lo", 15);
        assert!(variants[0].from_exception);
        assert_eq!(variants[0].confidence, 1.0);
    }

    #[test]
    fn variants_are_ranked_best_first() {
        let variants = generate_variants("baal", 15);
        for window in variants.windows(2) {
            assert!(window[0].confidence >= window[1].confidence);
        }
    }

    #[test]
    fn max_variants_is_respected() {
        let variants = generate_variants("mishpacha", 3);
        assert!(variants.len() <= 3);
    }
}
