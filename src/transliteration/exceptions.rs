//! The one permitted non-rule-based path: a hand-curated map for short
//! tokens where rules genuinely cannot disambiguate (§4.3), grounded in
//! `transliteration_map.py`'s `MINIMAL_EXCEPTIONS` ("lo" = לא vs לו, "kol"
//! = כל vs "kal" = קל). Each entry picks the more common reading; the
//! Term Validator still re-ranks against the less common alternative when
//! it scores higher on corpus hits.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static EXCEPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("lo", "לא"),
        ("kol", "כל"),
        ("kal", "קל"),
        ("ki", "כי"),
        ("al", "על"),
        ("im", "אם"),
        ("od", "עוד"),
        ("yad", "יד"),
        ("av", "אב"),
        ("ben", "בן"),
        ("bo", "בו"),
        ("lah", "לה"),
    ])
});

pub fn lookup(word: &str) -> Option<&'static str> {
    EXCEPTIONS.get(word).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ambiguous_tokens_resolve() {
        assert_eq!(lookup("lo"), Some("לא"));
        assert_eq!(lookup("kol"), Some("כל"));
    }

    #[test]
    fn unknown_token_is_none() {
        assert_eq!(lookup("chezkas"), None);
    }
}
