//! Ranking and depth-budget tables for SEARCH's LOCATE/TRICKLE phases
//! (§4.9 phases A and C).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Depth;

/// References to later codified works - phase A restricts its candidate
/// locations to these families (client-side, since `CorpusClient::search`
/// takes no `filters` argument; see DESIGN.md).
const CODIFIED_WORK_PREFIXES: &[&str] = &[
    "Shulchan Arukh",
    "Shulchan Aruch",
    "Tur,",
    "Tur ",
    "Beit Yosef",
    "Bach,",
    "Taz,",
    "Shach,",
    "Magen Avraham",
    "Mishnah Berurah",
    "Arukh HaShulchan",
];

pub fn is_codified_work_ref(reference: &str) -> bool {
    CODIFIED_WORK_PREFIXES.iter().any(|p| reference.starts_with(p))
}

/// Returns the tractate name embedded in `reference` (bare or underlying a
/// commentary ref, e.g. "Rashi on Bava Kamma 46a"), if any - shares the
/// corpus's hit-bucketing need for a per-tractate key.
pub fn tractate_of(reference: &str) -> Option<&'static str> {
    TALMUD_TRACTATES.iter().find(|t| reference.contains(*t)).copied()
}

/// The 36-ish tractates a citation-extraction regex needs to recognize.
/// Not exhaustive - a representative set covering the tractates the
/// corpus's sample data and this crate's own tests reference.
const TALMUD_TRACTATES: &[&str] = &[
    "Berakhot", "Shabbat", "Eruvin", "Pesachim", "Yoma", "Sukkah", "Beitzah", "Rosh Hashanah",
    "Taanit", "Megillah", "Moed Katan", "Chagigah", "Yevamot", "Ketubot", "Kesubot", "Nedarim",
    "Nazir", "Sotah", "Gittin", "Kiddushin", "Bava Kamma", "Bava Metzia", "Bava Batra",
    "Sanhedrin", "Makkot", "Shevuot", "Avodah Zarah", "Horayot", "Zevachim", "Menachot",
    "Chullin", "Bechorot", "Arachin", "Temurah", "Keritot", "Meilah", "Tamid", "Niddah",
];

static TALMUD_REF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let tractates = TALMUD_TRACTATES.join("|");
    Regex::new(&format!(r"(?:{tractates})\s+\d{{1,3}}[ab]?")).expect("static regex is valid")
});

/// Scans free text (a siman's Hebrew or English body) for embedded Talmud
/// citations, e.g. "Bava Kamma 46a", returning them deduplicated in
/// first-seen order.
pub fn extract_talmud_refs(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for m in TALMUD_REF_PATTERN.find_iter(text) {
        let found = m.as_str().to_string();
        if seen.insert(found.clone()) {
            out.push(found);
        }
    }
    out
}

/// Classical-source-priority weight used to rank candidate locations by
/// hit density without letting high-volume modern/commentary noise
/// dominate (§4.9 phase A): Talmud > Rishonim > codes > modern works.
pub fn classical_priority_weight(categories: &[String]) -> f64 {
    let lower: Vec<String> = categories.iter().map(|c| c.to_lowercase()).collect();
    if lower.iter().any(|c| c.contains("talmud")) {
        4.0
    } else if lower.iter().any(|c| c.contains("rishonim") || c.contains("commentary")) {
        3.0
    } else if lower.iter().any(|c| c.contains("halakhah") || c.contains("shulchan") || c.contains("codes")) {
        2.0
    } else {
        1.0
    }
}

/// Per-level fetch budget derived from `strategy.depth` (§4.9 phase C).
pub fn depth_cap(depth: Depth) -> usize {
    match depth {
        Depth::Basic => 3,
        Depth::Standard => 7,
        Depth::Deep => 15,
    }
}

/// `true` for a bare Talmud citation ("Bava Kamma 46a") as opposed to a
/// commentary-on-it ref ("Rashi on Bava Kamma 46a") - used by level
/// classification in phase D.
pub fn looks_like_bare_talmud_ref(reference: &str) -> bool {
    TALMUD_REF_PATTERN.is_match(reference) && !reference.contains(" on ")
}

const CHUMASH_BOOKS: &[&str] =
    &["Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Bereishit", "Shemot", "Vayikra", "Bamidbar", "Devarim"];

pub fn is_chumash_ref(reference: &str) -> bool {
    CHUMASH_BOOKS.iter().any(|b| reference.starts_with(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_talmud_refs_from_hebrew_adjacent_text() {
        let refs = extract_talmud_refs("this siman discusses Bava Kamma 46a and also Pesachim 2a at length");
        assert_eq!(refs, vec!["Bava Kamma 46a".to_string(), "Pesachim 2a".to_string()]);
    }

    #[test]
    fn dedups_repeated_citations() {
        let refs = extract_talmud_refs("Shabbat 73a ... later again Shabbat 73a");
        assert_eq!(refs, vec!["Shabbat 73a".to_string()]);
    }

    #[test]
    fn codified_prefix_check() {
        assert!(is_codified_work_ref("Shulchan Arukh, Orach Chaim 1:1"));
        assert!(!is_codified_work_ref("Bava Kamma 46a"));
    }

    #[test]
    fn depth_caps_match_spec() {
        assert_eq!(depth_cap(Depth::Basic), 3);
        assert_eq!(depth_cap(Depth::Standard), 7);
        assert_eq!(depth_cap(Depth::Deep), 15);
    }
}
