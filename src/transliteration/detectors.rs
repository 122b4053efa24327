//! The seven independent pattern detectors (§4.3). Each is a pure
//! function over a normalized word; `fire_all` just concatenates their
//! output, in the order the spec lists them, so rank ties break in a
//! stable, reproducible order.

use crate::models::Pattern;

/// Leading particles mapped to the Hebrew prefix letter they contract to.
pub const PREFIX_MAP: &[(&str, char)] = &[
    ("sh", 'ש'),
    ("b", 'ב'),
    ("l", 'ל'),
    ("m", 'מ'),
    ("k", 'כ'),
    ("h", 'ה'),
    ("v", 'ו'),
];

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u'];

fn is_vowel(c: char) -> bool {
    VOWELS.contains(&c)
}

/// Double-vowel runs, or a word-initial vowel, most commonly reflect ע.
pub fn ayin_patterns(word: &str) -> Vec<Pattern> {
    let mut out = Vec::new();

    let mut iter = word.char_indices().peekable();
    while let Some((idx, c)) = iter.next() {
        if let Some(&(_, next_c)) = iter.peek()
            && c == next_c
            && is_vowel(c)
        {
            out.push(Pattern { detector: "ayin", position: idx, length: c.len_utf8(), hebrew_letter: 'ע', confidence: 0.55 });
        }
    }

    if let Some(first) = word.chars().next()
        && is_vowel(first)
    {
        out.push(Pattern { detector: "ayin", position: 0, length: first.len_utf8(), hebrew_letter: 'ע', confidence: 0.45 });
    }
    out
}

/// A terminal vowel (or bare "-a") often reflects an Aramaic א ending.
pub fn aramaic_ending(word: &str) -> Vec<Pattern> {
    let mut out = Vec::new();
    if let Some(last) = word.chars().last()
        && is_vowel(last)
        && word.chars().count() > 2
    {
        let position = word.len() - last.len_utf8();
        out.push(Pattern { detector: "aramaic-ending", position, length: last.len_utf8(), hebrew_letter: 'א', confidence: 0.5 });
    }
    out
}

/// A terminal "s" in yeshivish orthography often reflects smichut ת.
pub fn smichut_tav(word: &str) -> Vec<Pattern> {
    let mut out = Vec::new();
    if word.ends_with('s') && !word.ends_with("ss") && word.chars().count() > 3 {
        out.push(Pattern { detector: "smichut-tav", position: word.len() - 1, length: 1, hebrew_letter: 'ת', confidence: 0.45 });
    }
    out
}

/// A terminal "a" often reflects a feminine ה ending.
pub fn feminine_hey(word: &str) -> Vec<Pattern> {
    let mut out = Vec::new();
    if word.ends_with('a') && word.chars().count() > 2 {
        out.push(Pattern { detector: "feminine-hey", position: word.len() - 1, length: 1, hebrew_letter: 'ה', confidence: 0.6 });
    }
    out
}

/// A terminal "v" often reflects a final ב.
pub fn final_bet(word: &str) -> Vec<Pattern> {
    let mut out = Vec::new();
    if word.ends_with('v') {
        out.push(Pattern { detector: "final-bet", position: word.len() - 1, length: 1, hebrew_letter: 'ב', confidence: 0.5 });
    }
    out
}

/// Doubled consonants often reflect a dageshed letter.
pub fn double_consonants(word: &str) -> Vec<Pattern> {
    const DAGESH: &[(char, char)] =
        &[('m', 'מ'), ('n', 'נ'), ('l', 'ל'), ('t', 'ת'), ('k', 'כ'), ('p', 'פ')];
    let mut out = Vec::new();
    let chars: Vec<char> = word.chars().collect();
    let mut byte_offsets = Vec::with_capacity(chars.len());
    let mut offset = 0usize;
    for c in &chars {
        byte_offsets.push(offset);
        offset += c.len_utf8();
    }
    for i in 0..chars.len().saturating_sub(1) {
        if chars[i] == chars[i + 1]
            && !is_vowel(chars[i])
            && let Some((_, hebrew)) = DAGESH.iter().find(|(c, _)| *c == chars[i])
        {
            out.push(Pattern {
                detector: "double-consonant",
                position: byte_offsets[i],
                length: chars[i].len_utf8() * 2,
                hebrew_letter: *hebrew,
                confidence: 0.5,
            });
        }
    }
    out
}

/// Leading particles (b-, l-, m-, k-, sh-, h-, v-) mapped to their Hebrew
/// prefix. Longest prefix match wins (`sh` before `s`-anything else).
pub fn prefix_split(word: &str) -> Vec<Pattern> {
    let mut out = Vec::new();
    for (prefix, hebrew) in PREFIX_MAP {
        if word.starts_with(prefix) && word.len() > prefix.len() + 1 {
            out.push(Pattern {
                detector: "prefix-split",
                position: 0,
                length: prefix.len(),
                hebrew_letter: *hebrew,
                confidence: 0.4,
            });
            break; // longest/first match in PREFIX_MAP order only
        }
    }
    out
}

pub fn fire_all(word: &str) -> Vec<Pattern> {
    let mut patterns = Vec::new();
    patterns.extend(ayin_patterns(word));
    patterns.extend(aramaic_ending(word));
    patterns.extend(smichut_tav(word));
    patterns.extend(feminine_hey(word));
    patterns.extend(final_bet(word));
    patterns.extend(double_consonants(word));
    patterns.extend(prefix_split(word));
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feminine_hey_fires_on_terminal_a() {
        let patterns = feminine_hey("chasa");
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].hebrew_letter, 'ה');
    }

    #[test]
    fn smichut_tav_skips_double_s() {
        assert!(smichut_tav("chaburas").len() == 1);
        assert!(smichut_tav("class").is_empty());
    }

    #[test]
    fn prefix_split_prefers_sh_over_s() {
        let patterns = prefix_split("shabbos");
        assert_eq!(patterns[0].length, 2);
        assert_eq!(patterns[0].hebrew_letter, 'ש');
    }

    #[test]
    fn double_consonants_detects_dagesh_candidate() {
        let patterns = double_consonants("mishnah");
        assert!(patterns.is_empty()); // no doubled consonant here
        let patterns = double_consonants("hallel");
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].hebrew_letter, 'ל');
    }
}
