//! Word Dictionary - a persistent, self-maintaining map from normalized
//! transliteration to confirmed Hebrew (§4.5), grounded in
//! `tools/word_dictionary.py`'s V2 `lookup_all` changelog.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

use crate::models::{DictionaryEntry, EntryProvenance};
use crate::utils::{ApiError, ApiResult};

/// One non-overlapping match `lookup_all` found inside a query.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryMatch {
    pub span: String,
    pub hebrew: String,
    pub confidence: f64,
}

/// Guards the in-memory map; writes are serialized through this mutex and
/// each rewrite snapshots the previous file first.
pub struct WordDictionary {
    path: PathBuf,
    backups_dir: PathBuf,
    entries: Mutex<HashMap<String, DictionaryEntry>>,
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").trim().to_lowercase()
}

impl WordDictionary {
    /// Loads `<data_dir>/word_dictionary.json` if present, otherwise starts empty.
    pub fn load(data_dir: impl AsRef<Path>) -> ApiResult<Self> {
        let data_dir = data_dir.as_ref();
        let path = data_dir.join("word_dictionary.json");
        let backups_dir = data_dir.join("backups");
        std::fs::create_dir_all(data_dir)?;

        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("word_dictionary.json is corrupt ({e}); starting from empty map");
                HashMap::new()
            })
        } else {
            HashMap::new()
        };

        Ok(Self { path, backups_dir, entries: Mutex::new(entries) })
    }

    /// An empty in-memory dictionary, never persisted - used in tests.
    pub fn in_memory() -> Self {
        Self { path: PathBuf::new(), backups_dir: PathBuf::new(), entries: Mutex::new(HashMap::new()) }
    }

    pub fn get(&self, transliteration: &str) -> Option<DictionaryEntry> {
        let key = normalize(transliteration);
        self.entries.lock().unwrap().get(&key).cloned()
    }

    /// Finds the longest non-overlapping sequence of known sub-phrases in
    /// `query`, scanning greedily left-to-right: at each position prefer
    /// the longest known phrase starting there before advancing.
    pub fn lookup_all(&self, query: &str) -> Vec<DictionaryMatch> {
        let words: Vec<&str> = query.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }
        let entries = self.entries.lock().unwrap();
        let mut matches = Vec::new();
        let mut i = 0;
        while i < words.len() {
            let mut matched = false;
            // Longest-match-first: try spans from the full remaining tail
            // down to a single word.
            for span_len in (1..=(words.len() - i)).rev() {
                let span = words[i..i + span_len].join(" ");
                let key = normalize(&span);
                if let Some(entry) = entries.get(&key) {
                    matches.push(DictionaryMatch {
                        span,
                        hebrew: entry.hebrew.clone(),
                        confidence: entry.confidence,
                    });
                    i += span_len;
                    matched = true;
                    break;
                }
            }
            if !matched {
                i += 1;
            }
        }
        matches
    }

    /// Inserts or updates an entry, incrementing `usage_count` on repeat
    /// confirmation. Persists immediately (snapshotting the previous file
    /// first) so concurrent requests observe the learned mapping.
    pub fn record(&self, transliteration: &str, hebrew: &str, source: EntryProvenance) -> ApiResult<()> {
        let key = normalize(transliteration);
        {
            let mut entries = self.entries.lock().unwrap();
            entries
                .entry(key)
                .and_modify(|e| {
                    e.hebrew = hebrew.to_string();
                    e.touch();
                })
                .or_insert_with(|| DictionaryEntry::new(hebrew, 0.9, source));
        }
        self.persist()
    }

    fn persist(&self) -> ApiResult<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(()); // in-memory instance, e.g. in tests
        }
        if self.path.exists() {
            std::fs::create_dir_all(&self.backups_dir)?;
            let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3f");
            let backup_path = self.backups_dir.join(format!("{stamp}.json"));
            std::fs::copy(&self.path, &backup_path)?;
        }
        let entries = self.entries.lock().unwrap();
        let json = serde_json::to_string_pretty(&*entries)
            .map_err(|e| ApiError::internal(format!("failed to serialize dictionary: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> WordDictionary {
        let dict = WordDictionary::in_memory();
        dict.entries.lock().unwrap().insert(
            "chezkas haguf".to_string(),
            DictionaryEntry::new("חזקת הגוף", 0.95, EntryProvenance::Manual),
        );
        dict.entries.lock().unwrap().insert(
            "chezkas mammon".to_string(),
            DictionaryEntry::new("חזקת ממון", 0.95, EntryProvenance::Manual),
        );
        dict
    }

    #[test]
    fn lookup_all_finds_longest_non_overlapping_spans() {
        let dict = seeded();
        let matches = dict.lookup_all("chezkas haguf vs chezkas mammon");
        let hebrews: Vec<&str> = matches.iter().map(|m| m.hebrew.as_str()).collect();
        assert_eq!(hebrews, vec!["חזקת הגוף", "חזקת ממון"]);
    }

    #[test]
    fn record_increments_usage_count_on_repeat() {
        let dict = WordDictionary::in_memory();
        dict.record("baal habayis", "בעל הבית", EntryProvenance::UserConfirmed).unwrap();
        dict.record("baal habayis", "בעל הבית", EntryProvenance::UserConfirmed).unwrap();
        let entry = dict.get("baal habayis").unwrap();
        assert_eq!(entry.usage_count, 2);
    }

    #[test]
    fn unmatched_words_are_skipped_not_fatal() {
        let dict = seeded();
        let matches = dict.lookup_all("please find chezkas haguf for me");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].hebrew, "חזקת הגוף");
    }
}
