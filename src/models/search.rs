//! SEARCH's result type.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::query::Confidence;
use super::source::{Source, SourceLevel};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SearchResult {
    pub original_query: String,
    pub hebrew_terms: Vec<String>,
    pub primary_ref: Option<String>,
    pub sources: Vec<Source>,
    /// Keyed by `SourceLevel::as_str()`, in canonical level order (insertion
    /// order, not sorted), so the HTTP contract stays stable regardless of
    /// the internal enum representation.
    pub sources_by_level: IndexMap<String, Vec<Source>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub sources_by_term: IndexMap<String, Vec<Source>>,
    pub total_sources: usize,
    pub levels_present: Vec<String>,
    pub interpretation: String,
    pub confidence: Confidence,
    pub needs_clarification: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clarification_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clarification_options: Vec<String>,
    pub message: String,
}

impl SearchResult {
    /// Groups `sources` by level, building `sources_by_level` and
    /// `levels_present` from scratch. Within a level, callers must have
    /// already sorted `sources` by (primary-ref adjacency, canonical ref) -
    /// this only partitions, it does not re-sort. Inserting in
    /// `SourceLevel::all()` order and then dropping empty levels keeps
    /// `sources_by_level` (and, from it, `levels_present`) in canonical
    /// display order for free - no separate re-sort needed.
    pub fn group_by_level(original_query: &str, hebrew_terms: Vec<String>, sources: Vec<Source>) -> Self {
        let mut by_level: IndexMap<String, Vec<Source>> = IndexMap::new();
        for level in SourceLevel::all() {
            by_level.insert(level.as_str().to_string(), Vec::new());
        }
        for source in &sources {
            by_level.entry(source.level.as_str().to_string()).or_default().push(source.clone());
        }
        by_level.retain(|_, v| !v.is_empty());

        let levels_present: Vec<String> = by_level.keys().cloned().collect();

        Self {
            original_query: original_query.to_string(),
            hebrew_terms,
            primary_ref: sources.first().map(|s| s.reference.clone()),
            total_sources: sources.len(),
            sources,
            sources_by_level: by_level,
            sources_by_term: IndexMap::new(),
            levels_present,
            interpretation: String::new(),
            confidence: Confidence::Medium,
            needs_clarification: false,
            query_id: None,
            clarification_prompt: None,
            clarification_options: Vec::new(),
            message: String::new(),
        }
    }

    pub fn empty_with_message(original_query: &str, message: impl Into<String>) -> Self {
        Self {
            original_query: original_query.to_string(),
            hebrew_terms: Vec::new(),
            primary_ref: None,
            sources: Vec::new(),
            sources_by_level: IndexMap::new(),
            sources_by_term: IndexMap::new(),
            total_sources: 0,
            levels_present: Vec::new(),
            interpretation: String::new(),
            confidence: Confidence::Low,
            needs_clarification: false,
            query_id: None,
            clarification_prompt: None,
            clarification_options: Vec::new(),
            message: message.into(),
        }
    }

    pub fn needing_clarification(
        original_query: &str,
        query_id: String,
        prompt: String,
        options: Vec<String>,
    ) -> Self {
        Self {
            needs_clarification: true,
            query_id: Some(query_id),
            clarification_prompt: Some(prompt),
            clarification_options: options,
            ..Self::empty_with_message(original_query, "clarification required")
        }
    }
}
