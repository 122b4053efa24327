//! Clarification store - holds suspended pipeline state across HTTP turns
//! so a client can resume DECIPHER or SEARCH after answering a disambiguation
//! question (§4.7 step 4, §4.9 "Clarification loop"), keyed by a
//! server-generated `query_id` with a TTL sweep on every access.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

/// Which stage suspended, and what it needs back to resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClarificationKind {
    /// DECIPHER is waiting on `{original_query, selection_index, selected_hebrew}`.
    Decipher,
    /// SEARCH's phase-A locate step is waiting on a chosen anchor ref.
    SearchLocate,
}

#[derive(Debug, Clone)]
pub struct PendingClarification {
    pub kind: ClarificationKind,
    pub original_query: String,
    /// Stage-specific resume context (candidate anchor refs for SEARCH,
    /// the in-flight word validations for DECIPHER) - kept generic so this
    /// store doesn't need to know either stage's concrete types.
    pub context: serde_json::Value,
    created_at: Instant,
}

/// TTL-bounded, concurrent map from `query_id` to suspended state.
pub struct ClarificationStore {
    entries: DashMap<String, PendingClarification>,
    ttl: Duration,
}

impl ClarificationStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self { entries: DashMap::new(), ttl: Duration::from_secs((ttl_minutes.max(1) as u64) * 60) }
    }

    /// Suspends pipeline state and returns the `query_id` the client must
    /// echo back to resume.
    pub fn suspend(&self, kind: ClarificationKind, original_query: &str, context: serde_json::Value) -> String {
        let query_id = Uuid::new_v4().to_string();
        self.entries.insert(
            query_id.clone(),
            PendingClarification {
                kind,
                original_query: original_query.to_string(),
                context,
                created_at: Instant::now(),
            },
        );
        query_id
    }

    /// Removes and returns the suspended state for `query_id`, provided it
    /// has not expired. An expired or unknown id returns `None`.
    pub fn take(&self, query_id: &str) -> Option<PendingClarification> {
        let (_, pending) = self.entries.remove(query_id)?;
        if pending.created_at.elapsed() > self.ttl { None } else { Some(pending) }
    }

    /// Drops every expired entry; intended to run on a periodic timer.
    pub fn sweep_expired(&self) -> u64 {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, pending| pending.created_at.elapsed() <= ttl);
        (before - self.entries.len()) as u64
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn suspend_then_take_round_trips() {
        let store = ClarificationStore::new(30);
        let id = store.suspend(ClarificationKind::Decipher, "chezkas haguf", json!({"candidates": ["a", "b"]}));
        let pending = store.take(&id).unwrap();
        assert_eq!(pending.original_query, "chezkas haguf");
        assert_eq!(pending.kind, ClarificationKind::Decipher);
    }

    #[test]
    fn take_is_single_use() {
        let store = ClarificationStore::new(30);
        let id = store.suspend(ClarificationKind::SearchLocate, "q", json!(null));
        assert!(store.take(&id).is_some());
        assert!(store.take(&id).is_none());
    }

    #[test]
    fn unknown_id_returns_none() {
        let store = ClarificationStore::new(30);
        assert!(store.take("not-a-real-id").is_none());
    }
}
