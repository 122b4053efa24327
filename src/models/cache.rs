//! Cache entry envelope and aggregate stats, shared by both cache instances.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CacheEntry<T> {
    pub timestamp: DateTime<Utc>,
    /// First ~60 chars of the key, kept only for debugging/log readability.
    pub key_preview: String,
    pub data: T,
}

impl<T> CacheEntry<T> {
    pub fn new(key: &str, data: T) -> Self {
        let key_preview = key.chars().take(60).collect();
        Self { timestamp: Utc::now(), key_preview, data }
    }

    pub fn is_expired(&self, ttl: chrono::Duration) -> bool {
        Utc::now() - self.timestamp > ttl
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub saves: u64,
    pub entries: u64,
    pub bytes: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
