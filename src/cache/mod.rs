//! Two-tier file cache.
//!
//! Two named instances are constructed at startup: corpus texts (TTL ~30
//! days, because the corpus is effectively immutable) and LLM responses
//! (TTL ~24h). Concurrent writers never observe a half-written entry -
//! `set` writes to a temp file in the same directory and renames into
//! place, which is atomic on the filesystems this service targets.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Duration;
use serde::{Serialize, de::DeserializeOwned};
use tokio::fs;

use crate::models::{CacheEntry, CacheStats};
use crate::utils::fingerprint;

#[async_trait]
pub trait Cache<T>: Send + Sync
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn get(&self, key: &str) -> Option<T>;
    async fn set(&self, key: &str, value: &T);
    async fn clear(&self) -> u64;
    fn stats(&self) -> CacheStats;
}

/// File-backed cache with TTL eviction on read and corrupt-entry eviction.
pub struct FileCache {
    dir: PathBuf,
    ttl: Duration,
    name: &'static str,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
    saves: AtomicU64,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration, name: &'static str, enabled: bool) -> Self {
        let dir = dir.into();
        if enabled {
            if let Err(e) = std::fs::create_dir_all(&dir) {
                tracing::warn!("failed to create cache dir {}: {e}", dir.display());
            }
        }
        tracing::info!(
            "cache '{}' initialized at {} (ttl={}h, enabled={})",
            name,
            dir.display(),
            ttl.num_hours(),
            enabled
        );
        Self { dir, ttl, name, enabled, hits: AtomicU64::new(0), misses: AtomicU64::new(0), saves: AtomicU64::new(0) }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", fingerprint(key)))
    }
}

#[async_trait]
impl<T> Cache<T> for FileCache
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn get(&self, key: &str) -> Option<T> {
        if !self.enabled {
            return None;
        }
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            },
        };

        let parsed: Result<CacheEntry<T>, _> = serde_json::from_str(&raw);
        match parsed {
            Ok(entry) if !entry.is_expired(self.ttl) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("[{}] HIT: {}", self.name, entry.key_preview);
                Some(entry.data)
            },
            Ok(_) => {
                tracing::debug!("[{}] EXPIRED: {}", self.name, key);
                let _ = fs::remove_file(&path).await;
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            },
            Err(e) => {
                tracing::warn!("[{}] corrupted cache entry, evicting: {e}", self.name);
                let _ = fs::remove_file(&path).await;
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            },
        }
    }

    async fn set(&self, key: &str, value: &T) {
        if !self.enabled {
            return;
        }
        let entry = CacheEntry::new(key, value);
        let json = match serde_json::to_string_pretty(&entry) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!("[{}] failed to serialize cache entry: {e}", self.name);
                return;
            },
        };

        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp_path, json).await {
            tracing::error!("[{}] failed to write cache temp file: {e}", self.name);
            return;
        }
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            tracing::error!("[{}] failed to rename cache temp file: {e}", self.name);
            return;
        }
        self.saves.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("[{}] SAVED: {}", self.name, key);
    }

    async fn clear(&self) -> u64 {
        let mut count = 0u64;
        if let Ok(mut entries) = fs::read_dir(&self.dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("json")
                    && fs::remove_file(&path).await.is_ok()
                {
                    count += 1;
                }
            }
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.saves.store(0, Ordering::Relaxed);
        tracing::info!("[{}] cleared {} cache files", self.name, count);
        count
    }

    fn stats(&self) -> CacheStats {
        let entries = std::fs::read_dir(&self.dir)
            .map(|rd| rd.filter_map(Result::ok).filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("json")).count() as u64)
            .unwrap_or(0);
        let bytes = std::fs::read_dir(&self.dir)
            .map(|rd| {
                rd.filter_map(Result::ok)
                    .filter_map(|e| e.metadata().ok())
                    .map(|m| m.len())
                    .sum()
            })
            .unwrap_or(0);
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            saves: self.saves.load(Ordering::Relaxed),
            entries,
            bytes,
        }
    }
}

/// No-op cache used when caching is disabled entirely, so call sites never
/// branch on an `enabled` flag themselves.
pub struct NullCache;

#[async_trait]
impl<T> Cache<T> for NullCache
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn get(&self, _key: &str) -> Option<T> {
        None
    }

    async fn set(&self, _key: &str, _value: &T) {}

    async fn clear(&self) -> u64 {
        0
    }

    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

pub fn corpus_cache_dir(base: &Path) -> PathBuf {
    base.join("corpus")
}

pub fn llm_cache_dir(base: &Path) -> PathBuf {
    base.join("llm")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Payload {
        value: String,
    }

    #[tokio::test]
    async fn round_trip_within_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::hours(1), "test", true);
        let payload = Payload { value: "hello".to_string() };
        cache.set("key-a", &payload).await;
        let got: Option<Payload> = cache.get("key-a").await;
        assert_eq!(got, Some(payload));
    }

    #[tokio::test]
    async fn expired_entry_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::seconds(-1), "test", true);
        let payload = Payload { value: "stale".to_string() };
        cache.set("key-b", &payload).await;
        let got: Option<Payload> = cache.get("key-b").await;
        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn disabled_cache_never_stores() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::hours(1), "test", false);
        cache.set("key-c", &Payload { value: "x".to_string() }).await;
        let got: Option<Payload> = cache.get("key-c").await;
        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn corrupt_entry_is_evicted() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::hours(1), "test", true);
        let path = cache.path_for("key-d");
        tokio::fs::write(&path, "not json").await.unwrap();
        let got: Option<Payload> = cache.get("key-d").await;
        assert_eq!(got, None);
        assert!(!path.exists());
    }
}
