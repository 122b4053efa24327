//! Concrete `CorpusClient` talking to a Sefaria-shaped HTTP API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::cache::Cache;
use crate::utils::{ApiError, ApiResult};

use super::types::*;
use super::CorpusClient;

pub struct SefariaCorpusClient {
    http_client: Client,
    base_url: String,
    max_retries: u32,
    cache: Arc<dyn Cache<serde_json::Value>>,
}

impl SefariaCorpusClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout_secs: u64,
        max_retries: u32,
        cache: Arc<dyn Cache<serde_json::Value>>,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("failed to build tuned HTTP client ({e}), using default");
                Client::new()
            });
        Self { http_client, base_url: base_url.into(), max_retries, cache }
    }

    async fn get_with_retry(&self, url: &str) -> ApiResult<serde_json::Value> {
        let mut attempt = 0;
        loop {
            let result = self.http_client.get(url).send().await;
            match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<serde_json::Value>()
                            .await
                            .map_err(|e| ApiError::internal(format!("failed to parse corpus response: {e}")));
                    }
                    if status.as_u16() == 404 {
                        return Err(ApiError::not_found(format!("corpus returned 404 for {url}")));
                    }
                    if status.is_client_error() {
                        return Err(ApiError::bad_input(format!("corpus rejected request: {status}")));
                    }
                    // 5xx: fall through to retry below.
                    if attempt >= self.max_retries {
                        return Err(ApiError::transient(format!(
                            "corpus returned {status} after {attempt} retries"
                        )));
                    }
                },
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(ApiError::transient(format!("corpus request failed: {e}")));
                    }
                },
            }
            let backoff_ms = 200u64 * 2u64.pow(attempt);
            let jitter_ms = (std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.subsec_millis())
                .unwrap_or(0)
                % 50) as u64;
            tokio::time::sleep(Duration::from_millis(backoff_ms + jitter_ms)).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl CorpusClient for SefariaCorpusClient {
    async fn search(&self, hebrew_term: &str, size: usize) -> ApiResult<SearchResponse> {
        let cache_key = format!("search:{hebrew_term}:{size}");
        if let Some(cached) = self.cache.get(&cache_key).await {
            if let Ok(raw) = serde_json::from_value::<RawSearchResponse>(cached) {
                return Ok(into_search_response(raw));
            }
        }

        let url = format!(
            "{}/search-wrapper?query={}&type=text&size={}",
            self.base_url.trim_end_matches('/'),
            urlencode(hebrew_term),
            size
        );
        let raw_value = self.get_with_retry(&url).await?;
        self.cache.set(&cache_key, &raw_value).await;

        let raw: RawSearchResponse = serde_json::from_value(raw_value)
            .map_err(|e| ApiError::internal(format!("malformed corpus search response: {e}")))?;
        Ok(into_search_response(raw))
    }

    async fn get_text(&self, reference: &str) -> ApiResult<TextResponse> {
        let cache_key = format!("text:{reference}");
        if let Some(cached) = self.cache.get(&cache_key).await {
            if let Ok(raw) = serde_json::from_value::<RawTextResponse>(cached) {
                return Ok(into_text_response(raw));
            }
        }

        let url = format!("{}/texts/{}", self.base_url.trim_end_matches('/'), urlencode(reference));
        let raw_value = self.get_with_retry(&url).await?;
        self.cache.set(&cache_key, &raw_value).await;

        let raw: RawTextResponse = serde_json::from_value(raw_value)
            .map_err(|e| ApiError::internal(format!("malformed corpus text response: {e}")))?;
        Ok(into_text_response(raw))
    }

    async fn get_related(&self, reference: &str) -> ApiResult<RelatedResponse> {
        let cache_key = format!("related:{reference}");
        if let Some(cached) = self.cache.get(&cache_key).await {
            if let Ok(raw) = serde_json::from_value::<RelatedResponse>(cached) {
                return Ok(raw);
            }
        }

        let url = format!("{}/related/{}", self.base_url.trim_end_matches('/'), urlencode(reference));
        let raw_value = self.get_with_retry(&url).await?;
        self.cache.set(&cache_key, &raw_value).await;

        serde_json::from_value(raw_value)
            .map_err(|e| ApiError::internal(format!("malformed corpus related response: {e}")))
    }

    async fn name_lookup(&self, token: &str) -> ApiResult<Vec<NameDisambiguation>> {
        let cache_key = format!("name:{token}");
        if let Some(cached) = self.cache.get(&cache_key).await {
            if let Ok(raw) = serde_json::from_value::<Vec<NameDisambiguation>>(cached) {
                return Ok(raw);
            }
        }

        let url = format!("{}/name/{}", self.base_url.trim_end_matches('/'), urlencode(token));
        let raw_value = self.get_with_retry(&url).await?;
        self.cache.set(&cache_key, &raw_value).await;

        serde_json::from_value(raw_value)
            .map_err(|e| ApiError::internal(format!("malformed corpus name response: {e}")))
    }
}

fn into_search_response(raw: RawSearchResponse) -> SearchResponse {
    let mut by_category = std::collections::HashMap::new();
    let mut tractate_counts = std::collections::HashMap::new();
    let mut top_refs = Vec::new();
    let mut sample_hits = Vec::new();

    for hit in &raw.hits.hits {
        top_refs.push(hit.source.reference.clone());
        for category in &hit.source.categories {
            *by_category.entry(category.clone()).or_insert(0u64) += 1;
        }
        if let Some(tractate) = crate::search::priority::tractate_of(&hit.source.reference) {
            *tractate_counts.entry(tractate.to_string()).or_insert(0u64) += 1;
        }
        if sample_hits.len() < 5 {
            sample_hits.push(SampleHit {
                reference: hit.source.reference.clone(),
                hebrew_snippet: hit.source.he_text.chars().take(200).collect(),
                english_snippet: hit.source.en_text.chars().take(200).collect(),
            });
        }
    }

    let mut by_tractate_ranked: Vec<(String, u64)> = tractate_counts.into_iter().collect();
    by_tractate_ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    by_tractate_ranked.truncate(3);
    let by_tractate = by_tractate_ranked.into_iter().collect();

    SearchResponse { total_hits: raw.hits.total, by_category, by_tractate, top_refs, sample_hits }
}

fn into_text_response(raw: RawTextResponse) -> TextResponse {
    TextResponse {
        hebrew: flatten_he_field(&raw.he),
        english: flatten_he_field(&raw.text),
        canonical_ref: raw.reference,
    }
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            },
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
