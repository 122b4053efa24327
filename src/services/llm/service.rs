//! LLM Service trait/impl - the generic "analyze with JSON repair and a
//! cache in front" capability UNDERSTAND and SEARCH both use (§4.8, §4.9).

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::cache::Cache;

use super::client::LLMClient;
use super::models::{LLMError, LLMScenario, TokenUsage};

/// Implemented by each scenario's request struct (`StrategyRequest`,
/// `SugyaValidationRequest`, ...).
pub trait LLMAnalysisRequestTrait: Serialize + Send + Sync {
    fn scenario(&self) -> LLMScenario;
    fn system_prompt(&self) -> String;
    /// Cache key, namespaced by scenario by the service so two scenarios
    /// never collide even if their natural keys coincide.
    fn cache_key(&self) -> String;
    /// Fingerprint of the query itself, for log correlation.
    fn query_hash(&self) -> String;
    /// Fingerprint of the surrounding context (corpus profile, located
    /// simanim, ...), for log correlation.
    fn context_hash(&self) -> String;

    /// The user prompt body sent alongside the system prompt - the
    /// serialized request itself, pretty-printed, matching the teacher's
    /// "send the struct as the user prompt" convention.
    fn user_prompt(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Implemented by each scenario's response struct (`Strategy`, ...).
pub trait LLMAnalysisResponseTrait: DeserializeOwned + Serialize + Send + Sync {
    fn summary(&self) -> &str;
    fn confidence(&self) -> Option<f64>;

    /// The deterministic fallback to use when the LLM call fails
    /// transiently or its output cannot be repaired into valid JSON.
    /// Scenarios that can always construct one (UNDERSTAND's low-confidence
    /// Strategy) override this; scenarios with no safe fallback return
    /// `None` and let the caller surface the error.
    fn fallback() -> Option<Self> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct LLMAnalysisResult<T> {
    pub response: T,
    pub from_cache: bool,
    pub token_usage: TokenUsage,
    /// Set when the raw response needed code-fence stripping or
    /// bracket-balance repair before it parsed.
    pub was_repaired: bool,
}

#[async_trait]
pub trait LLMService: Send + Sync {
    fn is_available(&self) -> bool;

    async fn analyze<Req, Resp>(&self, request: &Req) -> Result<LLMAnalysisResult<Resp>, LLMError>
    where
        Req: LLMAnalysisRequestTrait,
        Resp: LLMAnalysisResponseTrait;
}

pub struct LLMServiceImpl {
    client: LLMClient,
    cache: Arc<dyn Cache<serde_json::Value>>,
    enabled: bool,
}

impl LLMServiceImpl {
    pub fn new(client: LLMClient, cache: Arc<dyn Cache<serde_json::Value>>) -> Self {
        let enabled = client.is_configured();
        Self { client, cache, enabled }
    }
}

#[async_trait]
impl LLMService for LLMServiceImpl {
    fn is_available(&self) -> bool {
        self.enabled
    }

    async fn analyze<Req, Resp>(&self, request: &Req) -> Result<LLMAnalysisResult<Resp>, LLMError>
    where
        Req: LLMAnalysisRequestTrait,
        Resp: LLMAnalysisResponseTrait,
    {
        let cache_key = format!("{}:{}", request.scenario().as_str(), request.cache_key());

        if let Some(cached) = self.cache.get(&cache_key).await
            && let Ok(response) = serde_json::from_value::<Resp>(cached)
        {
            tracing::debug!(scenario = request.scenario().as_str(), "LLM cache HIT for {cache_key}");
            return Ok(LLMAnalysisResult {
                response,
                from_cache: true,
                token_usage: TokenUsage::default(),
                was_repaired: false,
            });
        }

        if !self.enabled {
            return Resp::fallback()
                .map(|response| LLMAnalysisResult {
                    response,
                    from_cache: false,
                    token_usage: TokenUsage::default(),
                    was_repaired: false,
                })
                .ok_or(LLMError::Disabled);
        }

        tracing::debug!(scenario = request.scenario().as_str(), "LLM cache MISS for {cache_key}, calling API");
        let (raw, token_usage) = match self.client.complete(&request.system_prompt(), &request.user_prompt()).await {
            Ok(pair) => pair,
            Err(e) if e.is_retryable() => return Err(e),
            Err(e) => {
                return Resp::fallback()
                    .map(|response| LLMAnalysisResult { response, from_cache: false, token_usage: TokenUsage::default(), was_repaired: false })
                    .ok_or(e);
            },
        };

        match repair_and_parse::<Resp>(&raw) {
            Ok((response, was_repaired)) => {
                if let Ok(value) = serde_json::to_value(&response) {
                    self.cache.set(&cache_key, &value).await;
                }
                Ok(LLMAnalysisResult { response, from_cache: false, token_usage, was_repaired })
            },
            Err(parse_err) => Resp::fallback()
                .map(|response| LLMAnalysisResult { response, from_cache: false, token_usage, was_repaired: true })
                .ok_or(parse_err),
        }
    }
}

/// JSON repair pipeline (§4.8 step 4): strip code fences, find the first
/// `{`, parse; on failure try one bracket-balance repair; on second
/// failure give up (caller falls back).
fn repair_and_parse<Resp: DeserializeOwned>(raw: &str) -> Result<(Resp, bool), LLMError> {
    let stripped = strip_code_fences(raw);
    let from_first_brace = match stripped.find('{') {
        Some(idx) => &stripped[idx..],
        None => return Err(LLMError::ParseError("no JSON object found in LLM response".to_string())),
    };

    if let Ok(parsed) = serde_json::from_str::<Resp>(from_first_brace) {
        return Ok((parsed, false));
    }

    let balanced = balance_brackets(from_first_brace);
    serde_json::from_str::<Resp>(&balanced)
        .map(|parsed| (parsed, true))
        .map_err(|e| LLMError::ParseError(format!("unrepairable LLM JSON: {e}")))
}

fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        rest.trim().strip_suffix("```").unwrap_or(rest).trim().to_string()
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest.trim().strip_suffix("```").unwrap_or(rest).trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Truncates to the last point where braces/brackets were balanced, then
/// appends whatever closers are still owed. Handles the common failure
/// mode of a response cut off mid-object.
fn balance_brackets(s: &str) -> String {
    let mut depth_stack = Vec::new();
    let mut last_balanced_end = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in s.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth_stack.push('}'),
            '[' => depth_stack.push(']'),
            '}' | ']' => {
                depth_stack.pop();
            },
            _ => {},
        }
        if depth_stack.is_empty() {
            last_balanced_end = idx + c.len_utf8();
        }
    }

    if depth_stack.is_empty() {
        return s.to_string();
    }
    let mut repaired = s[..last_balanced_end.max(s.len().min(last_balanced_end))].to_string();
    if repaired.is_empty() {
        repaired = s.to_string();
    }
    while let Some(closer) = depth_stack.pop() {
        repaired.push(closer);
    }
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Dummy {
        value: String,
    }

    #[test]
    fn strips_json_code_fence() {
        let raw = "```json\n{\"value\":\"x\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"value\":\"x\"}");
    }

    #[test]
    fn repairs_truncated_object() {
        let raw = r#"{"value": "x""#;
        let repaired = balance_brackets(raw);
        assert!(serde_json::from_str::<Dummy>(&repaired).is_ok());
    }

    #[test]
    fn repair_and_parse_succeeds_on_clean_json() {
        let (parsed, was_repaired) = repair_and_parse::<Dummy>(r#"{"value":"x"}"#).unwrap();
        assert_eq!(parsed.value, "x");
        assert!(!was_repaired);
    }

    #[test]
    fn repair_and_parse_unwraps_fenced_and_truncated_json() {
        let raw = "```json\n{\"value\": \"x\"\n```";
        let (parsed, was_repaired) = repair_and_parse::<Dummy>(raw).unwrap();
        assert_eq!(parsed.value, "x");
        assert!(was_repaired);
    }
}
