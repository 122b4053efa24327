//! LLM Client - a thin HTTP client for a Claude-style messages API
//! (system prompt + user prompt in, one JSON-bearing text response out).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::models::{LLMError, TokenUsage};

pub struct LLMClient {
    http_client: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<MessageIn<'a>>,
}

#[derive(Serialize)]
struct MessageIn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl LLMClient {
    pub fn new(api_base: impl Into<String>, api_key: Option<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("failed to build tuned LLM HTTP client ({e}), using default");
                Client::new()
            });
        Self { http_client, api_base: api_base.into(), api_key, model: model.into() }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one system/user prompt pair and returns the raw response text
    /// plus token usage. Transport failures map to `ApiError`/`Timeout`;
    /// content-shape failures (malformed JSON in the text) are NOT this
    /// client's concern - the caller's repair path handles those.
    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<(String, TokenUsage), LLMError> {
        let api_key = self.api_key.as_ref().ok_or(LLMError::Disabled)?;

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: 4096,
            system: system_prompt,
            messages: vec![MessageIn { role: "user", content: user_prompt }],
        };

        let response = self
            .http_client
            .post(format!("{}/messages", self.api_base.trim_end_matches('/')))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout(60)
                } else {
                    LLMError::ApiError(format!("request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            return Err(LLMError::ApiError(format!(
                "LLM API returned {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ApiError(format!("failed to parse LLM envelope: {e}")))?;

        let text = parsed.content.into_iter().map(|c| c.text).collect::<Vec<_>>().join("");
        let usage = parsed.usage.unwrap_or_default();
        Ok((text, TokenUsage::estimate(usage.input_tokens, usage.output_tokens)))
    }
}

/// Builds the JSON body of a "require strict JSON matching this schema"
/// request the way the teacher logs structured prompts - kept separate so
/// scenario modules can unit test prompt construction without a client.
pub fn json_instruction(schema_name: &str) -> String {
    format!(
        "Respond with a single JSON object matching the {schema_name} schema and nothing else - \
         no prose before or after, no markdown code fences."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_instruction_names_the_schema() {
        assert!(json_instruction("Strategy").contains("Strategy"));
    }

    #[test]
    fn unconfigured_client_reports_not_configured() {
        let client = LLMClient::new("https://example.test", None, "model", 10);
        assert!(!client.is_configured());
    }
}
