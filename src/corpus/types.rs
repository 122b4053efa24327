//! Wire shapes for the corpus HTTP API, with the defensive deserialization
//! the upstream API's inconsistent JSON shapes require.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

/// `hits.total` is sometimes a bare int, sometimes `{"value": int}`.
fn deserialize_total<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(n) => Ok(n.as_u64().unwrap_or(0)),
        Value::Object(map) => Ok(map.get("value").and_then(Value::as_u64).unwrap_or(0)),
        _ => Ok(0),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHitsEnvelope {
    #[serde(deserialize_with = "deserialize_total")]
    pub total: u64,
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSearchResponse {
    pub hits: RawHitsEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_source")]
    pub source: RawHitSource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHitSource {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub he_text: String,
    #[serde(default)]
    pub en_text: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Normalized view handed to callers after `search()` aggregates the raw hits.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub total_hits: u64,
    pub by_category: HashMap<String, u64>,
    pub by_tractate: HashMap<String, u64>,
    pub top_refs: Vec<String>,
    pub sample_hits: Vec<SampleHit>,
}

#[derive(Debug, Clone)]
pub struct SampleHit {
    pub reference: String,
    pub hebrew_snippet: String,
    pub english_snippet: String,
}

/// The `he` field of `/texts/<ref>` may be a string, a list, or a nested
/// list; flatten depth-first and join with spaces.
fn flatten_he(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => {
            for item in items {
                flatten_he(item, out);
            }
        },
        _ => {},
    }
}

pub fn flatten_he_field(value: &Value) -> String {
    let mut parts = Vec::new();
    flatten_he(value, &mut parts);
    parts.join(" ")
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTextResponse {
    #[serde(default)]
    pub he: Value,
    #[serde(default)]
    pub text: Value,
    #[serde(rename = "ref", default)]
    pub reference: String,
}

#[derive(Debug, Clone)]
pub struct TextResponse {
    pub hebrew: String,
    pub english: String,
    pub canonical_ref: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedResponse {
    #[serde(default)]
    pub commentaries: Vec<RelatedLink>,
    #[serde(default)]
    pub links: Vec<RelatedLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedLink {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub collective_title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NameDisambiguation {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    pub title: String,
    #[serde(default)]
    pub key: Option<String>,
}
