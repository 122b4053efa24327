//! Word Dictionary entry shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EntryProvenance {
    Manual,
    DictionaryImport,
    RulesConfirmed,
    UserConfirmed,
    Runtime,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DictionaryEntry {
    pub hebrew: String,
    pub confidence: f64,
    pub source: EntryProvenance,
    pub usage_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl DictionaryEntry {
    pub fn new(hebrew: impl Into<String>, confidence: f64, source: EntryProvenance) -> Self {
        let now = Utc::now();
        Self { hebrew: hebrew.into(), confidence, source, usage_count: 1, created_at: now, last_used_at: now }
    }

    pub fn touch(&mut self) {
        self.usage_count += 1;
        self.last_used_at = Utc::now();
    }
}
