//! `GET /health` (§6 Core HTTP surface).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::cache::Cache;
use crate::models::CacheStats;
use crate::AppState;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
    pub versions: Versions,
    pub cache_stats: CacheStatsReport,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct Versions {
    #[schema(value_type = String)]
    pub crate_version: &'static str,
    pub llm_model: String,
    pub corpus_base_url: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CacheStatsReport {
    pub corpus: CacheStats,
    pub llm: CacheStats,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service health", body = HealthResponse)),
    tag = "System"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        versions: Versions {
            crate_version: env!("CARGO_PKG_VERSION"),
            llm_model: state.config.llm.model.clone(),
            corpus_base_url: state.config.corpus.base_url.clone(),
        },
        cache_stats: CacheStatsReport { corpus: state.corpus_cache.stats(), llm: state.llm_cache.stats() },
    })
}
