//! `/search` handlers (§6 Core HTTP surface, §4.9).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::clarification::ClarificationKind;
use crate::decipher::{self, DecipherDeps};
use crate::models::SearchResult;
use crate::search::{self, SearchDeps};
use crate::understand;
use crate::utils::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SearchRequest {
    pub query: String,
}

#[utoipa::path(
    post,
    path = "/search",
    request_body = SearchRequest,
    responses((status = 200, description = "Search result", body = SearchResult)),
    tag = "Search"
)]
pub async fn search_query(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> ApiResult<Json<SearchResult>> {
    let decipher_deps =
        DecipherDeps { dictionary: &state.dictionary, validator: &state.validator, max_variants: state.config.pipeline.max_variants };
    let deciphered = decipher::decipher(&decipher_deps, &body.query).await;

    if !deciphered.success {
        return Ok(Json(SearchResult::empty_with_message(&body.query, deciphered.message)));
    }

    if deciphered.is_pure_english {
        return Ok(Json(SearchResult::empty_with_message(
            &body.query,
            "this query reads as plain English; name a sugya, concept, or author to search the corpus",
        )));
    }

    if deciphered.needs_validation {
        let prompt = deciphered
            .word_validations
            .first()
            .map(|w| format!("I'm not confident how to read \"{}\". Which did you mean?", w.original))
            .unwrap_or_else(|| "some terms in this query are ambiguous".to_string());
        let options = deciphered.word_validations.first().map(|w| w.alternatives.clone()).unwrap_or_default();
        let context = serde_json::json!({
            "word_validations": deciphered.word_validations,
            "hebrew_terms": deciphered.hebrew_terms,
        });
        let query_id = state.clarifications.suspend(ClarificationKind::Decipher, &body.query, context);
        return Ok(Json(SearchResult::needing_clarification(&body.query, query_id, prompt, options)));
    }

    let strategy = understand::build_strategy(state.llm.as_ref(), state.corpus.as_ref(), &body.query, &deciphered.hebrew_terms).await?;

    let search_deps = SearchDeps {
        llm: state.llm.as_ref(),
        corpus: state.corpus.as_ref(),
        clarifications: &state.clarifications,
        fetch_concurrency: state.config.pipeline.search_concurrency,
    };
    let result = search::run_search(&search_deps, &body.query, deciphered.hebrew_terms, strategy).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SearchClarifyRequest {
    pub original_query: String,
    pub query_id: String,
    pub selected_option_id: String,
}

#[utoipa::path(
    post,
    path = "/search/clarify",
    request_body = SearchClarifyRequest,
    responses((status = 200, description = "Search result after clarification", body = SearchResult)),
    tag = "Search"
)]
pub async fn search_clarify(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchClarifyRequest>,
) -> ApiResult<Json<SearchResult>> {
    let search_deps = SearchDeps {
        llm: state.llm.as_ref(),
        corpus: state.corpus.as_ref(),
        clarifications: &state.clarifications,
        fetch_concurrency: state.config.pipeline.search_concurrency,
    };
    let decipher_deps =
        DecipherDeps { dictionary: &state.dictionary, validator: &state.validator, max_variants: state.config.pipeline.max_variants };
    let result =
        search::resume_after_clarification(&search_deps, &decipher_deps, &body.query_id, &body.selected_option_id).await?;
    Ok(Json(result))
}
