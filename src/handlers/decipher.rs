//! `/decipher` handlers (§6 Core HTTP surface, §4.7).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::decipher::{self, DecipherDeps};
use crate::models::DecipherResult;
use crate::utils::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct DecipherRequest {
    pub query: String,
    #[serde(default)]
    pub strict: bool,
}

#[utoipa::path(
    post,
    path = "/decipher",
    request_body = DecipherRequest,
    responses((status = 200, description = "Deciphered query", body = DecipherResult)),
    tag = "Decipher"
)]
pub async fn decipher_query(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DecipherRequest>,
) -> ApiResult<Json<DecipherResult>> {
    let deps = DecipherDeps {
        dictionary: &state.dictionary,
        validator: &state.validator,
        max_variants: state.config.pipeline.max_variants,
    };
    let result = decipher::decipher(&deps, &body.query).await;
    Ok(Json(result))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ConfirmWordRequest {
    pub original_query: String,
    pub selection_index: usize,
    pub selected_hebrew: String,
}

/// Re-derives the pending `DecipherResult` deterministically from
/// `original_query` (DECIPHER is a pure function of the dictionary's
/// current state, so there is no session to keep) and applies the user's
/// choice to it.
#[utoipa::path(
    post,
    path = "/decipher/confirm",
    request_body = ConfirmWordRequest,
    responses((status = 200, description = "Word confirmed", body = DecipherResult)),
    tag = "Decipher"
)]
pub async fn confirm_word(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ConfirmWordRequest>,
) -> ApiResult<Json<DecipherResult>> {
    let deps = DecipherDeps {
        dictionary: &state.dictionary,
        validator: &state.validator,
        max_variants: state.config.pipeline.max_variants,
    };
    let pending = decipher::decipher(&deps, &body.original_query).await;
    let resolved = decipher::confirm_word(&state.dictionary, pending, body.selection_index, &body.selected_hebrew)?;
    Ok(Json(resolved))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RejectWordRequest {
    pub original_query: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

#[utoipa::path(
    post,
    path = "/decipher/reject",
    request_body = RejectWordRequest,
    responses((status = 200, description = "Word rejected", body = OkResponse)),
    tag = "Decipher"
)]
pub async fn reject_word(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RejectWordRequest>,
) -> ApiResult<Json<OkResponse>> {
    let deps = DecipherDeps {
        dictionary: &state.dictionary,
        validator: &state.validator,
        max_variants: state.config.pipeline.max_variants,
    };
    let pending = decipher::decipher(&deps, &body.original_query).await;
    if !pending.word_validations.is_empty() {
        decipher::reject_word(pending, 0);
    }
    Ok(Json(OkResponse { ok: true }))
}
