//! User Preference API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::IdentitySummary;

use crate::auth::Caller;
use crate::core::ServerState;
use crate::services::identity;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppResponse, AppResult, ok};

#[derive(Deserialize)]
pub struct LanguageUpdate {
    pub language: String,
}

/// PUT /api/users/me/language - 语言偏好
pub async fn set_language(
    State(state): State<ServerState>,
    caller: Caller,
    Json(payload): Json<LanguageUpdate>,
) -> AppResult<Json<AppResponse<()>>> {
    let identity_id = caller.identity()?;
    validate_required_text(&payload.language, "Language", MAX_SHORT_TEXT_LEN)?;
    identity::set_language(&state.pool, identity_id, &payload.language).await?;
    Ok(ok(()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreUpdate {
    pub store_id: Option<i64>,
}

/// PUT /api/users/me/store - 最近活跃店铺
pub async fn set_store(
    State(state): State<ServerState>,
    caller: Caller,
    Json(payload): Json<StoreUpdate>,
) -> AppResult<Json<AppResponse<()>>> {
    let identity_id = caller.identity()?;
    identity::set_last_active_store(&state.pool, identity_id, payload.store_id).await?;
    Ok(ok(()))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// GET /api/users/search?q=xxx - 搜索用户（协作者选择器）
pub async fn search(
    State(state): State<ServerState>,
    caller: Caller,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<IdentitySummary>>> {
    let identity_id = caller.identity()?;
    let results = identity::search(&state.pool, &query.q, identity_id).await?;
    Ok(Json(results))
}
