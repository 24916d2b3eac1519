//! Store API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Permissions, Store, StoreCreate, StoreView, VerificationSubmit};

use crate::auth::{Caller, require_owner};
use crate::core::ServerState;
use crate::db::repository::{collaborator, store, verification};
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppResponse, AppResult, ok};

/// 无任何店铺时自动建立的默认店铺名
const DEFAULT_STORE_NAME: &str = "Мағозаи асосӣ";

fn owned_view(store: Store, status: Option<String>) -> StoreView {
    StoreView {
        store,
        is_owner: true,
        verification_status: status.unwrap_or_else(|| "NONE".to_string()),
        permissions: Permissions::full(),
    }
}

/// GET /api/stores - 当前身份可见的店铺（自有 + 协作）
///
/// 第一次调用且名下没有任何店铺时，自动创建默认店铺。
pub async fn list(
    State(state): State<ServerState>,
    caller: Caller,
) -> AppResult<Json<Vec<StoreView>>> {
    let identity_id = caller.identity()?;

    let mut result: Vec<StoreView> = Vec::new();
    for (row, status) in store::list_owned(&state.pool, identity_id).await? {
        result.push(owned_view(row, status));
    }
    for (row, status) in store::list_shared(&state.pool, identity_id).await? {
        let permissions = collaborator::find(&state.pool, row.id, identity_id)
            .await?
            .map(|grant| grant.permissions())
            .unwrap_or_else(Permissions::none);
        result.push(StoreView {
            store: row,
            is_owner: false,
            verification_status: status.unwrap_or_else(|| "NONE".to_string()),
            permissions,
        });
    }

    if result.is_empty() {
        let created = store::create(&state.pool, DEFAULT_STORE_NAME, identity_id).await?;
        result.push(owned_view(created, None));
    }

    Ok(Json(result))
}

/// POST /api/stores - 创建店铺
pub async fn create(
    State(state): State<ServerState>,
    caller: Caller,
    Json(payload): Json<StoreCreate>,
) -> AppResult<Json<StoreView>> {
    let identity_id = caller.identity()?;
    validate_required_text(&payload.name, "Store name", MAX_NAME_LEN)?;

    let created = store::create(&state.pool, &payload.name, identity_id).await?;
    Ok(Json(owned_view(created, None)))
}

/// POST /api/stores/{id}/verify - 提交店铺认证申请（仅店主）
pub async fn submit_verification(
    State(state): State<ServerState>,
    caller: Caller,
    Path(store_id): Path<i64>,
    Json(payload): Json<VerificationSubmit>,
) -> AppResult<Json<AppResponse<i64>>> {
    let identity_id = caller.identity()?;
    require_owner(&state.pool, store_id, identity_id).await?;

    validate_required_text(&payload.document_type, "Document type", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.requested_store_name, "Store name", MAX_NAME_LEN)?;

    let request_id = verification::insert(
        &state.pool,
        store_id,
        identity_id,
        &payload.document_type,
        &payload.requested_store_name,
    )
    .await?;
    Ok(ok(request_id))
}
