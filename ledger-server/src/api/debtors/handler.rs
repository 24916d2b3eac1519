//! Debtor API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{
    Debtor, DebtorCreate, DebtorUpdate, DebtorWithTransactions, PublicDebtorView,
};

use crate::auth::{Caller, require_access};
use crate::core::ServerState;
use crate::services::ledger;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppResponse, AppResult, ok};

/// GET /api/debtors - 店铺的欠款人列表（含交易历史）
pub async fn list(
    State(state): State<ServerState>,
    caller: Caller,
) -> AppResult<Json<Vec<DebtorWithTransactions>>> {
    let identity_id = caller.identity()?;
    let store_id = caller.store()?;
    require_access(&state.pool, store_id, identity_id).await?;

    let debtors = ledger::list_debtors(&state.pool, store_id).await?;
    Ok(Json(debtors))
}

/// POST /api/debtors - 创建欠款人（余额从 0 开始）
pub async fn create(
    State(state): State<ServerState>,
    caller: Caller,
    Json(payload): Json<DebtorCreate>,
) -> AppResult<Json<Debtor>> {
    let identity_id = caller.identity()?;
    let store_id = caller.store()?;
    require_access(&state.pool, store_id, identity_id).await?;

    validate_required_text(&payload.name, "Debtor name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "Phone", MAX_SHORT_TEXT_LEN)?;

    let debtor = ledger::create_debtor(&state.pool, store_id, identity_id, payload).await?;
    Ok(Json(debtor))
}

/// PUT /api/debtors/{id} - 更新联系信息
pub async fn update(
    State(state): State<ServerState>,
    caller: Caller,
    Path(debtor_id): Path<i64>,
    Json(payload): Json<DebtorUpdate>,
) -> AppResult<Json<Debtor>> {
    let identity_id = caller.identity()?;
    let store_id = caller.store()?;
    require_access(&state.pool, store_id, identity_id).await?;

    validate_optional_text(&payload.name, "Debtor name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "Phone", MAX_SHORT_TEXT_LEN)?;

    let debtor = ledger::update_debtor(&state.pool, store_id, debtor_id, payload).await?;
    Ok(Json(debtor))
}

/// DELETE /api/debtors/{id} - 删除欠款人（历史随级联一起删除）
pub async fn delete(
    State(state): State<ServerState>,
    caller: Caller,
    Path(debtor_id): Path<i64>,
) -> AppResult<Json<AppResponse<()>>> {
    let identity_id = caller.identity()?;
    let store_id = caller.store()?;
    let access = require_access(&state.pool, store_id, identity_id).await?;

    ledger::delete_debtor(&state.pool, store_id, &access, debtor_id).await?;
    Ok(ok(()))
}

/// GET /api/public/debtors/{id} - 公开账单页（只读，无需身份）
pub async fn public_view(
    State(state): State<ServerState>,
    Path(debtor_id): Path<i64>,
) -> AppResult<Json<PublicDebtorView>> {
    let view = ledger::public_view(&state.pool, debtor_id).await?;
    Ok(Json(view))
}
