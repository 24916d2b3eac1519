//! Transaction API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::Money;
use shared::models::{Txn, TxnCreate};

use crate::auth::{Caller, require_access};
use crate::core::ServerState;
use crate::db::repository::identity;
use crate::services::ledger;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppResult, ok};

/// POST /api/transactions - 记一笔欠款或还款
pub async fn create(
    State(state): State<ServerState>,
    caller: Caller,
    Json(payload): Json<TxnCreate>,
) -> AppResult<Json<Txn>> {
    let identity_id = caller.identity()?;
    let store_id = caller.store()?;
    let access = require_access(&state.pool, store_id, identity_id).await?;

    validate_optional_text(&payload.description, "Description", MAX_NOTE_LEN)?;

    let actor = identity::find_by_id(&state.pool, identity_id)
        .await?
        .map(|row| row.display_name)
        .unwrap_or_else(|| "Unknown".to_string());

    let record =
        ledger::apply_transaction(&state.pool, store_id, &access, &actor, payload).await?;
    Ok(Json(record))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseResponse {
    pub new_balance: Money,
}

/// DELETE /api/transactions/{id} - 冲销一笔交易
pub async fn reverse(
    State(state): State<ServerState>,
    caller: Caller,
    Path(txn_id): Path<i64>,
) -> AppResult<Json<crate::utils::AppResponse<ReverseResponse>>> {
    let identity_id = caller.identity()?;
    let new_balance = ledger::reverse_transaction(&state.pool, identity_id, txn_id).await?;
    Ok(ok(ReverseResponse { new_balance }))
}
