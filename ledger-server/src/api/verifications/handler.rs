//! Verification Review API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::VerificationDecision;

use crate::core::ServerState;
use crate::services::billing;
use crate::utils::{AppResponse, AppResult, ok};

/// PUT /api/verifications/{id}/status - 审核认证申请
///
/// 通过即授予 TRIAL 订阅并套用申请的法定店名；驳回取消认证标记。
pub async fn decide(
    State(state): State<ServerState>,
    Path(request_id): Path<i64>,
    Json(payload): Json<VerificationDecision>,
) -> AppResult<Json<AppResponse<()>>> {
    billing::decide_verification(&state.pool, &state.config, request_id, payload.status).await?;
    Ok(ok(()))
}
