//! Reminder API Handlers

use axum::{Json, extract::State};
use serde::Serialize;
use shared::models::ReminderSend;

use crate::auth::{Caller, require_access};
use crate::core::ServerState;
use crate::services::reminder;
use crate::utils::{AppResponse, AppResult, ok};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReceipt {
    pub message_id: String,
}

/// POST /api/reminders/send - 给欠款人发催款短信
///
/// 闸门规则（认证、订阅、配额、余额、冷却期）都在 service 层。
pub async fn send(
    State(state): State<ServerState>,
    caller: Caller,
    Json(payload): Json<ReminderSend>,
) -> AppResult<Json<AppResponse<DispatchReceipt>>> {
    let identity_id = caller.identity()?;
    let store_id = caller.store()?;
    require_access(&state.pool, store_id, identity_id).await?;

    let message_id = reminder::send_reminder(
        &state.pool,
        state.sms.as_ref(),
        &state.config,
        store_id,
        &payload,
    )
    .await?;
    Ok(ok(DispatchReceipt { message_id }))
}
