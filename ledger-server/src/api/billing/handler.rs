//! Billing API Handlers

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use shared::models::{SubscriptionPlan, WebhookPayload};

use crate::auth::Caller;
use crate::core::ServerState;
use crate::services::billing::{self, WebhookOutcome};
use crate::utils::{AppResponse, AppResult, ok, ok_with_message};

#[derive(Deserialize)]
pub struct InvoiceRequest {
    pub plan: SubscriptionPlan,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub checkout_url: String,
}

/// POST /api/billing/invoice - 发起订阅付款（仅店主）
pub async fn create_invoice(
    State(state): State<ServerState>,
    caller: Caller,
    Json(payload): Json<InvoiceRequest>,
) -> AppResult<Json<AppResponse<InvoiceResponse>>> {
    let identity_id = caller.identity()?;
    let store_id = caller.store()?;

    let checkout_url = billing::create_subscription_invoice(
        &state.pool,
        state.billing.as_ref(),
        &state.config,
        store_id,
        identity_id,
        payload.plan,
    )
    .await?;
    Ok(ok(InvoiceResponse { checkout_url }))
}

/// Shared secret from whichever channel the provider used this time:
/// one of the token headers, or a `token` query parameter when headers
/// get stripped along the way.
fn shared_secret(headers: &HeaderMap, query: &HashMap<String, String>) -> Option<String> {
    for name in ["api_token", "api-token", "x-app-token"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            return Some(value.to_string());
        }
    }
    query.get("token").cloned()
}

/// POST /api/billing/webhook - 支付服务商回调
///
/// 未知订单与重复投递都按成功应答，避免服务商无限重试；
/// 真正的状态变更失败返回 5xx 让其稍后再试。
pub async fn webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(payload): Json<WebhookPayload>,
) -> AppResult<Json<AppResponse<()>>> {
    let secret = shared_secret(&headers, &query);
    let outcome =
        billing::handle_webhook(&state.pool, &state.config, secret.as_deref(), &payload).await?;
    let message = match outcome {
        WebhookOutcome::Applied { .. } => "OK",
        WebhookOutcome::UnknownOrder => "Order not found, skipping",
        WebhookOutcome::AlreadyPaid => "Already processed",
    };
    Ok(ok_with_message((), message))
}
