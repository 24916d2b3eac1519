//! Auth API Handlers

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use shared::models::{Identity, IdentityProfile, OtpRequest, OtpVerify};

use crate::auth::Caller;
use crate::core::ServerState;
use crate::services::{identity, otp};
use crate::utils::{AppResponse, AppResult, ok, ok_with_message};

/// Source address for OTP rate limiting, taken from proxy headers the
/// same way the fronting layer forwards them.
fn client_source(headers: &HeaderMap) -> String {
    for name in ["x-forwarded-for", "x-real-ip", "cf-connecting-ip"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            let first = value.split(',').next().unwrap_or("").trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    "unknown".to_string()
}

/// POST /api/auth/otp/request - 发送登录验证码
pub async fn otp_request(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(payload): Json<OtpRequest>,
) -> AppResult<Json<AppResponse<()>>> {
    let source = client_source(&headers);
    otp::request_code(
        &state.pool,
        state.sms.as_ref(),
        &state.config,
        &payload.phone,
        &source,
    )
    .await?;
    Ok(ok_with_message((), "OTP sent"))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedUser {
    pub id: i64,
    pub display_name: String,
}

/// POST /api/auth/otp/verify - 校验验证码并换取身份
pub async fn otp_verify(
    State(state): State<ServerState>,
    Json(payload): Json<OtpVerify>,
) -> AppResult<Json<AppResponse<VerifiedUser>>> {
    let identity = otp::verify_code(&state.pool, &state.config, &payload.phone, &payload.code).await?;
    Ok(ok(VerifiedUser {
        id: identity.id,
        display_name: identity.display_name,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub require_phone: bool,
    pub language: Option<String>,
    pub last_active_store_id: Option<i64>,
    pub phone: Option<String>,
}

/// POST /api/auth/sync - 档案同步
///
/// 未知身份不会被创建：前置层必须先走电话绑定。
pub async fn sync(
    State(state): State<ServerState>,
    caller: Caller,
    Json(profile): Json<IdentityProfile>,
) -> AppResult<Json<AppResponse<SyncResponse>>> {
    let identity_id = caller.identity()?;
    let outcome = identity::sync_profile(&state.pool, identity_id, &profile).await?;
    let response = match outcome {
        identity::SyncOutcome::Known(row) => SyncResponse {
            require_phone: false,
            language: Some(row.language),
            last_active_store_id: row.last_active_store_id,
            phone: row.phone,
        },
        identity::SyncOutcome::PhoneRequired => SyncResponse {
            require_phone: true,
            language: None,
            last_active_store_id: None,
            phone: None,
        },
    };
    Ok(ok(response))
}

#[derive(Deserialize)]
pub struct ContactEvent {
    pub phone: String,
    #[serde(flatten)]
    pub profile: IdentityProfile,
}

/// POST /api/auth/contact - 联系人验证事件（bot 层转发）
///
/// 这是身份从游客升级为已验证的唯一入口。
pub async fn contact(
    State(state): State<ServerState>,
    caller: Caller,
    Json(event): Json<ContactEvent>,
) -> AppResult<Json<AppResponse<Identity>>> {
    let identity_id = caller.identity()?;
    let phone =
        crate::utils::validation::normalize_phone(&event.phone, &state.config.country_code)?;
    let merged =
        identity::merge_verified_phone(&state.pool, identity_id, &phone, &event.profile).await?;
    Ok(ok(merged))
}
