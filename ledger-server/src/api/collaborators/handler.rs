//! Collaborator API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::models::{CollaboratorCreate, Permissions};

use crate::auth::{Caller, require_access, require_owner};
use crate::core::ServerState;
use crate::db::repository::collaborator;
use crate::utils::{AppError, AppResponse, AppResult, ok};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorView {
    pub identity_id: i64,
    pub display_name: String,
    pub username: Option<String>,
    pub permissions: Permissions,
}

/// GET /api/stores/{store_id}/collaborators - 协作者列表（成员可见）
pub async fn list(
    State(state): State<ServerState>,
    caller: Caller,
    Path(store_id): Path<i64>,
) -> AppResult<Json<Vec<CollaboratorView>>> {
    let identity_id = caller.identity()?;
    require_access(&state.pool, store_id, identity_id).await?;

    let rows = collaborator::list_with_profiles(&state.pool, store_id).await?;
    let views = rows
        .into_iter()
        .map(|row| CollaboratorView {
            identity_id: row.identity_id,
            display_name: row.display_name.clone().unwrap_or_else(|| "Unknown".into()),
            username: row.username.clone(),
            permissions: Permissions {
                can_add_debt: row.can_add_debt,
                can_add_payment: row.can_add_payment,
                can_delete_debtor: row.can_delete_debtor,
            },
        })
        .collect();
    Ok(Json(views))
}

/// POST /api/stores/{store_id}/collaborators - 添加协作者（仅店主）
pub async fn add(
    State(state): State<ServerState>,
    caller: Caller,
    Path(store_id): Path<i64>,
    Json(payload): Json<CollaboratorCreate>,
) -> AppResult<Json<AppResponse<i64>>> {
    let identity_id = caller.identity()?;
    require_owner(&state.pool, store_id, identity_id).await?;

    let grant_id = collaborator::add(
        &state.pool,
        store_id,
        payload.identity_id,
        payload.permissions,
    )
    .await?;
    Ok(ok(grant_id))
}

/// DELETE /api/stores/{store_id}/collaborators/{identity_id} - 移除协作者（仅店主）
pub async fn remove(
    State(state): State<ServerState>,
    caller: Caller,
    Path((store_id, target_identity)): Path<(i64, i64)>,
) -> AppResult<Json<AppResponse<()>>> {
    let identity_id = caller.identity()?;
    require_owner(&state.pool, store_id, identity_id).await?;

    let removed = collaborator::remove(&state.pool, store_id, target_identity).await?;
    if !removed {
        return Err(AppError::not_found(format!(
            "Collaborator {target_identity} not found"
        )));
    }
    Ok(ok(()))
}
