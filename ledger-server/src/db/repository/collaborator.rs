//! Collaborator Repository

use super::{RepoError, RepoResult};
use shared::models::{Collaborator, CollaboratorWithProfile, Permissions};
use sqlx::{SqliteExecutor, SqlitePool};

pub async fn find(
    ex: impl SqliteExecutor<'_>,
    store_id: i64,
    identity_id: i64,
) -> RepoResult<Option<Collaborator>> {
    let row = sqlx::query_as::<_, Collaborator>(
        "SELECT id, store_id, identity_id, can_add_debt, can_add_payment, can_delete_debtor, created_at FROM collaborator WHERE store_id = ?1 AND identity_id = ?2",
    )
    .bind(store_id)
    .bind(identity_id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

pub async fn list_with_profiles(
    pool: &SqlitePool,
    store_id: i64,
) -> RepoResult<Vec<CollaboratorWithProfile>> {
    let rows = sqlx::query_as::<_, CollaboratorWithProfile>(
        "SELECT c.id, c.store_id, c.identity_id, c.can_add_debt, c.can_add_payment, c.can_delete_debtor, i.display_name, i.username FROM collaborator c LEFT JOIN identity i ON c.identity_id = i.id WHERE c.store_id = ?",
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Add a grant. The `(store_id, identity_id)` UNIQUE index surfaces a
/// duplicate as [`RepoError::Duplicate`].
pub async fn add(
    pool: &SqlitePool,
    store_id: i64,
    identity_id: i64,
    permissions: Permissions,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO collaborator (id, store_id, identity_id, can_add_debt, can_add_payment, can_delete_debtor, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(id)
    .bind(store_id)
    .bind(identity_id)
    .bind(permissions.can_add_debt)
    .bind(permissions.can_add_payment)
    .bind(permissions.can_delete_debtor)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Identity {identity_id} is already a collaborator"))
        }
        other => other,
    })?;
    Ok(id)
}

pub async fn remove(pool: &SqlitePool, store_id: i64, identity_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM collaborator WHERE store_id = ?1 AND identity_id = ?2")
        .bind(store_id)
        .bind(identity_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Move grants between identities (identity merge).
pub async fn reassign_identity(
    ex: impl SqliteExecutor<'_>,
    from_identity: i64,
    to_identity: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE collaborator SET identity_id = ?1 WHERE identity_id = ?2")
        .bind(to_identity)
        .bind(from_identity)
        .execute(ex)
        .await?;
    Ok(())
}
