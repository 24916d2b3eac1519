//! Verification Request Repository

use super::RepoResult;
use shared::models::{VerificationRequest, VerificationStatus};
use sqlx::{SqliteExecutor, SqlitePool};

const VERIFICATION_SELECT: &str = "SELECT id, store_id, identity_id, document_type, requested_store_name, status, created_at FROM verification_request";

pub async fn insert(
    pool: &SqlitePool,
    store_id: i64,
    identity_id: i64,
    document_type: &str,
    requested_store_name: &str,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO verification_request (id, store_id, identity_id, document_type, requested_store_name, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, 'PENDING', ?6)",
    )
    .bind(id)
    .bind(store_id)
    .bind(identity_id)
    .bind(document_type)
    .bind(requested_store_name)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn find_by_id(
    ex: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<VerificationRequest>> {
    let sql = format!("{VERIFICATION_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, VerificationRequest>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn set_status(
    ex: impl SqliteExecutor<'_>,
    id: i64,
    status: VerificationStatus,
) -> RepoResult<u64> {
    let rows = sqlx::query("UPDATE verification_request SET status = ?1 WHERE id = ?2")
        .bind(status)
        .bind(id)
        .execute(ex)
        .await?;
    Ok(rows.rows_affected())
}

/// Move submitter tags between identities (identity merge).
pub async fn reassign_submitter(
    ex: impl SqliteExecutor<'_>,
    from_identity: i64,
    to_identity: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE verification_request SET identity_id = ?1 WHERE identity_id = ?2")
        .bind(to_identity)
        .bind(from_identity)
        .execute(ex)
        .await?;
    Ok(())
}
