//! Store Repository

use super::RepoResult;
use shared::models::{Store, SubscriptionPlan};
use sqlx::{SqliteExecutor, SqlitePool};

const STORE_SELECT: &str = "SELECT id, name, owner_identity_id, is_verified, subscription_plan, subscription_end_at, sms_quota, sms_used, created_at FROM store";

pub async fn find_by_id(ex: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Store>> {
    let sql = format!("{STORE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Store>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, name: &str, owner_identity_id: i64) -> RepoResult<Store> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO store (id, name, owner_identity_id, created_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(id)
    .bind(name)
    .bind(owner_identity_id)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| super::RepoError::Database("Failed to create store".into()))
}

/// Stores owned by an identity, oldest first, with the latest
/// verification request status attached.
pub async fn list_owned(
    pool: &SqlitePool,
    owner_identity_id: i64,
) -> RepoResult<Vec<(Store, Option<String>)>> {
    let sql = format!(
        "{STORE_SELECT} WHERE owner_identity_id = ? ORDER BY created_at ASC"
    );
    let stores = sqlx::query_as::<_, Store>(&sql)
        .bind(owner_identity_id)
        .fetch_all(pool)
        .await?;
    attach_verification_status(pool, stores).await
}

/// Stores shared with an identity through a collaborator grant.
pub async fn list_shared(
    pool: &SqlitePool,
    identity_id: i64,
) -> RepoResult<Vec<(Store, Option<String>)>> {
    let sql = "SELECT s.id, s.name, s.owner_identity_id, s.is_verified, s.subscription_plan, s.subscription_end_at, s.sms_quota, s.sms_used, s.created_at FROM store s JOIN collaborator c ON s.id = c.store_id WHERE c.identity_id = ? ORDER BY s.created_at ASC";
    let stores = sqlx::query_as::<_, Store>(sql)
        .bind(identity_id)
        .fetch_all(pool)
        .await?;
    attach_verification_status(pool, stores).await
}

async fn attach_verification_status(
    pool: &SqlitePool,
    stores: Vec<Store>,
) -> RepoResult<Vec<(Store, Option<String>)>> {
    let mut out = Vec::with_capacity(stores.len());
    for store in stores {
        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM verification_request WHERE store_id = ? ORDER BY created_at DESC LIMIT 1",
        )
        .bind(store.id)
        .fetch_optional(pool)
        .await?;
        out.push((store, status));
    }
    Ok(out)
}

pub async fn owner_identity(ex: impl SqliteExecutor<'_>, store_id: i64) -> RepoResult<Option<i64>> {
    let owner = sqlx::query_scalar::<_, i64>("SELECT owner_identity_id FROM store WHERE id = ?")
        .bind(store_id)
        .fetch_optional(ex)
        .await?;
    Ok(owner)
}

/// Phone of the store owner, if the owner is verified.
pub async fn owner_phone(
    ex: impl SqliteExecutor<'_>,
    store_id: i64,
) -> RepoResult<Option<String>> {
    let phone = sqlx::query_scalar::<_, Option<String>>(
        "SELECT i.phone FROM store s JOIN identity i ON s.owner_identity_id = i.id WHERE s.id = ?",
    )
    .bind(store_id)
    .fetch_optional(ex)
    .await?;
    Ok(phone.flatten())
}

/// Apply a paid (or trial) subscription: plan, period end, fresh quota,
/// usage reset to zero. One statement so it composes into the caller's
/// storage transaction.
pub async fn apply_subscription(
    ex: impl SqliteExecutor<'_>,
    store_id: i64,
    plan: SubscriptionPlan,
    end_at: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE store SET subscription_plan = ?1, subscription_end_at = ?2, sms_quota = ?3, sms_used = 0 WHERE id = ?4",
    )
    .bind(plan)
    .bind(end_at)
    .bind(plan.sms_quota())
    .bind(store_id)
    .execute(ex)
    .await?;
    Ok(rows.rows_affected())
}

pub async fn set_verified(
    ex: impl SqliteExecutor<'_>,
    store_id: i64,
    verified: bool,
) -> RepoResult<()> {
    sqlx::query("UPDATE store SET is_verified = ?1 WHERE id = ?2")
        .bind(verified)
        .bind(store_id)
        .execute(ex)
        .await?;
    Ok(())
}

pub async fn rename(ex: impl SqliteExecutor<'_>, store_id: i64, name: &str) -> RepoResult<()> {
    sqlx::query("UPDATE store SET name = ?1 WHERE id = ?2")
        .bind(name)
        .bind(store_id)
        .execute(ex)
        .await?;
    Ok(())
}

/// Consume one reminder message from the quota (delta update).
pub async fn increment_sms_used(ex: impl SqliteExecutor<'_>, store_id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE store SET sms_used = sms_used + 1 WHERE id = ?")
        .bind(store_id)
        .execute(ex)
        .await?;
    Ok(())
}

/// Move store ownership between identities (identity merge).
pub async fn reassign_owner(
    ex: impl SqliteExecutor<'_>,
    from_identity: i64,
    to_identity: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE store SET owner_identity_id = ?1 WHERE owner_identity_id = ?2")
        .bind(to_identity)
        .bind(from_identity)
        .execute(ex)
        .await?;
    Ok(())
}
