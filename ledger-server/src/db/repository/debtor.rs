//! Debtor Repository

use super::{RepoError, RepoResult};
use shared::Money;
use shared::models::{Debtor, DebtorCreate, DebtorUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const DEBTOR_SELECT: &str = "SELECT id, store_id, name, phone, balance, created_by, last_activity FROM debtor";

pub async fn find_by_id(ex: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Debtor>> {
    let sql = format!("{DEBTOR_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Debtor>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn find_in_store(
    ex: impl SqliteExecutor<'_>,
    id: i64,
    store_id: i64,
) -> RepoResult<Option<Debtor>> {
    let sql = format!("{DEBTOR_SELECT} WHERE id = ?1 AND store_id = ?2");
    let row = sqlx::query_as::<_, Debtor>(&sql)
        .bind(id)
        .bind(store_id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn list_by_store(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<Debtor>> {
    let sql = format!("{DEBTOR_SELECT} WHERE store_id = ? ORDER BY last_activity DESC");
    let rows = sqlx::query_as::<_, Debtor>(&sql)
        .bind(store_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// New debtors start at balance zero; opening debt is a transaction.
pub async fn create(
    pool: &SqlitePool,
    store_id: i64,
    created_by: i64,
    data: DebtorCreate,
) -> RepoResult<Debtor> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO debtor (id, store_id, name, phone, balance, created_by, last_activity) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
    )
    .bind(id)
    .bind(store_id)
    .bind(&data.name)
    .bind(&data.phone)
    .bind(created_by)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create debtor".into()))
}

pub async fn update_contact(
    pool: &SqlitePool,
    id: i64,
    store_id: i64,
    data: DebtorUpdate,
) -> RepoResult<Debtor> {
    let rows = sqlx::query(
        "UPDATE debtor SET name = COALESCE(?1, name), phone = COALESCE(?2, phone) WHERE id = ?3 AND store_id = ?4",
    )
    .bind(&data.name)
    .bind(&data.phone)
    .bind(id)
    .bind(store_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Debtor {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Debtor {id} not found")))
}

/// Apply a signed balance delta. The balance is never read back and
/// rewritten from application state — concurrent writers serialize on
/// this single UPDATE.
pub async fn adjust_balance(
    ex: impl SqliteExecutor<'_>,
    id: i64,
    store_id: i64,
    delta: Money,
    last_activity: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE debtor SET balance = balance + ?1, last_activity = ?2 WHERE id = ?3 AND store_id = ?4",
    )
    .bind(delta)
    .bind(last_activity)
    .bind(id)
    .bind(store_id)
    .execute(ex)
    .await?;
    Ok(rows.rows_affected())
}

/// Post-update balance, read inside the same storage transaction that
/// applied the delta (snapshot source for `balance_after`).
pub async fn balance(ex: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Money> {
    let balance = sqlx::query_scalar::<_, Money>("SELECT balance FROM debtor WHERE id = ?")
        .bind(id)
        .fetch_optional(ex)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Debtor {id} not found")))?;
    Ok(balance)
}

/// Delete a debtor; `txn` rows follow via FK cascade.
pub async fn delete(ex: impl SqliteExecutor<'_>, id: i64, store_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM debtor WHERE id = ?1 AND store_id = ?2")
        .bind(id)
        .bind(store_id)
        .execute(ex)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Move creator tags between identities (identity merge).
pub async fn reassign_creator(
    ex: impl SqliteExecutor<'_>,
    from_identity: i64,
    to_identity: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE debtor SET created_by = ?1 WHERE created_by = ?2")
        .bind(to_identity)
        .bind(from_identity)
        .execute(ex)
        .await?;
    Ok(())
}

/// Store name joined in, for the public statement page.
pub async fn store_name(pool: &SqlitePool, debtor_id: i64) -> RepoResult<Option<String>> {
    let name = sqlx::query_scalar::<_, String>(
        "SELECT s.name FROM debtor d JOIN store s ON d.store_id = s.id WHERE d.id = ?",
    )
    .bind(debtor_id)
    .fetch_optional(pool)
    .await?;
    Ok(name)
}
