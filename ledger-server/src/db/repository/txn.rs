//! Transaction Repository
//!
//! `txn` rows are written and deleted only by the ledger service, inside
//! the same storage transaction that adjusts the debtor balance. They are
//! never updated in place.

use super::RepoResult;
use shared::models::Txn;
use sqlx::{SqliteExecutor, SqlitePool};

const TXN_SELECT: &str = "SELECT id, debtor_id, kind, amount, description, actor, balance_after, created_at FROM txn";

pub async fn insert(ex: impl SqliteExecutor<'_>, txn: &Txn) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO txn (id, debtor_id, kind, amount, description, actor, balance_after, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(txn.id)
    .bind(txn.debtor_id)
    .bind(txn.kind)
    .bind(txn.amount)
    .bind(&txn.description)
    .bind(&txn.actor)
    .bind(txn.balance_after)
    .bind(txn.created_at)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn find_by_id(ex: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Txn>> {
    let sql = format!("{TXN_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Txn>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

/// Transaction plus the store its debtor belongs to, for access checks
/// on reversal.
pub async fn find_with_store(
    ex: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<(Txn, i64)>> {
    #[derive(sqlx::FromRow)]
    struct Row {
        #[sqlx(flatten)]
        txn: Txn,
        store_id: i64,
    }

    let row = sqlx::query_as::<_, Row>(
        "SELECT t.id, t.debtor_id, t.kind, t.amount, t.description, t.actor, t.balance_after, t.created_at, d.store_id FROM txn t JOIN debtor d ON t.debtor_id = d.id WHERE t.id = ?",
    )
    .bind(id)
    .fetch_optional(ex)
    .await?;
    Ok(row.map(|r| (r.txn, r.store_id)))
}

pub async fn delete(ex: impl SqliteExecutor<'_>, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM txn WHERE id = ?")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn list_by_debtor(pool: &SqlitePool, debtor_id: i64) -> RepoResult<Vec<Txn>> {
    let sql = format!("{TXN_SELECT} WHERE debtor_id = ? ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Txn>(&sql)
        .bind(debtor_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// History for a set of debtors in one round trip (ledger list view).
pub async fn list_by_debtors(pool: &SqlitePool, debtor_ids: &[i64]) -> RepoResult<Vec<Txn>> {
    if debtor_ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = debtor_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!(
        "{TXN_SELECT} WHERE debtor_id IN ({placeholders}) ORDER BY created_at DESC"
    );
    let mut query = sqlx::query_as::<_, Txn>(&sql);
    for id in debtor_ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

/// Signed sum over a debtor's live rows. Test/diagnostic helper for the
/// balance invariant.
pub async fn signed_sum(ex: impl SqliteExecutor<'_>, debtor_id: i64) -> RepoResult<i64> {
    let sum = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(CASE kind WHEN 'DEBT' THEN amount ELSE -amount END), 0) FROM txn WHERE debtor_id = ?",
    )
    .bind(debtor_id)
    .fetch_one(ex)
    .await?;
    Ok(sum)
}
