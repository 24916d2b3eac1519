//! Invoice Repository
//!
//! `order_id` 带 UNIQUE 索引；PENDING → PAID 单向，幂等由 webhook
//! 处理层在同一事务内检查。

use super::RepoResult;
use shared::Money;
use shared::models::{Invoice, SubscriptionPlan};
use sqlx::SqliteExecutor;

const INVOICE_SELECT: &str = "SELECT id, store_id, order_id, external_id, amount, plan, status, created_at FROM invoice";

pub async fn insert(
    ex: impl SqliteExecutor<'_>,
    store_id: i64,
    order_id: &str,
    external_id: Option<&str>,
    amount: Money,
    plan: SubscriptionPlan,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO invoice (id, store_id, order_id, external_id, amount, plan, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'PENDING', ?7)",
    )
    .bind(id)
    .bind(store_id)
    .bind(order_id)
    .bind(external_id)
    .bind(amount)
    .bind(plan)
    .bind(now)
    .execute(ex)
    .await?;
    Ok(id)
}

pub async fn find_by_order_id(
    ex: impl SqliteExecutor<'_>,
    order_id: &str,
) -> RepoResult<Option<Invoice>> {
    let sql = format!("{INVOICE_SELECT} WHERE order_id = ?");
    let row = sqlx::query_as::<_, Invoice>(&sql)
        .bind(order_id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn mark_paid(
    ex: impl SqliteExecutor<'_>,
    order_id: &str,
    external_id: &str,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE invoice SET status = 'PAID', external_id = ?1 WHERE order_id = ?2 AND status = 'PENDING'",
    )
    .bind(external_id)
    .bind(order_id)
    .execute(ex)
    .await?;
    Ok(rows.rows_affected())
}
