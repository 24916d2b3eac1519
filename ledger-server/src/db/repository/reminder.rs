//! Reminder Log Repository

use super::RepoResult;
use shared::models::ReminderLog;
use sqlx::{SqliteExecutor, SqlitePool};

pub async fn insert(
    ex: impl SqliteExecutor<'_>,
    store_id: i64,
    debtor_id: i64,
    message_id: &str,
    status: &str,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO reminder_log (id, store_id, debtor_id, message_id, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(id)
    .bind(store_id)
    .bind(debtor_id)
    .bind(message_id)
    .bind(status)
    .bind(now)
    .execute(ex)
    .await?;
    Ok(id)
}

/// Most recent dispatch to a debtor, for the cooldown lookup.
pub async fn latest_for_debtor(
    pool: &SqlitePool,
    store_id: i64,
    debtor_id: i64,
) -> RepoResult<Option<ReminderLog>> {
    let row = sqlx::query_as::<_, ReminderLog>(
        "SELECT id, store_id, debtor_id, message_id, status, created_at FROM reminder_log WHERE store_id = ?1 AND debtor_id = ?2 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(store_id)
    .bind(debtor_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
