//! Notification Outbox Repository
//!
//! Best-effort notifications are committed together with the state change
//! that caused them, then delivered by a background task. Delivery retries
//! never touch the already-committed business state.

use super::RepoResult;
use shared::models::OutboxMessage;
use sqlx::{SqliteExecutor, SqlitePool};

pub async fn enqueue(ex: impl SqliteExecutor<'_>, phone: &str, body: &str) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO notification_outbox (phone, body, attempts, created_at) VALUES (?1, ?2, 0, ?3)",
    )
    .bind(phone)
    .bind(body)
    .bind(now)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn fetch_unsent(
    pool: &SqlitePool,
    max_attempts: i64,
    limit: i64,
) -> RepoResult<Vec<OutboxMessage>> {
    let rows = sqlx::query_as::<_, OutboxMessage>(
        "SELECT id, phone, body, attempts, sent_at, created_at FROM notification_outbox WHERE sent_at IS NULL AND attempts < ?1 ORDER BY created_at ASC LIMIT ?2",
    )
    .bind(max_attempts)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn mark_sent(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE notification_outbox SET sent_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn bump_attempts(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE notification_outbox SET attempts = attempts + 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
