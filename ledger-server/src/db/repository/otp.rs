//! OTP Repository
//!
//! Two tables: the single-active-code challenge per phone, and the
//! append-only issuance log the rate limiter counts over. The limiter is
//! persisted state on purpose — an in-process map would reset on restart
//! and diverge across instances.

use super::RepoResult;
use sqlx::SqlitePool;

/// Overwrite any outstanding challenge for this phone.
pub async fn upsert_challenge(
    pool: &SqlitePool,
    phone: &str,
    code: &str,
    expires_at: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO otp_challenge (phone, code, expires_at) VALUES (?1, ?2, ?3) ON CONFLICT(phone) DO UPDATE SET code = excluded.code, expires_at = excluded.expires_at",
    )
    .bind(phone)
    .bind(code)
    .bind(expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Consume a matching, unexpired challenge. A single DELETE keeps
/// check-and-consume atomic, so a code verifies at most once.
pub async fn take_challenge(
    pool: &SqlitePool,
    phone: &str,
    code: &str,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "DELETE FROM otp_challenge WHERE phone = ?1 AND code = ?2 AND expires_at > ?3",
    )
    .bind(phone)
    .bind(code)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn count_by_source_since(
    pool: &SqlitePool,
    source: &str,
    since: i64,
) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM otp_request_log WHERE source = ?1 AND created_at > ?2",
    )
    .bind(source)
    .bind(since)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn count_by_phone_since(pool: &SqlitePool, phone: &str, since: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM otp_request_log WHERE phone = ?1 AND created_at > ?2",
    )
    .bind(phone)
    .bind(since)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Record a successful issuance against both windows.
pub async fn log_request(pool: &SqlitePool, phone: &str, source: &str) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("INSERT INTO otp_request_log (phone, source, created_at) VALUES (?1, ?2, ?3)")
        .bind(phone)
        .bind(source)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(())
}
