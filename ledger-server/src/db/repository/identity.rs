//! Identity Repository

use super::RepoResult;
use shared::models::{Identity, IdentityProfile, IdentitySummary};
use sqlx::{SqliteExecutor, SqlitePool};

const IDENTITY_SELECT: &str = "SELECT id, phone, display_name, username, language, last_active_store_id, last_seen FROM identity";

pub async fn find_by_id(ex: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Identity>> {
    let sql = format!("{IDENTITY_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Identity>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn find_by_phone(
    ex: impl SqliteExecutor<'_>,
    phone: &str,
) -> RepoResult<Option<Identity>> {
    let sql = format!("{IDENTITY_SELECT} WHERE phone = ?");
    let row = sqlx::query_as::<_, Identity>(&sql)
        .bind(phone)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn create(
    ex: impl SqliteExecutor<'_>,
    id: i64,
    phone: Option<&str>,
    display_name: &str,
    username: Option<&str>,
    language: &str,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO identity (id, phone, display_name, username, language, last_seen) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(id)
    .bind(phone)
    .bind(display_name)
    .bind(username)
    .bind(language)
    .bind(now)
    .execute(ex)
    .await?;
    Ok(())
}

/// Refresh profile fields and `last_seen` on an existing row.
pub async fn update_profile(
    ex: impl SqliteExecutor<'_>,
    id: i64,
    profile: &IdentityProfile,
) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE identity SET display_name = ?1, username = ?2, language = COALESCE(?3, language), last_seen = ?4 WHERE id = ?5",
    )
    .bind(&profile.display_name)
    .bind(&profile.username)
    .bind(&profile.language)
    .bind(now)
    .bind(id)
    .execute(ex)
    .await?;
    Ok(rows.rows_affected())
}

/// Attach a verified phone to a row. Only the identity merge calls this.
pub async fn set_phone(ex: impl SqliteExecutor<'_>, id: i64, phone: &str) -> RepoResult<()> {
    sqlx::query("UPDATE identity SET phone = ?1 WHERE id = ?2")
        .bind(phone)
        .bind(id)
        .execute(ex)
        .await?;
    Ok(())
}

/// Re-key a row under a new id, carrying fresh profile data with it.
/// Used by the identity merge when the acting identity has no row yet.
pub async fn rekey(
    ex: impl SqliteExecutor<'_>,
    old_id: i64,
    new_id: i64,
    profile: &IdentityProfile,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE identity SET id = ?1, display_name = ?2, username = ?3, last_seen = ?4 WHERE id = ?5",
    )
    .bind(new_id)
    .bind(&profile.display_name)
    .bind(&profile.username)
    .bind(now)
    .bind(old_id)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn delete(ex: impl SqliteExecutor<'_>, id: i64) -> RepoResult<()> {
    sqlx::query("DELETE FROM identity WHERE id = ?")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(())
}

pub async fn set_language(pool: &SqlitePool, id: i64, language: &str) -> RepoResult<()> {
    sqlx::query("UPDATE identity SET language = ?1 WHERE id = ?2")
        .bind(language)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_last_active_store(
    pool: &SqlitePool,
    id: i64,
    store_id: Option<i64>,
) -> RepoResult<()> {
    sqlx::query("UPDATE identity SET last_active_store_id = ?1 WHERE id = ?2")
        .bind(store_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Search identities for the collaborator picker.
pub async fn search(
    pool: &SqlitePool,
    query: &str,
    excluding: i64,
    limit: i64,
) -> RepoResult<Vec<IdentitySummary>> {
    let pattern = format!("%{query}%");
    let rows = sqlx::query_as::<_, IdentitySummary>(
        "SELECT id, display_name, username FROM identity WHERE (display_name LIKE ?1 OR username LIKE ?1 OR phone LIKE ?1) AND id != ?2 LIMIT ?3",
    )
    .bind(&pattern)
    .bind(excluding)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
