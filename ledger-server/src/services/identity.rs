//! Identity Service
//!
//! Guest identities are created by OTP login or the bot layer; the only
//! way one becomes verified is [`merge_verified_phone`], which also folds
//! a pre-existing identity holding the same phone into the acting one —
//! all inside a single storage transaction so no reference ever points at
//! a deleted row.

use shared::models::{Identity, IdentityProfile, IdentitySummary};
use sqlx::SqlitePool;

use crate::db::repository::{collaborator, debtor, identity, store, verification};
use crate::utils::{AppError, AppResult};

/// Apply a verified phone to the acting identity.
///
/// If another identity already owns the phone (say, an earlier web-only
/// login), everything it owns — stores, grants, debtor creator tags,
/// verification submissions — is reassigned to the acting identity and
/// the stale row is removed (or re-keyed, when the acting identity has no
/// row yet). Re-running with an already-consistent pair is a no-op.
pub async fn merge_verified_phone(
    pool: &SqlitePool,
    acting_id: i64,
    phone: &str,
    profile: &IdentityProfile,
) -> AppResult<Identity> {
    let mut tx = pool.begin().await?;

    let holder = identity::find_by_phone(&mut *tx, phone).await?;

    match holder {
        Some(stale) if stale.id != acting_id => {
            tracing::info!(from = stale.id, to = acting_id, "Merging identities");

            store::reassign_owner(&mut *tx, stale.id, acting_id).await?;
            collaborator::reassign_identity(&mut *tx, stale.id, acting_id).await?;
            debtor::reassign_creator(&mut *tx, stale.id, acting_id).await?;
            verification::reassign_submitter(&mut *tx, stale.id, acting_id).await?;

            if identity::find_by_id(&mut *tx, acting_id).await?.is_some() {
                identity::delete(&mut *tx, stale.id).await?;
                identity::set_phone(&mut *tx, acting_id, phone).await?;
                identity::update_profile(&mut *tx, acting_id, profile).await?;
            } else {
                // The phone's row survives under the acting id.
                identity::rekey(&mut *tx, stale.id, acting_id, profile).await?;
            }
        }
        _ => {
            // Phone is free, or already on the acting identity.
            if identity::find_by_id(&mut *tx, acting_id).await?.is_some() {
                identity::update_profile(&mut *tx, acting_id, profile).await?;
                identity::set_phone(&mut *tx, acting_id, phone).await?;
            } else {
                identity::create(
                    &mut *tx,
                    acting_id,
                    Some(phone),
                    &profile.display_name,
                    profile.username.as_deref(),
                    profile.language.as_deref().unwrap_or("tg"),
                )
                .await?;
            }
        }
    }

    tx.commit().await?;

    identity::find_by_id(pool, acting_id)
        .await?
        .ok_or_else(|| AppError::internal("Identity vanished during merge"))
}

/// Result of a profile sync for a known or unknown identity.
pub enum SyncOutcome {
    /// Profile refreshed; the caller keeps its session context.
    Known(Identity),
    /// No such identity — the fronting layer must collect a phone first.
    PhoneRequired,
}

pub async fn sync_profile(
    pool: &SqlitePool,
    identity_id: i64,
    profile: &IdentityProfile,
) -> AppResult<SyncOutcome> {
    let updated = identity::update_profile(pool, identity_id, profile).await?;
    if updated == 0 {
        return Ok(SyncOutcome::PhoneRequired);
    }
    let row = identity::find_by_id(pool, identity_id)
        .await?
        .ok_or_else(|| AppError::internal("Identity vanished during sync"))?;
    Ok(SyncOutcome::Known(row))
}

/// Canonical identity for a verified phone, creating a placeholder-named
/// row when the phone is new (OTP login path).
pub async fn find_or_create_by_phone(pool: &SqlitePool, phone: &str) -> AppResult<Identity> {
    if let Some(existing) = identity::find_by_phone(pool, phone).await? {
        return Ok(existing);
    }

    let id = shared::util::snowflake_id();
    let last4 = &phone[phone.len().saturating_sub(4)..];
    let display_name = format!("User {last4}");
    identity::create(pool, id, Some(phone), &display_name, None, "tg").await?;
    identity::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::internal("Identity vanished after create"))
}

pub async fn set_language(pool: &SqlitePool, identity_id: i64, language: &str) -> AppResult<()> {
    Ok(identity::set_language(pool, identity_id, language).await?)
}

pub async fn set_last_active_store(
    pool: &SqlitePool,
    identity_id: i64,
    store_id: Option<i64>,
) -> AppResult<()> {
    Ok(identity::set_last_active_store(pool, identity_id, store_id).await?)
}

/// Collaborator picker search; short queries return nothing rather than
/// everything.
pub async fn search(
    pool: &SqlitePool,
    query: &str,
    excluding: i64,
) -> AppResult<Vec<IdentitySummary>> {
    if query.len() < 2 {
        return Ok(Vec::new());
    }
    Ok(identity::search(pool, query, excluding, 5).await?)
}
