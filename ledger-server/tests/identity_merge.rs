//! Identity merge: reassignment of every owned reference, survivor
//! selection, promotion of guests, and idempotency.

mod common;

use ledger_server::db::repository::{collaborator, identity, store, verification};
use ledger_server::services::identity as identity_service;
use shared::models::{IdentityKind, IdentityProfile, Permissions};
use sqlx::SqlitePool;

fn profile(name: &str) -> IdentityProfile {
    IdentityProfile {
        display_name: name.to_string(),
        username: None,
        language: None,
    }
}

/// Every foreign reference must resolve to an existing identity row.
async fn assert_no_dangling_references(pool: &SqlitePool) {
    for (table, column) in [
        ("store", "owner_identity_id"),
        ("collaborator", "identity_id"),
        ("debtor", "created_by"),
        ("verification_request", "identity_id"),
    ] {
        let dangling = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM {table} t WHERE NOT EXISTS (SELECT 1 FROM identity i WHERE i.id = t.{column})"
        ))
        .fetch_one(pool)
        .await
        .unwrap();
        assert_eq!(dangling, 0, "dangling {table}.{column} after merge");
    }
}

#[tokio::test]
async fn merge_moves_everything_to_the_acting_identity() {
    let env = common::setup().await;
    let phone = "992900445566";

    // Stale web-login identity holding the phone, with a store, a debtor,
    // a grant on someone else's store, and a verification request.
    let stale = common::seed_identity(&env.pool, "User 5566", Some(phone)).await;
    let stale_store = common::seed_store(&env.pool, stale).await;
    common::seed_debtor(&env.pool, stale_store.id, stale).await;
    verification::insert(&env.pool, stale_store.id, stale, "passport", "Legal Name")
        .await
        .unwrap();

    let third = common::seed_identity(&env.pool, "Third", None).await;
    let third_store = common::seed_store(&env.pool, third).await;
    collaborator::add(&env.pool, third_store.id, stale, Permissions::default())
        .await
        .unwrap();

    // Acting identity (bot login) shares the verified phone.
    let acting = common::seed_identity(&env.pool, "Karim", None).await;
    let merged = identity_service::merge_verified_phone(&env.pool, acting, phone, &profile("Karim"))
        .await
        .unwrap();

    assert_eq!(merged.id, acting);
    assert_eq!(merged.kind(), IdentityKind::Verified(phone));

    // Stale row gone, references follow the acting id.
    assert!(identity::find_by_id(&env.pool, stale).await.unwrap().is_none());
    assert_eq!(
        store::owner_identity(&env.pool, stale_store.id).await.unwrap(),
        Some(acting)
    );
    assert!(collaborator::find(&env.pool, third_store.id, acting)
        .await
        .unwrap()
        .is_some());
    assert_no_dangling_references(&env.pool).await;
}

#[tokio::test]
async fn merge_is_idempotent() {
    let env = common::setup().await;
    let phone = "992900778899";

    let stale = common::seed_identity(&env.pool, "User 8899", Some(phone)).await;
    let stale_store = common::seed_store(&env.pool, stale).await;
    common::seed_debtor(&env.pool, stale_store.id, stale).await;

    let acting = common::seed_identity(&env.pool, "Zarina", None).await;
    identity_service::merge_verified_phone(&env.pool, acting, phone, &profile("Zarina"))
        .await
        .unwrap();

    let stores_before = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM store")
        .fetch_one(&env.pool)
        .await
        .unwrap();
    let identities_before = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM identity")
        .fetch_one(&env.pool)
        .await
        .unwrap();

    // Same pair again: a no-op, not a second migration.
    let merged = identity_service::merge_verified_phone(&env.pool, acting, phone, &profile("Zarina"))
        .await
        .unwrap();
    assert_eq!(merged.id, acting);

    let stores_after = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM store")
        .fetch_one(&env.pool)
        .await
        .unwrap();
    let identities_after = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM identity")
        .fetch_one(&env.pool)
        .await
        .unwrap();
    assert_eq!(stores_before, stores_after);
    assert_eq!(identities_before, identities_after);
    assert_no_dangling_references(&env.pool).await;
}

#[tokio::test]
async fn merge_rekeys_when_acting_identity_has_no_row() {
    let env = common::setup().await;
    let phone = "992900111222";

    let stale = common::seed_identity(&env.pool, "User 1222", Some(phone)).await;
    let stale_store = common::seed_store(&env.pool, stale).await;

    // Acting id exists only as a claim from the fronting layer.
    let acting = shared::util::snowflake_id();
    let merged = identity_service::merge_verified_phone(&env.pool, acting, phone, &profile("Nodir"))
        .await
        .unwrap();

    assert_eq!(merged.id, acting);
    assert_eq!(merged.phone.as_deref(), Some(phone));
    assert_eq!(merged.display_name, "Nodir");
    assert!(identity::find_by_id(&env.pool, stale).await.unwrap().is_none());
    assert_eq!(
        store::owner_identity(&env.pool, stale_store.id).await.unwrap(),
        Some(acting)
    );
    assert_no_dangling_references(&env.pool).await;
}

#[tokio::test]
async fn merge_promotes_a_guest_when_the_phone_is_free() {
    let env = common::setup().await;
    let phone = "992900333444";

    let guest = common::seed_identity(&env.pool, "Guest", None).await;
    let before = identity::find_by_id(&env.pool, guest).await.unwrap().unwrap();
    assert_eq!(before.kind(), IdentityKind::Guest);

    let merged = identity_service::merge_verified_phone(&env.pool, guest, phone, &profile("Guest"))
        .await
        .unwrap();
    assert_eq!(merged.kind(), IdentityKind::Verified(phone));

    // Creator tags on debtors stay intact through promotion.
    assert_no_dangling_references(&env.pool).await;
}

#[tokio::test]
async fn merge_creates_the_row_for_a_brand_new_pair() {
    let env = common::setup().await;
    let phone = "992900555666";
    let acting = shared::util::snowflake_id();

    let merged = identity_service::merge_verified_phone(&env.pool, acting, phone, &profile("Nav"))
        .await
        .unwrap();
    assert_eq!(merged.id, acting);
    assert_eq!(merged.phone.as_deref(), Some(phone));

    // Unique phone constraint holds: a second identity can't take it.
    let other = shared::util::snowflake_id();
    let again = identity_service::merge_verified_phone(&env.pool, other, phone, &profile("Other"))
        .await
        .unwrap();
    assert_eq!(again.id, other);
    assert!(identity::find_by_id(&env.pool, acting).await.unwrap().is_none());
}
