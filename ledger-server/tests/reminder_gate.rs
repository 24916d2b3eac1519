//! Reminder gate: verification/subscription/quota/balance preconditions,
//! the cooldown window with its live delivery-status probe, and the
//! dispatch bookkeeping.

mod common;

use ledger_server::auth::StoreAccess;
use ledger_server::db::repository::{reminder as reminder_repo, store};
use ledger_server::services::reminder::{self, DenyReason, ReminderDecision};
use ledger_server::services::ledger;
use shared::Money;
use shared::models::{DeliveryStatus, ReminderSend, SubscriptionPlan, TxnCreate, TxnKind};

async fn give_debt(env: &common::TestEnv, store_id: i64, debtor_id: i64, cents: i64) {
    let access = StoreAccess::owner();
    ledger::apply_transaction(
        &env.pool,
        store_id,
        &access,
        "Owner",
        TxnCreate {
            debtor_id,
            kind: TxnKind::Debt,
            amount: Money::from_cents(cents),
            description: None,
        },
    )
    .await
    .unwrap();
}

async fn check(env: &common::TestEnv, store_id: i64, debtor_id: i64) -> ReminderDecision {
    reminder::check_send(&env.pool, env.sms.as_ref(), &env.config, store_id, debtor_id)
        .await
        .unwrap()
}

#[tokio::test]
async fn gate_denies_each_precondition_in_turn() {
    let env = common::setup().await;
    let owner = common::seed_identity(&env.pool, "Owner", Some("992900001000")).await;
    let shop = common::seed_store(&env.pool, owner).await;
    let debtor = common::seed_debtor(&env.pool, shop.id, owner).await;

    // Unverified store.
    assert_eq!(
        check(&env, shop.id, debtor.id).await,
        ReminderDecision::Deny(DenyReason::VerificationRequired)
    );

    // Verified but no active subscription.
    store::set_verified(&env.pool, shop.id, true).await.unwrap();
    assert_eq!(
        check(&env, shop.id, debtor.id).await,
        ReminderDecision::Deny(DenyReason::SubscriptionExpired)
    );

    // Subscription in the past.
    let past = shared::util::now_millis() - 1_000;
    store::apply_subscription(&env.pool, shop.id, SubscriptionPlan::Standard, past)
        .await
        .unwrap();
    assert_eq!(
        check(&env, shop.id, debtor.id).await,
        ReminderDecision::Deny(DenyReason::SubscriptionExpired)
    );

    // Active subscription, but nothing owed yet.
    common::activate_store(&env.pool, shop.id).await;
    assert_eq!(
        check(&env, shop.id, debtor.id).await,
        ReminderDecision::Deny(DenyReason::NothingOwed)
    );

    // Quota exhausted.
    give_debt(&env, shop.id, debtor.id, 120_00).await;
    for _ in 0..100 {
        store::increment_sms_used(&env.pool, shop.id).await.unwrap();
    }
    assert_eq!(
        check(&env, shop.id, debtor.id).await,
        ReminderDecision::Deny(DenyReason::QuotaExhausted)
    );
}

#[tokio::test]
async fn dispatch_records_log_and_consumes_quota() {
    let env = common::setup().await;
    let owner = common::seed_identity(&env.pool, "Owner", Some("992900001001")).await;
    let shop = common::seed_store(&env.pool, owner).await;
    let debtor = common::seed_debtor(&env.pool, shop.id, owner).await;
    common::activate_store(&env.pool, shop.id).await;
    give_debt(&env, shop.id, debtor.id, 80_00).await;

    let message_id = reminder::send_reminder(
        &env.pool,
        env.sms.as_ref(),
        &env.config,
        shop.id,
        &ReminderSend { debtor_id: debtor.id },
    )
    .await
    .unwrap();

    let sent = env.sms.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message_id, message_id);
    // Statement text carries the store name, the amount, and the link.
    assert!(sent[0].body.contains("Test Store"));
    assert!(sent[0].body.contains("80"));
    assert!(sent[0].body.contains(&format!("/debtor/{}", debtor.id)));

    let after = store::find_by_id(&env.pool, shop.id).await.unwrap().unwrap();
    assert_eq!(after.sms_used, 1);
    let log = reminder_repo::latest_for_debtor(&env.pool, shop.id, debtor.id)
        .await
        .unwrap()
        .expect("dispatch logged");
    assert_eq!(log.message_id, message_id);
}

#[tokio::test]
async fn cooldown_blocks_unless_the_last_send_failed() {
    let env = common::setup().await;
    let owner = common::seed_identity(&env.pool, "Owner", Some("992900001002")).await;
    let shop = common::seed_store(&env.pool, owner).await;
    let debtor = common::seed_debtor(&env.pool, shop.id, owner).await;
    common::activate_store(&env.pool, shop.id).await;
    give_debt(&env, shop.id, debtor.id, 55_00).await;

    let message_id = reminder::send_reminder(
        &env.pool,
        env.sms.as_ref(),
        &env.config,
        shop.id,
        &ReminderSend { debtor_id: debtor.id },
    )
    .await
    .unwrap();

    // Unknown status (no report yet) still blocks inside the window.
    assert_eq!(
        check(&env, shop.id, debtor.id).await,
        ReminderDecision::Deny(DenyReason::CooldownActive)
    );

    env.sms.set_status(&message_id, DeliveryStatus::Delivered);
    assert_eq!(
        check(&env, shop.id, debtor.id).await,
        ReminderDecision::Deny(DenyReason::CooldownActive)
    );

    env.sms.set_status(&message_id, DeliveryStatus::Pending);
    assert_eq!(
        check(&env, shop.id, debtor.id).await,
        ReminderDecision::Deny(DenyReason::CooldownActive)
    );

    // A demonstrably failed message frees the slot.
    env.sms.set_status(&message_id, DeliveryStatus::Failed);
    assert_eq!(check(&env, shop.id, debtor.id).await, ReminderDecision::Allow);

    // The deny path maps to a rate-limit error for callers.
    env.sms.set_status(&message_id, DeliveryStatus::Delivered);
    let err = reminder::send_reminder(
        &env.pool,
        env.sms.as_ref(),
        &env.config,
        shop.id,
        &ReminderSend { debtor_id: debtor.id },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ledger_server::AppError::RateLimited(_)));
}

#[tokio::test]
async fn old_dispatches_outside_the_window_do_not_block() {
    let env = common::setup().await;
    let owner = common::seed_identity(&env.pool, "Owner", Some("992900001003")).await;
    let shop = common::seed_store(&env.pool, owner).await;
    let debtor = common::seed_debtor(&env.pool, shop.id, owner).await;
    common::activate_store(&env.pool, shop.id).await;
    give_debt(&env, shop.id, debtor.id, 70_00).await;

    // Backdate a dispatch log to four days ago (window is three).
    reminder_repo::insert(&env.pool, shop.id, debtor.id, "old-msg", "PENDING")
        .await
        .unwrap();
    let four_days_ago = shared::util::now_millis() - 4 * 24 * 60 * 60 * 1000;
    sqlx::query("UPDATE reminder_log SET created_at = ? WHERE message_id = 'old-msg'")
        .bind(four_days_ago)
        .execute(&env.pool)
        .await
        .unwrap();

    assert_eq!(check(&env, shop.id, debtor.id).await, ReminderDecision::Allow);
}
