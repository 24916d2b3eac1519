//! Ledger correctness: the debtor balance always equals the signed sum of
//! its live transactions, under sequences, reversals, concurrency, and
//! permission failures.

mod common;

use ledger_server::auth::StoreAccess;
use ledger_server::db::repository::{debtor, txn};
use ledger_server::services::ledger;
use ledger_server::AppError;
use shared::Money;
use shared::models::{Permissions, TxnCreate, TxnKind};

fn debt(debtor_id: i64, cents: i64) -> TxnCreate {
    TxnCreate {
        debtor_id,
        kind: TxnKind::Debt,
        amount: Money::from_cents(cents),
        description: None,
    }
}

fn payment(debtor_id: i64, cents: i64) -> TxnCreate {
    TxnCreate {
        debtor_id,
        kind: TxnKind::Payment,
        amount: Money::from_cents(cents),
        description: None,
    }
}

async fn assert_invariant(pool: &sqlx::SqlitePool, debtor_id: i64) {
    let balance = debtor::balance(pool, debtor_id).await.unwrap();
    let sum = txn::signed_sum(pool, debtor_id).await.unwrap();
    assert_eq!(balance.cents(), sum, "balance diverged from ledger sum");
}

#[tokio::test]
async fn balance_equals_signed_sum_through_apply_and_reverse() {
    let env = common::setup().await;
    let owner = common::seed_identity(&env.pool, "Owner", Some("992900000001")).await;
    let store = common::seed_store(&env.pool, owner).await;
    let record = common::seed_debtor(&env.pool, store.id, owner).await;
    let access = StoreAccess::owner();

    let mut reversible = Vec::new();
    for (kind_cents, is_debt) in [(12_50, true), (40_00, true), (7_25, false), (100_00, true)] {
        let req = if is_debt {
            debt(record.id, kind_cents)
        } else {
            payment(record.id, kind_cents)
        };
        let written = ledger::apply_transaction(&env.pool, store.id, &access, "Owner", req)
            .await
            .unwrap();
        reversible.push(written.id);
        assert_invariant(&env.pool, record.id).await;
    }

    ledger::reverse_transaction(&env.pool, owner, reversible[1])
        .await
        .unwrap();
    assert_invariant(&env.pool, record.id).await;

    ledger::reverse_transaction(&env.pool, owner, reversible[2])
        .await
        .unwrap();
    assert_invariant(&env.pool, record.id).await;
}

#[tokio::test]
async fn reverse_then_reapply_restores_balance_exactly() {
    let env = common::setup().await;
    let owner = common::seed_identity(&env.pool, "Owner", None).await;
    let store = common::seed_store(&env.pool, owner).await;
    let record = common::seed_debtor(&env.pool, store.id, owner).await;
    let access = StoreAccess::owner();

    ledger::apply_transaction(&env.pool, store.id, &access, "Owner", debt(record.id, 300_00))
        .await
        .unwrap();
    let target = ledger::apply_transaction(
        &env.pool,
        store.id,
        &access,
        "Owner",
        payment(record.id, 80_00),
    )
    .await
    .unwrap();

    let before = debtor::balance(&env.pool, record.id).await.unwrap();
    ledger::reverse_transaction(&env.pool, owner, target.id)
        .await
        .unwrap();
    let reapplied = ledger::apply_transaction(
        &env.pool,
        store.id,
        &access,
        "Owner",
        payment(record.id, 80_00),
    )
    .await
    .unwrap();

    assert_eq!(debtor::balance(&env.pool, record.id).await.unwrap(), before);
    assert_eq!(reapplied.balance_after, before);
    assert_invariant(&env.pool, record.id).await;
}

#[tokio::test]
async fn concurrent_applies_lose_no_update() {
    let env = common::setup().await;
    let owner = common::seed_identity(&env.pool, "Owner", None).await;
    let store = common::seed_store(&env.pool, owner).await;
    let record = common::seed_debtor(&env.pool, store.id, owner).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let pool = env.pool.clone();
        let store_id = store.id;
        let debtor_id = record.id;
        handles.push(tokio::spawn(async move {
            let access = StoreAccess::owner();
            ledger::apply_transaction(&pool, store_id, &access, "Owner", debt(debtor_id, 10_00))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let balance = debtor::balance(&env.pool, record.id).await.unwrap();
    assert_eq!(balance, Money::from_cents(100_00), "an update was lost");
    assert_invariant(&env.pool, record.id).await;
}

#[tokio::test]
async fn full_scenario_debt_payment_reverse_delete() {
    let env = common::setup().await;
    let owner = common::seed_identity(&env.pool, "Owner", None).await;
    let store = common::seed_store(&env.pool, owner).await;
    let record = common::seed_debtor(&env.pool, store.id, owner).await;
    let access = StoreAccess::owner();

    let first = ledger::apply_transaction(&env.pool, store.id, &access, "Owner", debt(record.id, 200_00))
        .await
        .unwrap();
    assert_eq!(first.balance_after, Money::from_cents(200_00));

    let second = ledger::apply_transaction(
        &env.pool,
        store.id,
        &access,
        "Owner",
        payment(record.id, 50_00),
    )
    .await
    .unwrap();
    assert_eq!(second.balance_after, Money::from_cents(150_00));

    let restored = ledger::reverse_transaction(&env.pool, owner, second.id)
        .await
        .unwrap();
    assert_eq!(restored, Money::from_cents(200_00));

    ledger::delete_debtor(&env.pool, store.id, &access, record.id)
        .await
        .unwrap();
    assert!(debtor::find_by_id(&env.pool, record.id).await.unwrap().is_none());
    assert!(txn::list_by_debtor(&env.pool, record.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn permission_bits_guard_apply_and_reverse() {
    let env = common::setup().await;
    let owner = common::seed_identity(&env.pool, "Owner", None).await;
    let helper = common::seed_identity(&env.pool, "Helper", None).await;
    let store = common::seed_store(&env.pool, owner).await;
    let record = common::seed_debtor(&env.pool, store.id, owner).await;

    let payment_only = Permissions {
        can_add_debt: false,
        can_add_payment: true,
        can_delete_debtor: false,
    };
    ledger_server::db::repository::collaborator::add(&env.pool, store.id, helper, payment_only)
        .await
        .unwrap();
    let access = StoreAccess::collaborator(payment_only);

    // Creation: DEBT denied, PAYMENT allowed.
    let err = ledger::apply_transaction(&env.pool, store.id, &access, "Helper", debt(record.id, 10_00))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AccessDenied(_)));

    let owner_access = StoreAccess::owner();
    let debt_row =
        ledger::apply_transaction(&env.pool, store.id, &owner_access, "Owner", debt(record.id, 90_00))
            .await
            .unwrap();
    let pay_row = ledger::apply_transaction(
        &env.pool,
        store.id,
        &access,
        "Helper",
        payment(record.id, 30_00),
    )
    .await
    .unwrap();

    // Reversal mirrors creation rights: the helper may undo the PAYMENT
    // but not the DEBT.
    let err = ledger::reverse_transaction(&env.pool, helper, debt_row.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AccessDenied(_)));
    ledger::reverse_transaction(&env.pool, helper, pay_row.id)
        .await
        .unwrap();
    assert_invariant(&env.pool, record.id).await;

    // Deletion needs its own bit.
    let err = ledger::delete_debtor(&env.pool, store.id, &access, record.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AccessDenied(_)));
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let env = common::setup().await;
    let owner = common::seed_identity(&env.pool, "Owner", None).await;
    let store = common::seed_store(&env.pool, owner).await;
    let record = common::seed_debtor(&env.pool, store.id, owner).await;
    let access = StoreAccess::owner();

    for cents in [0, -5_00] {
        let err =
            ledger::apply_transaction(&env.pool, store.id, &access, "Owner", debt(record.id, cents))
                .await
                .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    // Sub-cent precision never gets past deserialization.
    let parsed: Result<TxnCreate, _> = serde_json::from_str(
        r#"{"debtorId": 1, "kind": "DEBT", "amount": 10.005, "description": null}"#,
    );
    assert!(parsed.is_err());
}

#[tokio::test]
async fn overpayment_is_a_legal_negative_balance() {
    let env = common::setup().await;
    let owner = common::seed_identity(&env.pool, "Owner", None).await;
    let store = common::seed_store(&env.pool, owner).await;
    let record = common::seed_debtor(&env.pool, store.id, owner).await;
    let access = StoreAccess::owner();

    ledger::apply_transaction(&env.pool, store.id, &access, "Owner", debt(record.id, 50_00))
        .await
        .unwrap();
    let row = ledger::apply_transaction(
        &env.pool,
        store.id,
        &access,
        "Owner",
        payment(record.id, 75_00),
    )
    .await
    .unwrap();

    assert_eq!(row.balance_after, Money::from_cents(-25_00));
    assert_invariant(&env.pool, record.id).await;
}
