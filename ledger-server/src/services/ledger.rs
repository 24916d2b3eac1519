//! Ledger Service
//!
//! Balance-changing operations. Every mutation runs inside one storage
//! transaction, and the debtor balance is only ever moved by SQL delta
//! updates — two collaborators recording at the same moment serialize at
//! the database, neither update is lost, and each `txn` row carries the
//! post-update balance it observed.

use shared::Money;
use shared::models::{
    Debtor, DebtorCreate, DebtorUpdate, DebtorWithTransactions, PublicDebtorView, Txn, TxnCreate,
};
use sqlx::SqlitePool;

use crate::auth::{StoreAccess, resolve_access};
use crate::db::repository::{debtor, txn};
use crate::utils::{AppError, AppResult};

/// Record a DEBT or PAYMENT against a debtor and return the written row.
///
/// Requires the permission bit matching the transaction kind. Overpayment
/// (a negative resulting balance) is a legal business state.
pub async fn apply_transaction(
    pool: &SqlitePool,
    store_id: i64,
    access: &StoreAccess,
    actor: &str,
    req: TxnCreate,
) -> AppResult<Txn> {
    if !access.permissions.allows(req.kind) {
        return Err(AppError::access_denied(match req.kind {
            shared::models::TxnKind::Debt => "Permission denied: cannot add debt",
            shared::models::TxnKind::Payment => "Permission denied: cannot add payment",
        }));
    }
    if !req.amount.is_positive() {
        return Err(AppError::validation("Amount must be positive"));
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let updated = debtor::adjust_balance(
        &mut *tx,
        req.debtor_id,
        store_id,
        req.kind.signed(req.amount),
        now,
    )
    .await?;
    if updated == 0 {
        return Err(AppError::not_found(format!(
            "Debtor {} not found in this store",
            req.debtor_id
        )));
    }

    let balance_after = debtor::balance(&mut *tx, req.debtor_id).await?;
    let record = Txn {
        id: shared::util::snowflake_id(),
        debtor_id: req.debtor_id,
        kind: req.kind,
        amount: req.amount,
        description: req.description,
        actor: actor.to_string(),
        balance_after,
        created_at: now,
    };
    txn::insert(&mut *tx, &record).await?;

    tx.commit().await?;
    Ok(record)
}

/// Undo a transaction: apply the inverse delta and delete the row, in one
/// storage transaction. Authorized by the same permission bit that
/// guards recording the transaction's kind.
pub async fn reverse_transaction(
    pool: &SqlitePool,
    identity_id: i64,
    txn_id: i64,
) -> AppResult<Money> {
    let mut tx = pool.begin().await?;

    let (record, store_id) = txn::find_with_store(&mut *tx, txn_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Transaction {txn_id} not found")))?;

    let access = resolve_access(pool, store_id, identity_id).await?;
    if !access.has_access {
        return Err(AppError::access_denied("Access denied to this store"));
    }
    if !access.permissions.allows(record.kind) {
        return Err(AppError::access_denied(
            "Permission denied: cannot undo this transaction",
        ));
    }

    let now = shared::util::now_millis();
    debtor::adjust_balance(
        &mut *tx,
        record.debtor_id,
        store_id,
        -record.kind.signed(record.amount),
        now,
    )
    .await?;
    txn::delete(&mut *tx, txn_id).await?;
    let balance = debtor::balance(&mut *tx, record.debtor_id).await?;

    tx.commit().await?;
    Ok(balance)
}

/// Remove a debtor and the whole transaction history behind it (FK
/// cascade). History is discarded, not reversed entry by entry.
pub async fn delete_debtor(
    pool: &SqlitePool,
    store_id: i64,
    access: &StoreAccess,
    debtor_id: i64,
) -> AppResult<()> {
    if !access.permissions.can_delete_debtor {
        return Err(AppError::access_denied(
            "Permission denied: cannot delete debtor",
        ));
    }
    let deleted = debtor::delete(pool, debtor_id, store_id).await?;
    if !deleted {
        return Err(AppError::not_found(format!(
            "Debtor {debtor_id} not found in this store"
        )));
    }
    Ok(())
}

pub async fn create_debtor(
    pool: &SqlitePool,
    store_id: i64,
    created_by: i64,
    data: DebtorCreate,
) -> AppResult<Debtor> {
    Ok(debtor::create(pool, store_id, created_by, data).await?)
}

pub async fn update_debtor(
    pool: &SqlitePool,
    store_id: i64,
    debtor_id: i64,
    data: DebtorUpdate,
) -> AppResult<Debtor> {
    Ok(debtor::update_contact(pool, debtor_id, store_id, data).await?)
}

/// Ledger view: every debtor in the store with its history attached,
/// newest activity first.
pub async fn list_debtors(
    pool: &SqlitePool,
    store_id: i64,
) -> AppResult<Vec<DebtorWithTransactions>> {
    let debtors = debtor::list_by_store(pool, store_id).await?;
    let ids: Vec<i64> = debtors.iter().map(|d| d.id).collect();
    let mut transactions = txn::list_by_debtors(pool, &ids).await?;

    let mut out: Vec<DebtorWithTransactions> = debtors
        .into_iter()
        .map(|debtor| DebtorWithTransactions {
            debtor,
            transactions: Vec::new(),
        })
        .collect();
    for record in transactions.drain(..) {
        if let Some(entry) = out.iter_mut().find(|d| d.debtor.id == record.debtor_id) {
            entry.transactions.push(record);
        }
    }
    Ok(out)
}

/// Unauthenticated statement for the debtor-facing page.
pub async fn public_view(pool: &SqlitePool, debtor_id: i64) -> AppResult<PublicDebtorView> {
    let record = debtor::find_by_id(pool, debtor_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Debtor {debtor_id} not found")))?;
    let store_name = debtor::store_name(pool, debtor_id)
        .await?
        .unwrap_or_else(|| "-".to_string());
    let transactions = txn::list_by_debtor(pool, debtor_id).await?;
    Ok(PublicDebtorView {
        id: record.id,
        name: record.name,
        balance: record.balance,
        store_name,
        transactions,
    })
}
