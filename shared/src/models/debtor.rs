//! Debtor Model

use serde::{Deserialize, Serialize};

use crate::models::Txn;
use crate::money::Money;

/// Debtor row. `balance` always equals the signed sum of the debtor's
/// live transactions; it is only ever changed by SQL delta updates inside
/// the same storage transaction that writes or removes a `txn` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Debtor {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub balance: Money,
    /// Identity that created the record.
    pub created_by: i64,
    pub last_activity: i64,
}

/// Create debtor payload. New debtors start at balance zero; opening
/// debt is recorded as a regular transaction so the ledger invariant
/// holds from the first row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtorCreate {
    pub name: String,
    pub phone: Option<String>,
}

/// Update debtor contact details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtorUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Debtor plus transaction history, newest first (ledger list view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtorWithTransactions {
    #[serde(flatten)]
    pub debtor: Debtor,
    pub transactions: Vec<Txn>,
}

/// Unauthenticated statement for the debtor-facing page: no phone, no
/// actor identities, just the store name and the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicDebtorView {
    pub id: i64,
    pub name: String,
    pub balance: Money,
    pub store_name: String,
    pub transactions: Vec<Txn>,
}
