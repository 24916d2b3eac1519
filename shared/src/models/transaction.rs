//! Transaction Model

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Signed transaction kind: DEBT increases the debtor's balance,
/// PAYMENT decreases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum TxnKind {
    Debt,
    Payment,
}

impl TxnKind {
    /// Balance delta this kind contributes for a (positive) amount.
    pub fn signed(self, amount: Money) -> Money {
        match self {
            TxnKind::Debt => amount,
            TxnKind::Payment => -amount,
        }
    }
}

/// Ledger transaction row. `balance_after` is the snapshot captured when
/// the row was written; it is never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Txn {
    pub id: i64,
    pub debtor_id: i64,
    pub kind: TxnKind,
    pub amount: Money,
    pub description: Option<String>,
    /// Display label of whoever recorded the entry.
    pub actor: String,
    pub balance_after: Money,
    pub created_at: i64,
}

/// Record transaction payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxnCreate {
    pub debtor_id: i64,
    pub kind: TxnKind,
    pub amount: Money,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_delta_follows_kind() {
        let amount = Money::from_cents(5000);
        assert_eq!(TxnKind::Debt.signed(amount), Money::from_cents(5000));
        assert_eq!(TxnKind::Payment.signed(amount), Money::from_cents(-5000));
    }
}
