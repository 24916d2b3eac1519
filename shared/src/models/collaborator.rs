//! Collaborator Model

use serde::{Deserialize, Serialize};

use crate::models::TxnKind;

/// Per-collaborator permission bits. Owners hold `full()` implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub can_add_debt: bool,
    pub can_add_payment: bool,
    pub can_delete_debtor: bool,
}

impl Permissions {
    pub fn full() -> Self {
        Self {
            can_add_debt: true,
            can_add_payment: true,
            can_delete_debtor: true,
        }
    }

    pub fn none() -> Self {
        Self {
            can_add_debt: false,
            can_add_payment: false,
            can_delete_debtor: false,
        }
    }

    /// The bit that authorizes recording a transaction of `kind`.
    /// Reversal is guarded by the same bit as creation.
    pub fn allows(&self, kind: TxnKind) -> bool {
        match kind {
            TxnKind::Debt => self.can_add_debt,
            TxnKind::Payment => self.can_add_payment,
        }
    }
}

impl Default for Permissions {
    fn default() -> Self {
        // Matches the grant defaults: record rights on, delete off.
        Self {
            can_add_debt: true,
            can_add_payment: true,
            can_delete_debtor: false,
        }
    }
}

/// Collaborator grant row. `(store_id, identity_id)` is UNIQUE.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Collaborator {
    pub id: i64,
    pub store_id: i64,
    pub identity_id: i64,
    pub can_add_debt: bool,
    pub can_add_payment: bool,
    pub can_delete_debtor: bool,
    pub created_at: i64,
}

impl Collaborator {
    pub fn permissions(&self) -> Permissions {
        Permissions {
            can_add_debt: self.can_add_debt,
            can_add_payment: self.can_add_payment,
            can_delete_debtor: self.can_delete_debtor,
        }
    }
}

/// Grant joined with the collaborator's profile (list view).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CollaboratorWithProfile {
    pub id: i64,
    pub store_id: i64,
    pub identity_id: i64,
    pub can_add_debt: bool,
    pub can_add_payment: bool,
    pub can_delete_debtor: bool,
    pub display_name: Option<String>,
    pub username: Option<String>,
}

/// Add collaborator payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorCreate {
    pub identity_id: i64,
    pub permissions: Permissions,
}
