//! Store Access Resolver
//!
//! Answers one question before every mutating call: what may this
//! identity do in this store? Owner ⇒ everything; collaborator ⇒ exactly
//! the stored permission bits; anyone else ⇒ nothing. Pure read, no side
//! effects.

use shared::models::Permissions;
use sqlx::SqlitePool;

use crate::db::repository::{collaborator, store};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreAccess {
    pub has_access: bool,
    pub is_owner: bool,
    pub permissions: Permissions,
}

impl StoreAccess {
    pub fn owner() -> Self {
        Self {
            has_access: true,
            is_owner: true,
            permissions: Permissions::full(),
        }
    }

    pub fn collaborator(permissions: Permissions) -> Self {
        Self {
            has_access: true,
            is_owner: false,
            permissions,
        }
    }

    pub fn none() -> Self {
        Self {
            has_access: false,
            is_owner: false,
            permissions: Permissions::none(),
        }
    }
}

pub async fn resolve_access(
    pool: &SqlitePool,
    store_id: i64,
    identity_id: i64,
) -> AppResult<StoreAccess> {
    if let Some(owner) = store::owner_identity(pool, store_id).await?
        && owner == identity_id
    {
        return Ok(StoreAccess::owner());
    }

    if let Some(grant) = collaborator::find(pool, store_id, identity_id).await? {
        return Ok(StoreAccess::collaborator(grant.permissions()));
    }

    Ok(StoreAccess::none())
}

/// Resolve and require membership (owner or collaborator).
pub async fn require_access(
    pool: &SqlitePool,
    store_id: i64,
    identity_id: i64,
) -> AppResult<StoreAccess> {
    let access = resolve_access(pool, store_id, identity_id).await?;
    if !access.has_access {
        return Err(AppError::access_denied("Access denied to this store"));
    }
    Ok(access)
}

/// Resolve and require ownership.
pub async fn require_owner(
    pool: &SqlitePool,
    store_id: i64,
    identity_id: i64,
) -> AppResult<StoreAccess> {
    let access = resolve_access(pool, store_id, identity_id).await?;
    if !access.is_owner {
        return Err(AppError::access_denied("Only the store owner may do this"));
    }
    Ok(access)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::TxnKind;

    #[test]
    fn owner_gets_full_bits() {
        let access = StoreAccess::owner();
        assert!(access.has_access && access.is_owner);
        assert!(access.permissions.allows(TxnKind::Debt));
        assert!(access.permissions.can_delete_debtor);
    }

    #[test]
    fn collaborator_gets_exactly_stored_bits() {
        let access = StoreAccess::collaborator(Permissions {
            can_add_debt: false,
            can_add_payment: true,
            can_delete_debtor: false,
        });
        assert!(access.has_access);
        assert!(!access.is_owner);
        assert!(!access.permissions.allows(TxnKind::Debt));
        assert!(access.permissions.allows(TxnKind::Payment));
    }

    #[test]
    fn stranger_gets_nothing() {
        let access = StoreAccess::none();
        assert!(!access.has_access);
        assert!(!access.permissions.allows(TxnKind::Debt));
    }
}
