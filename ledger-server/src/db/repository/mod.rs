//! Repository Module
//!
//! CRUD operations per table as free async functions over a `SqlitePool`
//! (or any `SqliteExecutor`, so the same helpers compose inside storage
//! transactions).

// Identities & access
pub mod collaborator;
pub mod identity;
pub mod store;

// Ledger
pub mod debtor;
pub mod txn;

// Billing & verification
pub mod invoice;
pub mod verification;

// Messaging
pub mod otp;
pub mod outbox;
pub mod reminder;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
