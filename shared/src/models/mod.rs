//! Data models
//!
//! Shared between the ledger server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), all timestamps are
//! Unix millis.

pub mod collaborator;
pub mod debtor;
pub mod identity;
pub mod invoice;
pub mod otp;
pub mod reminder;
pub mod store;
pub mod transaction;
pub mod verification;

// Re-exports
pub use collaborator::*;
pub use debtor::*;
pub use identity::*;
pub use invoice::*;
pub use otp::*;
pub use reminder::*;
pub use store::*;
pub use transaction::*;
pub use verification::*;
