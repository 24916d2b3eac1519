//! Shared types for the Daftar ledger platform
//!
//! Common types used by the ledger server (and any future clients):
//! data models, the exact-cents money type, and ID/time utilities.

pub mod models;
pub mod money;
pub mod util;

// Re-exports
pub use money::Money;
pub use serde::{Deserialize, Serialize};
