//! Verification Request Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

/// Store verification request row. Document bytes live with the
/// presentation layer; the engine keeps the metadata and the decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct VerificationRequest {
    pub id: i64,
    pub store_id: i64,
    /// Identity that submitted the request.
    pub identity_id: i64,
    pub document_type: String,
    /// Legal store name to apply on approval.
    pub requested_store_name: String,
    pub status: VerificationStatus,
    pub created_at: i64,
}

/// Submit verification payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSubmit {
    pub document_type: String,
    pub requested_store_name: String,
}

/// Back-office decision payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationDecision {
    pub status: VerificationStatus,
}
