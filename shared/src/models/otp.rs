//! OTP Model

use serde::{Deserialize, Serialize};

/// Login challenge. `phone` is the primary key, so a phone has at most
/// one active code and a new request overwrites the old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OtpChallenge {
    pub phone: String,
    pub code: String,
    pub expires_at: i64,
}

/// Request code payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRequest {
    pub phone: String,
}

/// Verify code payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpVerify {
    pub phone: String,
    pub code: String,
}
