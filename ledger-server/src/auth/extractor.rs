//! Caller Extraction
//!
//! The fronting layer (bot gateway / web session) authenticates the user
//! and forwards the identity and active store as headers, mirroring the
//! platform convention:
//!
//! - `X-Identity-Id` — acting identity
//! - `X-Store-Id` — store the request operates on

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::utils::AppError;

pub const IDENTITY_HEADER: &str = "x-identity-id";
pub const STORE_HEADER: &str = "x-store-id";

/// Caller context extracted from request headers. Routes that require an
/// identity or a store call the corresponding accessor.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    identity_id: Option<i64>,
    store_id: Option<i64>,
}

impl Caller {
    pub fn identity(&self) -> Result<i64, AppError> {
        self.identity_id.ok_or(AppError::Unauthorized)
    }

    pub fn store(&self) -> Result<i64, AppError> {
        self.store_id
            .ok_or_else(|| AppError::validation("X-Store-Id header is required"))
    }
}

fn header_i64(parts: &Parts, name: &str) -> Option<i64> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller {
            identity_id: header_i64(parts, IDENTITY_HEADER),
            store_id: header_i64(parts, STORE_HEADER),
        })
    }
}
