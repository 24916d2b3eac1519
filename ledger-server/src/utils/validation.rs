//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so limits are applied
//! at the handler boundary.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: store, debtor, display names.
pub const MAX_NAME_LEN: usize = 200;

/// Notes and transaction descriptions.
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone numbers, document types.
pub const MAX_SHORT_TEXT_LEN: usize = 100;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

// ── Phone normalization ─────────────────────────────────────────────

/// Normalize a phone number to digits-only international form.
///
/// Nine-digit local numbers get the configured country prefix; a leading
/// "00" international escape is stripped.
pub fn normalize_phone(raw: &str, country_code: &str) -> Result<String, AppError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(AppError::validation("Phone number is required"));
    }

    let normalized = if digits.len() == 9 {
        format!("{country_code}{digits}")
    } else if let Some(rest) = digits.strip_prefix("00") {
        rest.to_string()
    } else {
        digits
    };

    if normalized.len() < 9 || normalized.len() > 15 {
        return Err(AppError::validation(format!(
            "Invalid phone number: {raw}"
        )));
    }
    Ok(normalized)
}
