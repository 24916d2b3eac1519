//! OTP Login Service
//!
//! Issuance is rate limited by two independent windows counted over the
//! persisted request log — per source address and per destination phone —
//! both checked before any code is generated. A phone holds at most one
//! active code; requesting again overwrites it. Verification consumes the
//! code (one-time use) and resolves the canonical identity for the phone.

use rand::Rng;
use shared::models::Identity;
use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::repository::otp;
use crate::services::identity;
use crate::services::sms::SmsProvider;
use crate::utils::time::{hours_ms, minutes_ms};
use crate::utils::validation::normalize_phone;
use crate::utils::{AppError, AppResult};

fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

/// Issue a login code and dispatch it.
///
/// The reviewer/test phone gets a fixed long-lived code and no real
/// dispatch, so app-store review accounts work without SMS traffic.
/// Gateway failure aborts the attempt: the error surfaces and nothing is
/// counted against the limiter.
pub async fn request_code(
    pool: &SqlitePool,
    sms: &dyn SmsProvider,
    config: &Config,
    phone_raw: &str,
    source: &str,
) -> AppResult<()> {
    let phone = normalize_phone(phone_raw, &config.country_code)?;

    if phone == config.test_phone {
        let expires_at = shared::util::now_millis() + minutes_ms(config.test_otp_ttl_minutes);
        otp::upsert_challenge(pool, &phone, &config.test_code, expires_at).await?;
        tracing::warn!(phone = %phone, "Test account login code issued");
        return Ok(());
    }

    let now = shared::util::now_millis();

    let from_source =
        otp::count_by_source_since(pool, source, now - hours_ms(config.otp_source_window_hours))
            .await?;
    if from_source >= config.otp_source_limit {
        return Err(AppError::rate_limited(
            "Too many requests from this device. Please try again later.",
        ));
    }

    let to_phone =
        otp::count_by_phone_since(pool, &phone, now - hours_ms(config.otp_phone_window_hours))
            .await?;
    if to_phone >= config.otp_phone_limit {
        return Err(AppError::rate_limited(
            "SMS limit reached for this number. Please wait and retry.",
        ));
    }

    let code = generate_code();
    let expires_at = now + minutes_ms(config.otp_ttl_minutes);
    otp::upsert_challenge(pool, &phone, &code, expires_at).await?;

    let body = format!("Коди тасдиқ барои воридшавӣ: {code}. Ба ҳеҷ кас надиҳед!");
    sms.send(&phone, &body).await?;

    otp::log_request(pool, &phone, source).await?;
    Ok(())
}

/// Verify a code. On success the challenge is deleted and the canonical
/// identity for the phone is returned, created if the phone is new.
pub async fn verify_code(
    pool: &SqlitePool,
    config: &Config,
    phone_raw: &str,
    code: &str,
) -> AppResult<Identity> {
    let phone = normalize_phone(phone_raw, &config.country_code)?;
    let now = shared::util::now_millis();

    let consumed = otp::take_challenge(pool, &phone, code, now).await?;
    if !consumed {
        return Err(AppError::CodeExpiredOrInvalid);
    }

    identity::find_or_create_by_phone(pool, &phone).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..64 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
