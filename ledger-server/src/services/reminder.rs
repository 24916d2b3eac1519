//! Reminder Gate & Dispatch
//!
//! Whether a debt reminder may go out right now, and the dispatch that
//! records it. The cooldown check asks the gateway for the LIVE delivery
//! status of the last message on every evaluation — only a definitively
//! failed previous send frees the slot early.

use shared::models::{DeliveryStatus, ReminderSend};
use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::repository::{debtor, reminder, store};
use crate::services::sms::SmsProvider;
use crate::utils::time::days_ms;
use crate::utils::validation::normalize_phone;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderDecision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    VerificationRequired,
    SubscriptionExpired,
    QuotaExhausted,
    NothingOwed,
    CooldownActive,
}

impl DenyReason {
    pub fn into_error(self) -> AppError {
        match self {
            DenyReason::VerificationRequired => {
                AppError::access_denied("Store must be verified to send reminders")
            }
            DenyReason::SubscriptionExpired => {
                AppError::access_denied("Subscription has expired")
            }
            DenyReason::QuotaExhausted => {
                AppError::access_denied("Message quota for this period is exhausted")
            }
            DenyReason::NothingOwed => AppError::validation("No debt to remind about"),
            DenyReason::CooldownActive => {
                AppError::rate_limited("Only one reminder per debtor within the cooldown window")
            }
        }
    }
}

/// Policy gate: may a reminder for this debtor be dispatched now?
pub async fn check_send(
    pool: &SqlitePool,
    sms: &dyn SmsProvider,
    config: &Config,
    store_id: i64,
    debtor_id: i64,
) -> AppResult<ReminderDecision> {
    let now = shared::util::now_millis();

    let store = store::find_by_id(pool, store_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Store {store_id} not found")))?;
    if !store.is_verified {
        return Ok(ReminderDecision::Deny(DenyReason::VerificationRequired));
    }
    if !store.subscription_active(now) {
        return Ok(ReminderDecision::Deny(DenyReason::SubscriptionExpired));
    }
    if store.quota_exhausted() {
        return Ok(ReminderDecision::Deny(DenyReason::QuotaExhausted));
    }

    let record = debtor::find_in_store(pool, debtor_id, store_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Debtor {debtor_id} not found")))?;
    if !record.balance.is_positive() {
        return Ok(ReminderDecision::Deny(DenyReason::NothingOwed));
    }

    if let Some(last) = reminder::latest_for_debtor(pool, store_id, debtor_id).await?
        && now - last.created_at < days_ms(config.reminder_cooldown_days)
    {
        // A message that demonstrably failed does not occupy the window;
        // anything in flight (or unknowable) does.
        let status = sms.query_status(&last.message_id).await;
        if status != DeliveryStatus::Failed {
            return Ok(ReminderDecision::Deny(DenyReason::CooldownActive));
        }
    }

    Ok(ReminderDecision::Allow)
}

/// Gate, dispatch, and record. The dispatch log row and the quota
/// increment commit in one storage transaction after the gateway accepts
/// the message.
pub async fn send_reminder(
    pool: &SqlitePool,
    sms: &dyn SmsProvider,
    config: &Config,
    store_id: i64,
    req: &ReminderSend,
) -> AppResult<String> {
    if let ReminderDecision::Deny(reason) =
        check_send(pool, sms, config, store_id, req.debtor_id).await?
    {
        return Err(reason.into_error());
    }

    let store = store::find_by_id(pool, store_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Store {store_id} not found")))?;
    let record = debtor::find_in_store(pool, req.debtor_id, store_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Debtor {} not found", req.debtor_id)))?;

    let phone_raw = record
        .phone
        .as_deref()
        .ok_or_else(|| AppError::validation("Debtor has no phone number"))?;
    let phone = normalize_phone(phone_raw, &config.country_code)?;

    let link = format!("{}/debtor/{}", config.public_base_url, record.id);
    let body = format!(
        "Салом, қарзи Шумо аз {} {} сомонӣ. Лутфан сари вақт супоред. Пайванд: {}",
        store.name, record.balance, link
    );

    let message_id = sms.send(&phone, &body).await?;

    let mut tx = pool.begin().await?;
    reminder::insert(&mut *tx, store_id, record.id, &message_id, "PENDING").await?;
    store::increment_sms_used(&mut *tx, store_id).await?;
    tx.commit().await?;

    Ok(message_id)
}
