//! Notification Outbox Worker
//!
//! Delivers best-effort notifications committed by other flows (e.g. the
//! post-payment confirmation). Failures are logged and retried up to the
//! configured attempt cap; they never propagate anywhere.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::db::repository::outbox;
use crate::services::sms::SmsProvider;
use crate::utils::AppResult;

const BATCH_SIZE: i64 = 20;

/// One drain pass. Returns how many messages went out.
pub async fn drain_once(
    pool: &SqlitePool,
    sms: &Arc<dyn SmsProvider>,
    max_attempts: i64,
) -> AppResult<usize> {
    let pending = outbox::fetch_unsent(pool, max_attempts, BATCH_SIZE).await?;
    let mut sent = 0;

    for message in pending {
        match sms.send(&message.phone, &message.body).await {
            Ok(message_id) => {
                outbox::mark_sent(pool, message.id).await?;
                tracing::debug!(outbox_id = message.id, %message_id, "Notification delivered");
                sent += 1;
            }
            Err(e) => {
                outbox::bump_attempts(pool, message.id).await?;
                tracing::warn!(
                    outbox_id = message.id,
                    attempts = message.attempts + 1,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        }
    }

    Ok(sent)
}
