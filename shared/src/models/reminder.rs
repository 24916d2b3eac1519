//! Reminder Dispatch Model

use serde::{Deserialize, Serialize};

/// Delivery state reported by the SMS gateway for a dispatched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Failed,
    Unknown,
}

/// Dispatch log row, used for cooldown lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReminderLog {
    pub id: i64,
    pub store_id: i64,
    pub debtor_id: i64,
    /// Provider message id, used for later status queries.
    pub message_id: String,
    /// Last status string as recorded at dispatch time.
    pub status: String,
    pub created_at: i64,
}

/// Send reminder payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSend {
    pub debtor_id: i64,
}

/// Outbox row for decoupled best-effort notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OutboxMessage {
    pub id: i64,
    pub phone: String,
    pub body: String,
    pub attempts: i64,
    pub sent_at: Option<i64>,
    pub created_at: i64,
}
