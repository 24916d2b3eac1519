//! Invoice Model

use serde::{Deserialize, Serialize};

use crate::models::SubscriptionPlan;
use crate::money::Money;

/// PENDING → PAID is the only allowed transition; PAID is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

/// Subscription invoice row. `order_id` is UNIQUE and is the key the
/// payment provider echoes back in its webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: i64,
    pub store_id: i64,
    pub order_id: String,
    /// Provider-side invoice/payment reference, once known.
    pub external_id: Option<String>,
    pub amount: Money,
    pub plan: SubscriptionPlan,
    pub status: InvoiceStatus,
    pub created_at: i64,
}

/// Payment-provider webhook body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub order_id: String,
    pub payment_id: String,
    pub amount: Money,
    #[serde(default)]
    pub payment_date: Option<String>,
}
