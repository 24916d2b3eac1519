//! Store Model

use serde::{Deserialize, Serialize};

use crate::models::Permissions;
use crate::money::Money;

/// Subscription tier. TRIAL is granted on verification approval;
/// STANDARD and PRO are purchased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum SubscriptionPlan {
    Free,
    Trial,
    Standard,
    Pro,
}

impl SubscriptionPlan {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "FREE",
            SubscriptionPlan::Trial => "TRIAL",
            SubscriptionPlan::Standard => "STANDARD",
            SubscriptionPlan::Pro => "PRO",
        }
    }

    /// Monthly reminder-message allotment for the plan.
    pub fn sms_quota(self) -> i64 {
        match self {
            SubscriptionPlan::Free => 0,
            SubscriptionPlan::Trial | SubscriptionPlan::Standard => 100,
            SubscriptionPlan::Pro => 300,
        }
    }

    /// Price of one billing period, for purchasable plans only.
    pub fn price(self) -> Option<Money> {
        match self {
            SubscriptionPlan::Standard => Some(Money::from_cents(15_00)),
            SubscriptionPlan::Pro => Some(Money::from_cents(25_00)),
            _ => None,
        }
    }
}

/// Store (tenant) row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub owner_identity_id: i64,
    pub is_verified: bool,
    pub subscription_plan: SubscriptionPlan,
    pub subscription_end_at: Option<i64>,
    pub sms_quota: i64,
    pub sms_used: i64,
    pub created_at: i64,
}

impl Store {
    pub fn subscription_active(&self, now: i64) -> bool {
        self.subscription_end_at.is_some_and(|end| end > now)
    }

    pub fn quota_exhausted(&self) -> bool {
        self.sms_used >= self.sms_quota
    }
}

/// Create store payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCreate {
    pub name: String,
}

/// Store as seen by a caller: row fields plus the caller's standing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreView {
    #[serde(flatten)]
    pub store: Store,
    pub is_owner: bool,
    /// Latest verification request status, or "NONE".
    pub verification_status: String,
    pub permissions: Permissions,
}
