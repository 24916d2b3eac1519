//! Billing Service
//!
//! Subscription purchases and the payment-provider callback. The webhook
//! apply is one storage transaction: the idempotency check, the store
//! subscription update, the invoice flip to PAID, and the owner
//! notification enqueue commit together or not at all. A redelivered
//! callback therefore changes state exactly once.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use shared::Money;
use shared::models::{InvoiceStatus, SubscriptionPlan, VerificationStatus, WebhookPayload};
use sqlx::SqlitePool;

use crate::auth::require_owner;
use crate::core::Config;
use crate::db::repository::{invoice, outbox, store, verification};
use crate::utils::time::{days_ms, format_date};
use crate::utils::{AppError, AppResult};

// ========== Provider boundary ==========

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDraft {
    pub order_id: String,
    pub amount: Money,
    pub currency: String,
    pub description: String,
    pub customer_phone: String,
    pub return_url: String,
}

#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Register an invoice with the provider, returning the checkout URL.
    async fn create_invoice(&self, draft: &InvoiceDraft) -> AppResult<String>;
}

/// HTTP provider client: JSON POST with an `x-app-token` header; the
/// checkout URL key varies across provider versions, so several are
/// accepted.
pub struct HttpBillingProvider {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl HttpBillingProvider {
    pub fn from_config(config: &Config) -> Option<Self> {
        let token = config.billing_token.clone()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.provider_timeout_ms))
            .build()
            .ok()?;
        Some(Self {
            client,
            api_url: config.billing_api_url.clone(),
            token,
        })
    }
}

#[async_trait]
impl BillingProvider for HttpBillingProvider {
    async fn create_invoice(&self, draft: &InvoiceDraft) -> AppResult<String> {
        let response = self
            .client
            .post(&self.api_url)
            .header("x-app-token", &self.token)
            .json(draft)
            .send()
            .await
            .map_err(|e| AppError::provider(format!("Invoice create failed: {e}")))?;

        let status = response.status();
        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::provider(format!("Provider returned garbage: {e}")))?;

        let checkout_url = ["checkout_url", "url", "payment_url", "payment_link"]
            .iter()
            .find_map(|key| data.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string);

        match (status.is_success(), checkout_url) {
            (true, Some(url)) => Ok(url),
            _ => Err(AppError::provider(format!(
                "Provider rejected invoice: {data}"
            ))),
        }
    }
}

/// In-memory provider for tests and unconfigured environments.
#[derive(Default)]
pub struct MemoryBilling;

#[async_trait]
impl BillingProvider for MemoryBilling {
    async fn create_invoice(&self, draft: &InvoiceDraft) -> AppResult<String> {
        Ok(format!("https://checkout.invalid/{}", draft.order_id))
    }
}

// ========== Invoice creation ==========

/// Start a subscription purchase: owner-only, requires a verified phone.
/// Records a PENDING invoice keyed by a unique order id and returns the
/// provider checkout URL.
pub async fn create_subscription_invoice(
    pool: &SqlitePool,
    provider: &dyn BillingProvider,
    config: &Config,
    store_id: i64,
    identity_id: i64,
    plan: SubscriptionPlan,
) -> AppResult<String> {
    require_owner(pool, store_id, identity_id).await?;

    let amount = plan
        .price()
        .ok_or_else(|| AppError::validation(format!("Plan {} is not purchasable", plan.as_str())))?;

    let phone = store::owner_phone(pool, store_id)
        .await?
        .ok_or_else(|| AppError::validation("Phone number required"))?;
    // Provider expects the local number without the country prefix.
    let local_phone = phone
        .strip_prefix(config.country_code.as_str())
        .unwrap_or(&phone)
        .to_string();

    let order_id = format!("SUB_{store_id}_{}", shared::util::now_millis());
    let draft = InvoiceDraft {
        order_id: order_id.clone(),
        amount,
        currency: "TJS".to_string(),
        description: format!("Тарофаи {} (1 моҳ)", plan.as_str()),
        customer_phone: local_phone,
        return_url: config.billing_return_url.clone(),
    };

    let checkout_url = provider.create_invoice(&draft).await?;
    invoice::insert(pool, store_id, &order_id, None, amount, plan).await?;
    Ok(checkout_url)
}

// ========== Webhook reconciliation ==========

/// What a webhook delivery did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Subscription state was updated.
    Applied { store_id: i64, plan: SubscriptionPlan },
    /// Order id is not ours — acknowledged and skipped so the provider
    /// stops retrying a callback we can never process.
    UnknownOrder,
    /// Invoice already PAID — redelivery, acknowledged and skipped.
    AlreadyPaid,
}

pub async fn handle_webhook(
    pool: &SqlitePool,
    config: &Config,
    shared_secret: Option<&str>,
    payload: &WebhookPayload,
) -> AppResult<WebhookOutcome> {
    let expected = config
        .billing_token
        .as_deref()
        .ok_or_else(|| AppError::internal("Billing token not configured"))?;
    if shared_secret != Some(expected) {
        tracing::warn!(order_id = %payload.order_id, "Webhook with bad shared secret");
        return Err(AppError::Unauthorized);
    }

    let mut tx = pool.begin().await?;

    let Some(record) = invoice::find_by_order_id(&mut *tx, &payload.order_id).await? else {
        tracing::warn!(order_id = %payload.order_id, "Webhook for unknown order, skipping");
        return Ok(WebhookOutcome::UnknownOrder);
    };
    if record.status == InvoiceStatus::Paid {
        tracing::info!(order_id = %payload.order_id, "Webhook redelivery, already paid");
        return Ok(WebhookOutcome::AlreadyPaid);
    }

    let end_at = shared::util::now_millis() + days_ms(config.billing_period_days);
    store::apply_subscription(&mut *tx, record.store_id, record.plan, end_at).await?;
    invoice::mark_paid(&mut *tx, &payload.order_id, &payload.payment_id).await?;

    // Owner notification rides in the same commit; delivery is the outbox
    // worker's problem and can never unwind the billing state.
    if let Some(phone) = store::owner_phone(&mut *tx, record.store_id).await? {
        let body = format!(
            "Тарофаи {} бомуваффақият фаъол шуд. Муҳлат то: {}.",
            record.plan.as_str(),
            format_date(end_at)
        );
        outbox::enqueue(&mut *tx, &phone, &body).await?;
    }

    tx.commit().await?;
    tracing::info!(
        store_id = record.store_id,
        plan = record.plan.as_str(),
        "Subscription activated"
    );
    Ok(WebhookOutcome::Applied {
        store_id: record.store_id,
        plan: record.plan,
    })
}

// ========== Verification decisions ==========

/// Apply a back-office decision on a verification request. Approval
/// verifies the store, applies the legal name, and grants the TRIAL plan
/// for one billing period; anything else leaves the store unverified.
pub async fn decide_verification(
    pool: &SqlitePool,
    config: &Config,
    request_id: i64,
    status: VerificationStatus,
) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let request = verification::find_by_id(&mut *tx, request_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Verification request {request_id}")))?;

    verification::set_status(&mut *tx, request_id, status).await?;

    match status {
        VerificationStatus::Approved => {
            let end_at = shared::util::now_millis() + days_ms(config.billing_period_days);
            store::rename(&mut *tx, request.store_id, &request.requested_store_name).await?;
            store::set_verified(&mut *tx, request.store_id, true).await?;
            store::apply_subscription(&mut *tx, request.store_id, SubscriptionPlan::Trial, end_at)
                .await?;
        }
        _ => {
            store::set_verified(&mut *tx, request.store_id, false).await?;
        }
    }

    tx.commit().await?;
    Ok(())
}
