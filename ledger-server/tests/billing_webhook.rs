//! Webhook reconciliation: shared-secret gate, idempotent apply,
//! success-with-skip for unknown/stale callbacks, outbox notification,
//! and verification decisions.

mod common;

use ledger_server::AppError;
use ledger_server::db::repository::{invoice, outbox, store, verification};
use ledger_server::services::billing::{self, WebhookOutcome};
use ledger_server::services::outbox as outbox_service;
use shared::Money;
use shared::models::{
    InvoiceStatus, SubscriptionPlan, VerificationStatus, WebhookPayload,
};

const SECRET: &str = "wh-secret";

fn payload(order_id: &str) -> WebhookPayload {
    WebhookPayload {
        order_id: order_id.to_string(),
        payment_id: "ext-12345".to_string(),
        amount: Money::from_cents(15_00),
        payment_date: None,
    }
}

async fn seed_invoice(env: &common::TestEnv) -> (i64, String) {
    let owner = common::seed_identity(&env.pool, "Owner", Some("992900000010")).await;
    let shop = common::seed_store(&env.pool, owner).await;
    let order_id = "SUB_123".to_string();
    invoice::insert(
        &env.pool,
        shop.id,
        &order_id,
        None,
        Money::from_cents(15_00),
        SubscriptionPlan::Standard,
    )
    .await
    .unwrap();
    (shop.id, order_id)
}

#[tokio::test]
async fn webhook_applies_exactly_once() {
    let mut env = common::setup().await;
    env.config.billing_token = Some(SECRET.to_string());
    let (store_id, order_id) = seed_invoice(&env).await;

    let first = billing::handle_webhook(&env.pool, &env.config, Some(SECRET), &payload(&order_id))
        .await
        .unwrap();
    assert_eq!(
        first,
        WebhookOutcome::Applied {
            store_id,
            plan: SubscriptionPlan::Standard
        }
    );

    let after_first = store::find_by_id(&env.pool, store_id).await.unwrap().unwrap();
    assert_eq!(after_first.subscription_plan, SubscriptionPlan::Standard);
    assert_eq!(after_first.sms_quota, 100);
    assert_eq!(after_first.sms_used, 0);
    let end_at = after_first.subscription_end_at.expect("end date set");
    assert!(end_at > shared::util::now_millis());

    let paid = invoice::find_by_order_id(&env.pool, &order_id).await.unwrap().unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);
    assert_eq!(paid.external_id.as_deref(), Some("ext-12345"));

    // Identical redelivery: acknowledged, nothing changes.
    let second = billing::handle_webhook(&env.pool, &env.config, Some(SECRET), &payload(&order_id))
        .await
        .unwrap();
    assert_eq!(second, WebhookOutcome::AlreadyPaid);
    let after_second = store::find_by_id(&env.pool, store_id).await.unwrap().unwrap();
    assert_eq!(after_second.subscription_end_at, Some(end_at));
    assert_eq!(after_second.sms_used, 0);
}

#[tokio::test]
async fn webhook_rejects_bad_secret_before_touching_state() {
    let mut env = common::setup().await;
    env.config.billing_token = Some(SECRET.to_string());
    let (_, order_id) = seed_invoice(&env).await;

    let err = billing::handle_webhook(&env.pool, &env.config, Some("wrong"), &payload(&order_id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let untouched = invoice::find_by_order_id(&env.pool, &order_id).await.unwrap().unwrap();
    assert_eq!(untouched.status, InvoiceStatus::Pending);

    let err = billing::handle_webhook(&env.pool, &env.config, None, &payload(&order_id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
}

#[tokio::test]
async fn webhook_acknowledges_unknown_orders() {
    let mut env = common::setup().await;
    env.config.billing_token = Some(SECRET.to_string());

    let outcome =
        billing::handle_webhook(&env.pool, &env.config, Some(SECRET), &payload("SUB_STALE"))
            .await
            .unwrap();
    assert_eq!(outcome, WebhookOutcome::UnknownOrder);
}

#[tokio::test]
async fn webhook_enqueues_owner_notification_and_outbox_delivers_it() {
    let mut env = common::setup().await;
    env.config.billing_token = Some(SECRET.to_string());
    let (_, order_id) = seed_invoice(&env).await;

    billing::handle_webhook(&env.pool, &env.config, Some(SECRET), &payload(&order_id))
        .await
        .unwrap();

    let pending = outbox::fetch_unsent(&env.pool, 5, 10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].phone, "992900000010");
    assert!(pending[0].body.contains("STANDARD"));

    let sms: std::sync::Arc<dyn ledger_server::SmsProvider> = env.sms.clone();
    let sent = outbox_service::drain_once(&env.pool, &sms, 5).await.unwrap();
    assert_eq!(sent, 1);
    assert_eq!(env.sms.sent().len(), 1);
    assert!(outbox::fetch_unsent(&env.pool, 5, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn outbox_failures_bump_attempts_without_surfacing() {
    let mut env = common::setup().await;
    env.config.billing_token = Some(SECRET.to_string());
    let (_, order_id) = seed_invoice(&env).await;
    billing::handle_webhook(&env.pool, &env.config, Some(SECRET), &payload(&order_id))
        .await
        .unwrap();

    env.sms.set_fail_sends(true);
    let sms: std::sync::Arc<dyn ledger_server::SmsProvider> = env.sms.clone();
    let sent = outbox_service::drain_once(&env.pool, &sms, 5).await.unwrap();
    assert_eq!(sent, 0);

    let pending = outbox::fetch_unsent(&env.pool, 5, 10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].attempts, 1);
}

#[tokio::test]
async fn verification_approval_grants_trial_and_legal_name() {
    let env = common::setup().await;
    let owner = common::seed_identity(&env.pool, "Owner", None).await;
    let shop = common::seed_store(&env.pool, owner).await;
    let request_id = verification::insert(&env.pool, shop.id, owner, "patent", "Мағозаи Карим")
        .await
        .unwrap();

    billing::decide_verification(&env.pool, &env.config, request_id, VerificationStatus::Approved)
        .await
        .unwrap();

    let approved = store::find_by_id(&env.pool, shop.id).await.unwrap().unwrap();
    assert!(approved.is_verified);
    assert_eq!(approved.name, "Мағозаи Карим");
    assert_eq!(approved.subscription_plan, SubscriptionPlan::Trial);
    assert_eq!(approved.sms_quota, 100);
    assert_eq!(approved.sms_used, 0);

    // A later rejection flips the verified flag back off.
    let second = verification::insert(&env.pool, shop.id, owner, "patent", "Other Name")
        .await
        .unwrap();
    billing::decide_verification(&env.pool, &env.config, second, VerificationStatus::Rejected)
        .await
        .unwrap();
    let rejected = store::find_by_id(&env.pool, shop.id).await.unwrap().unwrap();
    assert!(!rejected.is_verified);
}
