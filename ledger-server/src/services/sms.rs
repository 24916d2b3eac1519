//! SMS Gateway
//!
//! Messaging capability behind a trait so the OTP and reminder flows can
//! run against the real HTTP gateway in production and an in-memory
//! implementation in tests / unconfigured environments.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use shared::models::DeliveryStatus;

use crate::core::Config;
use crate::utils::{AppError, AppResult};

#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Dispatch a message, returning the provider's message id.
    async fn send(&self, to: &str, body: &str) -> AppResult<String>;

    /// Live delivery status for a previously dispatched message.
    /// Transport failures degrade to [`DeliveryStatus::Unknown`].
    async fn query_status(&self, message_id: &str) -> DeliveryStatus;
}

// ========== HTTP gateway ==========

/// GET-style SMS gateway (osonsms API shape): query parameters + bearer
/// token, one UUID txn id per call.
pub struct HttpSmsGateway {
    client: reqwest::Client,
    send_url: String,
    status_url: String,
    login: String,
    token: String,
    sender: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    status: Option<String>,
    error_code: Option<i64>,
    msg_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: Option<String>,
}

impl HttpSmsGateway {
    /// Build from config; `None` when gateway credentials are absent
    /// (callers fall back to the in-memory provider).
    pub fn from_config(config: &Config) -> Option<Self> {
        let login = config.sms_login.clone()?;
        let token = config.sms_token.clone()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.provider_timeout_ms))
            .build()
            .ok()?;
        Some(Self {
            client,
            send_url: config.sms_send_url.clone(),
            status_url: config.sms_status_url.clone(),
            login,
            token,
            sender: config.sms_sender.clone(),
        })
    }
}

#[async_trait]
impl SmsProvider for HttpSmsGateway {
    async fn send(&self, to: &str, body: &str) -> AppResult<String> {
        let txn_id = uuid::Uuid::new_v4().to_string();
        let response = self
            .client
            .get(&self.send_url)
            .query(&[
                ("from", self.sender.as_str()),
                ("phone_number", to),
                ("msg", body),
                ("login", self.login.as_str()),
                ("txn_id", txn_id.as_str()),
            ])
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AppError::provider(format!("SMS send failed: {e}")))?;

        let data: SendResponse = response
            .json()
            .await
            .map_err(|e| AppError::provider(format!("SMS gateway returned garbage: {e}")))?;

        let accepted = data.status.as_deref() == Some("ok") || data.error_code == Some(0);
        match (accepted, data.msg_id) {
            (true, Some(msg_id)) => Ok(msg_id),
            _ => Err(AppError::provider("SMS gateway rejected the message")),
        }
    }

    async fn query_status(&self, message_id: &str) -> DeliveryStatus {
        let txn_id = uuid::Uuid::new_v4().to_string();
        let result = self
            .client
            .get(&self.status_url)
            .query(&[
                ("login", self.login.as_str()),
                ("msg_id", message_id),
                ("txn_id", txn_id.as_str()),
            ])
            .bearer_auth(&self.token)
            .send()
            .await;

        let Ok(response) = result else {
            return DeliveryStatus::Unknown;
        };
        let Ok(data) = response.json::<StatusResponse>().await else {
            return DeliveryStatus::Unknown;
        };
        parse_status(data.status.as_deref().unwrap_or(""))
    }
}

/// Gateway status strings → delivery state. ACCEPTED/ENROUTE are still in
/// flight, which counts as pending for gating purposes.
fn parse_status(raw: &str) -> DeliveryStatus {
    match raw.to_ascii_uppercase().as_str() {
        "DELIVERED" => DeliveryStatus::Delivered,
        "ACCEPTED" | "ENROUTE" | "PENDING" => DeliveryStatus::Pending,
        "FAILED" | "REJECTED" | "EXPIRED" | "UNDELIVERABLE" => DeliveryStatus::Failed,
        _ => DeliveryStatus::Unknown,
    }
}

// ========== In-memory provider ==========

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub to: String,
    pub body: String,
    pub message_id: String,
}

/// Records every send and answers status queries from a configurable map.
/// Used by tests and by deployments without gateway credentials.
#[derive(Default)]
pub struct MemorySms {
    sent: Mutex<Vec<SentMessage>>,
    statuses: Mutex<HashMap<String, DeliveryStatus>>,
    fail_sends: AtomicBool,
    counter: AtomicU64,
}

impl MemorySms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("sms mutex").clone()
    }

    pub fn set_status(&self, message_id: &str, status: DeliveryStatus) {
        self.statuses
            .lock()
            .expect("sms mutex")
            .insert(message_id.to_string(), status);
    }

    /// Make subsequent sends fail, to exercise provider-error paths.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SmsProvider for MemorySms {
    async fn send(&self, to: &str, body: &str) -> AppResult<String> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(AppError::provider("simulated SMS gateway failure"));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let message_id = format!("mem-{n}");
        self.sent.lock().expect("sms mutex").push(SentMessage {
            to: to.to_string(),
            body: body.to_string(),
            message_id: message_id.clone(),
        });
        Ok(message_id)
    }

    async fn query_status(&self, message_id: &str) -> DeliveryStatus {
        self.statuses
            .lock()
            .expect("sms mutex")
            .get(message_id)
            .copied()
            .unwrap_or(DeliveryStatus::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_map_to_delivery_states() {
        assert_eq!(parse_status("DELIVERED"), DeliveryStatus::Delivered);
        assert_eq!(parse_status("enroute"), DeliveryStatus::Pending);
        assert_eq!(parse_status("FAILED"), DeliveryStatus::Failed);
        assert_eq!(parse_status("whatever"), DeliveryStatus::Unknown);
        assert_eq!(parse_status(""), DeliveryStatus::Unknown);
    }
}
