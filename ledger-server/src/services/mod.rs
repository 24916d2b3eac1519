//! 业务服务层
//!
//! # 服务组件
//!
//! - [`ledger`] - 账本：交易记录、冲销、欠款人管理
//! - [`identity`] - 身份：档案同步、验证号码合并
//! - [`otp`] - 登录验证码（持久化限流）
//! - [`billing`] - 订阅开票与支付回调对账
//! - [`reminder`] - 催款短信闸门与发送
//! - [`sms`] - 短信网关抽象
//! - [`outbox`] - 通知出站队列

pub mod billing;
pub mod identity;
pub mod ledger;
pub mod otp;
pub mod outbox;
pub mod reminder;
pub mod sms;

pub use billing::{BillingProvider, HttpBillingProvider, MemoryBilling, WebhookOutcome};
pub use reminder::{DenyReason, ReminderDecision};
pub use sms::{HttpSmsGateway, MemorySms, SmsProvider};
