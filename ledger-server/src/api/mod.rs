//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - OTP 登录、档案同步、联系人验证事件
//! - [`stores`] - 店铺管理与认证申请
//! - [`collaborators`] - 协作者授权管理
//! - [`debtors`] - 欠款人管理（含公开账单页）
//! - [`transactions`] - 账本交易记录与冲销
//! - [`reminders`] - 催款短信
//! - [`billing`] - 订阅开票与支付回调
//! - [`users`] - 用户偏好与搜索
//! - [`verifications`] - 店铺认证审核

pub mod auth;
pub mod billing;
pub mod collaborators;
pub mod debtors;
pub mod health;
pub mod reminders;
pub mod stores;
pub mod transactions;
pub mod users;
pub mod verifications;

use axum::Router;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(stores::router())
        .merge(collaborators::router())
        .merge(debtors::router())
        .merge(transactions::router())
        .merge(reminders::router())
        .merge(billing::router())
        .merge(users::router())
        .merge(verifications::router())
}
