//! Verification Review API 模块
//!
//! 后台审核接口，由前置管理层认证后转发。

mod handler;

use axum::{Router, routing::put};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/verifications/{id}/status", put(handler::decide))
}
