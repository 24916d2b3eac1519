//! Debtor API 模块

mod handler;

use axum::{Router, routing::{get, put}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/debtors", routes())
        // 公开账单页：无需身份
        .route("/api/public/debtors/{id}", get(handler::public_view))
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
}
