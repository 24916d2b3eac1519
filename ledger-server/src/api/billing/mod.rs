//! Billing API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/billing", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/invoice", post(handler::create_invoice))
        .route("/webhook", post(handler::webhook))
}
