//! Auth API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/otp/request", post(handler::otp_request))
        .route("/otp/verify", post(handler::otp_verify))
        .route("/sync", post(handler::sync))
        .route("/contact", post(handler::contact))
}
