//! User Preference API 模块

mod handler;

use axum::{Router, routing::{get, put}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/me/language", put(handler::set_language))
        .route("/me/store", put(handler::set_store))
        .route("/search", get(handler::search))
}
