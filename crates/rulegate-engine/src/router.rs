//! Axum router wiring.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/authorize", post(transport::http::authorize))
        .route("/v1/rules", get(transport::http::list_rules))
        .route("/v1/rules/evaluate", post(transport::http::evaluate))
        .route("/healthz", get(ops::healthz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
