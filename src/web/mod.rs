pub mod assets;
pub mod attachments;
pub mod auth;
pub mod dashboard;
pub mod session;
pub mod work_orders;

use crate::state::SharedState;
use axum::{routing::get, Router};

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router(state.clone()))
        .nest("/dashboard", dashboard::router(state.clone()))
        .nest("/assets", assets::router(state.clone()))
        .nest("/work-orders", work_orders::router(state.clone()))
        .nest("/approvals", work_orders::approvals_router(state.clone()))
        .nest("/attachments", attachments::router(state))
}
