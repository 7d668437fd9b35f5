use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn reminder_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/run", post(handlers::run_reminders))
        .with_state(state)
}
