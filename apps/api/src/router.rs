use std::sync::Arc;

use axum::{routing::get, Router};

use booking_cell::router::appointment_routes;
use notification_cell::router::notification_routes;
use reminder_cell::router::reminder_routes;
use schedule_cell::router::schedule_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic API is running!" }))
        .nest("/schedule", schedule_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/notifications", notification_routes(state.clone()))
        .nest("/reminders", reminder_routes(state))
}
