use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use tracing::info;

use shared_config::AppConfig;

use crate::models::ReminderRunSummary;
use crate::services::pipeline::ReminderPipeline;

/// Scheduled entry point. Invoked by an external cron-style trigger; always
/// answers 200 so a provider outage shows up as counts and error strings in
/// the body instead of tripping HTTP-level alerting.
#[axum::debug_handler]
pub async fn run_reminders(State(state): State<Arc<AppConfig>>) -> Json<ReminderRunSummary> {
    info!("Reminder run triggered");

    let pipeline = ReminderPipeline::new(&state);
    let summary = pipeline.run(Utc::now()).await;

    Json(summary)
}
