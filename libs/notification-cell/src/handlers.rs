use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::TestSendRequest;
use crate::services::dispatcher::NotificationDispatcher;

/// Operator smoke test for provider configuration. Always answers HTTP 200
/// with the outcome embedded in the body so a provider outage never shows
/// up as a hard error in monitoring.
#[axum::debug_handler]
pub async fn test_send(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<TestSendRequest>,
) -> Result<Json<Value>, AppError> {
    let dispatcher = NotificationDispatcher::new(&state);

    match dispatcher.send(&request.phone, &request.message).await {
        Ok(result) => {
            info!(
                "Test send to {}: success={} channel={:?}",
                result.recipient, result.success, result.channel_used
            );
            Ok(Json(json!({
                "success": result.success,
                "channel_used": result.channel_used,
                "error": result.error,
            })))
        }
        Err(e) => Ok(Json(json!({
            "success": false,
            "channel_used": null,
            "error": e.to_string(),
        }))),
    }
}
