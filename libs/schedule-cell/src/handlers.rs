use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::ScheduleError;
use crate::services::availability::AvailabilityService;

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub clinic_id: Uuid,
    pub date: NaiveDate,
    pub exclude_appointment_id: Option<Uuid>,
}

/// List candidate and still-available slots for a clinic and date.
#[axum::debug_handler]
pub async fn get_slots(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let availability = service
        .available_for_date(
            query.clinic_id,
            query.date,
            query.exclude_appointment_id,
            auth.token(),
        )
        .await
        .map_err(|e| match e {
            ScheduleError::ClinicNotFound => AppError::NotFound("Clinic not found".to_string()),
            ScheduleError::Auth(msg) => AppError::Auth(msg),
            ScheduleError::DatabaseError(msg) => AppError::Database(msg),
        })?;

    Ok(Json(json!({
        "success": true,
        "availability": availability
    })))
}
