use chrono::{Datelike, NaiveDate, NaiveTime};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{DbError, SupabaseClient};

use crate::models::{Clinic, ScheduleError, SlotAvailability};
use crate::services::slots::{available_slots, generate_slots};

/// Rejected tokens keep their own variant so handlers can answer 401
/// instead of a generic database failure.
fn db_error(e: DbError) -> ScheduleError {
    match e {
        DbError::Auth(msg) => ScheduleError::Auth(msg),
        other => ScheduleError::DatabaseError(other.to_string()),
    }
}

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Fetch a clinic's settings record.
    pub async fn get_clinic(&self, clinic_id: Uuid, auth_token: &str) -> Result<Clinic, ScheduleError> {
        let path = format!(
            "/rest/v1/clinics?id=eq.{}&select=id,name,working_hours,slot_duration_minutes,timezone,utc_offset_minutes",
            clinic_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_error)?;

        if result.is_empty() {
            return Err(ScheduleError::ClinicNotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| ScheduleError::DatabaseError(format!("Failed to parse clinic: {}", e)))
    }

    /// Candidate slot start times for a clinic on a date, from its weekly
    /// working hours. Closed days yield an empty list.
    pub fn slots_for_date(&self, clinic: &Clinic, date: NaiveDate) -> Vec<NaiveTime> {
        match clinic.working_hours.hours_for(date.weekday()) {
            Some(hours) => generate_slots(hours.opens, hours.closes, clinic.slot_duration_minutes),
            None => Vec::new(),
        }
    }

    /// Times of appointments that still occupy a slot on the given date.
    ///
    /// Cancelled and no-show appointments free their slot for rebooking,
    /// and soft-deleted rows are ignored. When editing an existing
    /// appointment its own slot is excluded so the caller can keep it.
    pub async fn booked_times(
        &self,
        clinic_id: Uuid,
        date: NaiveDate,
        exclude_appointment_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<Vec<NaiveTime>, ScheduleError> {
        let mut path = format!(
            "/rest/v1/appointments?clinic_id=eq.{}&date=eq.{}&status=not.in.(cancelled,no_show)&deleted_at=is.null&select=id,time",
            clinic_id, date
        );
        if let Some(exclude_id) = exclude_appointment_id {
            path.push_str(&format!("&id=neq.{}", exclude_id));
        }

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_error)?;

        let mut times = Vec::new();
        for row in result {
            let raw = row["time"].as_str().unwrap_or_default();
            let parsed = NaiveTime::parse_from_str(raw, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
                .map_err(|e| ScheduleError::DatabaseError(format!("Bad time '{}': {}", raw, e)))?;
            times.push(parsed);
        }

        Ok(times)
    }

    /// Full availability computation for a clinic and date.
    pub async fn available_for_date(
        &self,
        clinic_id: Uuid,
        date: NaiveDate,
        exclude_appointment_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<SlotAvailability, ScheduleError> {
        let clinic = self.get_clinic(clinic_id, auth_token).await?;
        let all = self.slots_for_date(&clinic, date);
        let booked = self
            .booked_times(clinic_id, date, exclude_appointment_id, auth_token)
            .await?;
        let available = available_slots(&all, &booked);

        debug!(
            "Clinic {} on {}: {} candidate slots, {} available",
            clinic_id,
            date,
            all.len(),
            available.len()
        );

        Ok(SlotAvailability {
            clinic_id,
            date,
            slot_duration_minutes: clinic.slot_duration_minutes,
            all_slots: all,
            available_slots: available,
        })
    }
}
