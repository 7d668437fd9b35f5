use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use schedule_cell::services::availability::AvailabilityService;
use shared_config::AppConfig;
use shared_database::supabase::{DbError, SupabaseClient};

use notification_cell::services::dispatcher::NotificationDispatcher;
use notification_cell::services::phone::is_valid_phone;

use crate::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, BookedAppointment, BookingError,
    PatientLookup, StatusUpdateRequest,
};
use crate::services::lifecycle::AppointmentLifecycleService;

/// Rejected tokens keep their own variant so handlers can answer 401
/// instead of a generic database failure.
fn db_error(e: DbError) -> BookingError {
    match e {
        DbError::Auth(msg) => BookingError::Auth(msg),
        other => BookingError::DatabaseError(other.to_string()),
    }
}

pub struct BookingService {
    supabase: SupabaseClient,
    availability: AvailabilityService,
    lifecycle: AppointmentLifecycleService,
    dispatcher: NotificationDispatcher,
    country_code: String,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            availability: AvailabilityService::new(config),
            lifecycle: AppointmentLifecycleService::new(),
            dispatcher: NotificationDispatcher::new(config),
            country_code: config.country_code.clone(),
        }
    }

    /// Book a slot for an existing or new patient.
    ///
    /// Patient creation and appointment insert run inside one database
    /// transaction (the `book_appointment` RPC), which also assigns the
    /// token number as 1 + the count of non-deleted appointments for the
    /// clinic and date. The partial unique index on (clinic, date, time)
    /// is the real conflict guard; the availability pre-check here only
    /// produces a friendlier error for the common case.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<BookedAppointment, BookingError> {
        info!(
            "Booking appointment for clinic {} on {} at {}",
            request.clinic_id, request.date, request.time
        );

        self.validate_booking_request(&request, auth_token).await?;

        let mut rpc_body = json!({
            "p_clinic_id": request.clinic_id,
            "p_date": request.date,
            "p_time": request.time.format("%H:%M:%S").to_string(),
            "p_notes": request.notes,
        });

        match &request.patient {
            PatientLookup::Existing { patient_id } => {
                rpc_body["p_patient_id"] = json!(patient_id);
            }
            PatientLookup::New { name, phone } => {
                rpc_body["p_patient_name"] = json!(name);
                rpc_body["p_patient_phone"] = json!(phone);
            }
        }

        let result: Value = self
            .supabase
            .request(
                Method::POST,
                "/rest/v1/rpc/book_appointment",
                Some(auth_token),
                Some(rpc_body),
            )
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    BookingError::SlotConflict
                } else {
                    db_error(e)
                }
            })?;

        let booked: BookedAppointment = serde_json::from_value(result)
            .map_err(|e| BookingError::DatabaseError(format!("Failed to parse booking: {}", e)))?;

        info!(
            "Appointment {} booked, token #{}",
            booked.appointment.id, booked.appointment.token_number
        );

        self.send_confirmation(&booked, auth_token).await;

        Ok(booked)
    }

    /// Apply a lifecycle status transition.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        request: StatusUpdateRequest,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;

        self.lifecycle
            .validate_status_transition(current.status, request.status)?;

        self.patch_appointment(
            appointment_id,
            json!({
                "status": request.status.to_string(),
                "updated_at": Utc::now().to_rfc3339(),
            }),
            auth_token,
        )
        .await
    }

    /// Cancel an appointment. Cancellation is a status change; the row is
    /// kept so the slot history stays intact, and the freed slot becomes
    /// bookable again through the availability computation.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;

        self.lifecycle
            .validate_status_transition(current.status, AppointmentStatus::Cancelled)?;

        self.patch_appointment(
            appointment_id,
            json!({
                "status": AppointmentStatus::Cancelled.to_string(),
                "updated_at": Utc::now().to_rfc3339(),
            }),
            auth_token,
        )
        .await
    }

    /// Soft-delete an appointment. Rows are never physically removed; every
    /// read path filters on `deleted_at is null`.
    pub async fn delete_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        // Look it up first so a missing id surfaces as NotFound.
        let _ = self.get_appointment(appointment_id, auth_token).await?;

        self.patch_appointment(
            appointment_id,
            json!({
                "deleted_at": Utc::now().to_rfc3339(),
                "updated_at": Utc::now().to_rfc3339(),
            }),
            auth_token,
        )
        .await
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&deleted_at=is.null",
            appointment_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_error)?;

        if result.is_empty() {
            return Err(BookingError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| BookingError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    async fn validate_booking_request(
        &self,
        request: &BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<(), BookingError> {
        if let PatientLookup::New { name, phone } = &request.patient {
            if name.trim().is_empty() {
                return Err(BookingError::Validation("Patient name is required".into()));
            }
            if !is_valid_phone(phone, &self.country_code) {
                return Err(BookingError::Validation(format!(
                    "Invalid phone number: {}",
                    phone
                )));
            }
        }

        let clinic = self
            .availability
            .get_clinic(request.clinic_id, auth_token)
            .await
            .map_err(|e| match e {
                schedule_cell::models::ScheduleError::ClinicNotFound => BookingError::ClinicNotFound,
                schedule_cell::models::ScheduleError::Auth(msg) => BookingError::Auth(msg),
                schedule_cell::models::ScheduleError::DatabaseError(msg) => {
                    BookingError::DatabaseError(msg)
                }
            })?;

        if request.date < clinic.local_date(Utc::now()) {
            return Err(BookingError::Validation(
                "Appointment date is in the past".into(),
            ));
        }

        let slots = self.availability.slots_for_date(&clinic, request.date);
        if !slots.contains(&request.time) {
            return Err(BookingError::Validation(format!(
                "{} is not a valid slot for this clinic on {}",
                request.time.format("%H:%M"),
                request.date
            )));
        }

        Ok(())
    }

    /// Fire the booking confirmation through the channel chain. A failed
    /// send never fails the booking; the flag simply stays false.
    async fn send_confirmation(&self, booked: &BookedAppointment, auth_token: &str) {
        let appointment = &booked.appointment;
        let message = format!(
            "Your appointment on {} at {} is confirmed. Token #{}.",
            appointment.date,
            appointment.time.format("%H:%M"),
            appointment.token_number
        );

        match self.dispatcher.send(&booked.patient_phone, &message).await {
            Ok(result) if result.success => {
                if let Err(e) = self
                    .patch_appointment(
                        appointment.id,
                        json!({"confirmation_sms_sent": true}),
                        auth_token,
                    )
                    .await
                {
                    warn!(
                        "Confirmation sent but flag update failed for {}: {}",
                        appointment.id, e
                    );
                }
            }
            Ok(result) => {
                warn!(
                    "Confirmation send failed for {}: {:?}",
                    appointment.id, result.error
                );
            }
            Err(e) => {
                warn!("Confirmation send rejected for {}: {}", appointment.id, e);
            }
        }
    }

    async fn patch_appointment(
        &self,
        appointment_id: Uuid,
        update: Value,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(auth_token), Some(update), Some(headers))
            .await
            .map_err(db_error)?;

        if result.is_empty() {
            return Err(BookingError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| BookingError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }
}
