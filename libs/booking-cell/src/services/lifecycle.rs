use tracing::{debug, warn};

use crate::models::{AppointmentStatus, BookingError};

/// Status-transition rules for the appointment lifecycle.
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_status_transition(
        &self,
        current: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<(), BookingError> {
        debug!("Validating status transition {} -> {}", current, next);

        if !self.valid_transitions(current).contains(&next) {
            warn!("Invalid status transition attempted: {} -> {}", current, next);
            return Err(BookingError::InvalidStatusTransition(current));
        }

        Ok(())
    }

    pub fn valid_transitions(&self, current: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current {
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::CheckedIn,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::CheckedIn,
                AppointmentStatus::InProgress,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::CheckedIn => vec![
                AppointmentStatus::InProgress,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::InProgress => vec![AppointmentStatus::Completed],
            // Terminal states
            AppointmentStatus::Completed
            | AppointmentStatus::Cancelled
            | AppointmentStatus::NoShow => vec![],
        }
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn scheduled_can_confirm_or_cancel() {
        let svc = AppointmentLifecycleService::new();
        assert!(svc
            .validate_status_transition(AppointmentStatus::Scheduled, AppointmentStatus::Confirmed)
            .is_ok());
        assert!(svc
            .validate_status_transition(AppointmentStatus::Scheduled, AppointmentStatus::Cancelled)
            .is_ok());
    }

    #[test]
    fn completed_is_terminal() {
        let svc = AppointmentLifecycleService::new();
        assert_matches!(
            svc.validate_status_transition(
                AppointmentStatus::Completed,
                AppointmentStatus::Scheduled
            ),
            Err(BookingError::InvalidStatusTransition(_))
        );
    }

    #[test]
    fn in_progress_only_completes() {
        let svc = AppointmentLifecycleService::new();
        assert!(svc
            .validate_status_transition(
                AppointmentStatus::InProgress,
                AppointmentStatus::Completed
            )
            .is_ok());
        assert_matches!(
            svc.validate_status_transition(
                AppointmentStatus::InProgress,
                AppointmentStatus::Cancelled
            ),
            Err(BookingError::InvalidStatusTransition(_))
        );
    }
}
