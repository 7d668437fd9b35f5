use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use booking_cell::models::AppointmentStatus;

/// Which reminder pass a candidate is being evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    TwentyFourHour,
    OneHour,
}

impl ReminderKind {
    /// How far before the appointment the reminder fires.
    pub fn lead(&self) -> Duration {
        match self {
            ReminderKind::TwentyFourHour => Duration::hours(24),
            ReminderKind::OneHour => Duration::minutes(60),
        }
    }

    /// Half-width of the tolerance band around `now + lead`. Must be at
    /// least the trigger period, or appointments slip between runs.
    pub fn slack(&self) -> Duration {
        match self {
            ReminderKind::TwentyFourHour => Duration::minutes(60),
            ReminderKind::OneHour => Duration::minutes(15),
        }
    }

    /// Statuses still worth reminding for this pass. Closer to the
    /// appointment, checked-in patients are included.
    pub fn eligible_statuses(&self) -> &'static [AppointmentStatus] {
        match self {
            ReminderKind::TwentyFourHour => {
                &[AppointmentStatus::Scheduled, AppointmentStatus::Confirmed]
            }
            ReminderKind::OneHour => &[
                AppointmentStatus::Scheduled,
                AppointmentStatus::Confirmed,
                AppointmentStatus::CheckedIn,
            ],
        }
    }

    /// Column that records the pass as done for an appointment.
    pub fn flag_column(&self) -> &'static str {
        match self {
            ReminderKind::TwentyFourHour => "reminder_24h_sent",
            ReminderKind::OneHour => "reminder_1h_sent",
        }
    }
}

/// Embedded patient row carried along with each candidate so the pipeline
/// never needs a second lookup per send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatePatient {
    pub phone: String,
}

/// Embedded clinic columns needed to interpret the appointment's wall-clock
/// date and time relative to UTC "now".
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CandidateClinic {
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

/// An appointment pulled into a reminder run. Fetched with a coarse
/// date/status/flag filter; the precise window check happens in process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderCandidate {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub reminder_24h_sent: bool,
    pub reminder_1h_sent: bool,
    pub patients: CandidatePatient,
    #[serde(default)]
    pub clinics: CandidateClinic,
}

impl ReminderCandidate {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn flag_sent(&self, kind: ReminderKind) -> bool {
        match kind {
            ReminderKind::TwentyFourHour => self.reminder_24h_sent,
            ReminderKind::OneHour => self.reminder_1h_sent,
        }
    }
}

/// Outcome of one scheduled invocation, returned to the trigger as-is.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReminderRunSummary {
    pub sent_24h: u32,
    pub sent_1h: u32,
    pub errors: Vec<String>,
}
