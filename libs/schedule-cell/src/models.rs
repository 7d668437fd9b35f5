use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opening hours for a single weekday. A day with no entry is closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayHours {
    pub opens: NaiveTime,
    pub closes: NaiveTime,
}

/// Weekly working-hours configuration for a clinic.
///
/// Edited by the clinic admin through settings; read-only here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklyHours {
    pub monday: Option<DayHours>,
    pub tuesday: Option<DayHours>,
    pub wednesday: Option<DayHours>,
    pub thursday: Option<DayHours>,
    pub friday: Option<DayHours>,
    pub saturday: Option<DayHours>,
    pub sunday: Option<DayHours>,
}

impl WeeklyHours {
    pub fn hours_for(&self, weekday: Weekday) -> Option<DayHours> {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    pub id: Uuid,
    pub name: String,
    pub working_hours: WeeklyHours,
    pub slot_duration_minutes: i32,
    pub timezone: String,
    /// Offset of the clinic's operating locale from UTC, used to resolve
    /// the clinic-local calendar day without a timezone database.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Clinic {
    /// The clinic-local calendar date for a given UTC instant.
    pub fn local_date(&self, now: chrono::DateTime<chrono::Utc>) -> NaiveDate {
        (now + chrono::Duration::minutes(self.utc_offset_minutes as i64)).date_naive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub clinic_id: Uuid,
    pub date: NaiveDate,
    pub slot_duration_minutes: i32,
    pub all_slots: Vec<NaiveTime>,
    pub available_slots: Vec<NaiveTime>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Clinic not found")]
    ClinicNotFound,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
