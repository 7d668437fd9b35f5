use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use notification_cell::services::dispatcher::NotificationDispatcher;
use shared_config::AppConfig;
use shared_database::supabase::{DbError, SupabaseClient};

use crate::models::{ReminderCandidate, ReminderKind, ReminderRunSummary};
use crate::services::windows::select_for_reminder;

/// Pause between consecutive sends so the provider's rate limit holds even
/// when a run has many due appointments.
const SEND_DELAY: StdDuration = StdDuration::from_secs(1);

/// Runs the 24h and 1h reminder passes for one scheduled invocation.
///
/// Reads and writes go through the service role key: reminders run on
/// behalf of the system, not any one user session. Every per-candidate
/// failure is collected into the run summary; nothing aborts the batch.
pub struct ReminderPipeline {
    supabase: SupabaseClient,
    dispatcher: NotificationDispatcher,
    service_role_key: String,
    send_delay: StdDuration,
}

impl ReminderPipeline {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            dispatcher: NotificationDispatcher::new(config),
            service_role_key: config.supabase_service_role_key.clone(),
            send_delay: SEND_DELAY,
        }
    }

    /// Shorten the inter-send pause; used by tests.
    pub fn with_send_delay(mut self, delay: StdDuration) -> Self {
        self.send_delay = delay;
        self
    }

    pub async fn run(&self, now: DateTime<Utc>) -> ReminderRunSummary {
        let mut summary = ReminderRunSummary::default();
        self.run_kind(ReminderKind::TwentyFourHour, now, &mut summary)
            .await;
        self.run_kind(ReminderKind::OneHour, now, &mut summary).await;
        info!(
            "Reminder run done: {} x 24h, {} x 1h, {} errors",
            summary.sent_24h,
            summary.sent_1h,
            summary.errors.len()
        );
        summary
    }

    async fn run_kind(
        &self,
        kind: ReminderKind,
        now: DateTime<Utc>,
        summary: &mut ReminderRunSummary,
    ) {
        let candidates = match self.fetch_candidates(kind, now).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Candidate fetch failed for {}: {}", kind.flag_column(), e);
                summary
                    .errors
                    .push(format!("{} candidate fetch failed: {}", kind.flag_column(), e));
                return;
            }
        };

        let due = select_for_reminder(now.naive_utc(), kind, &candidates);
        info!(
            "{}: {} candidates, {} due",
            kind.flag_column(),
            candidates.len(),
            due.len()
        );

        let mut first = true;
        for candidate in due {
            if !first {
                tokio::time::sleep(self.send_delay).await;
            }
            first = false;

            match self.send_one(kind, candidate).await {
                Ok(()) => match kind {
                    ReminderKind::TwentyFourHour => summary.sent_24h += 1,
                    ReminderKind::OneHour => summary.sent_1h += 1,
                },
                Err(msg) => {
                    warn!("{}", msg);
                    summary.errors.push(msg);
                }
            }
        }
    }

    /// Coarse database pre-filter: bounded date range, eligible statuses,
    /// sent flag still false, not soft-deleted. The exact window check is
    /// re-applied in process.
    ///
    /// The range spans the day before through the day after the UTC target
    /// date: appointment dates are clinic wall clock, so a clinic behind
    /// UTC can have a due appointment dated before the UTC target and one
    /// ahead of UTC after it.
    async fn fetch_candidates(
        &self,
        kind: ReminderKind,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReminderCandidate>, DbError> {
        let target_date = (now + kind.lead()).date_naive();
        let day_before = target_date - Duration::days(1);
        let day_after = target_date + Duration::days(1);
        let statuses = kind
            .eligible_statuses()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let path = format!(
            "/rest/v1/appointments?select=id,clinic_id,date,time,status,reminder_24h_sent,reminder_1h_sent,patients(phone),clinics(utc_offset_minutes)\
             &date=in.({},{},{})&{}=eq.false&status=in.({})&deleted_at=is.null",
            day_before,
            target_date,
            day_after,
            kind.flag_column(),
            statuses
        );

        self.supabase
            .request(Method::GET, &path, Some(&self.service_role_key), None)
            .await
    }

    async fn send_one(&self, kind: ReminderKind, candidate: &ReminderCandidate) -> Result<(), String> {
        let message = match kind {
            ReminderKind::TwentyFourHour => format!(
                "Reminder: you have an appointment tomorrow, {} at {}.",
                candidate.date,
                candidate.time.format("%H:%M")
            ),
            ReminderKind::OneHour => format!(
                "Reminder: your appointment is today at {}. Please arrive 10 minutes early.",
                candidate.time.format("%H:%M")
            ),
        };

        let result = self
            .dispatcher
            .send(&candidate.patients.phone, &message)
            .await
            .map_err(|e| format!("appointment {}: {}", candidate.id, e))?;

        if !result.success {
            return Err(format!(
                "appointment {}: {}",
                candidate.id,
                result.error.unwrap_or_else(|| "send failed".to_string())
            ));
        }

        self.mark_sent(kind, candidate.id)
            .await
            .map_err(|e| format!("appointment {}: sent but flag update failed: {}", candidate.id, e))
    }

    /// Conditional update: the `=eq.false` filter makes the flag flip
    /// atomic, so overlapping runs cannot both claim the same send. An
    /// empty result means another run got there first, which is fine.
    async fn mark_sent(&self, kind: ReminderKind, appointment_id: Uuid) -> Result<(), DbError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&{}=eq.false",
            appointment_id,
            kind.flag_column()
        );
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let _: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(&self.service_role_key),
                Some(json!({ kind.flag_column(): true })),
                Some(headers),
            )
            .await?;

        Ok(())
    }
}
