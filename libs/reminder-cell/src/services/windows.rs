//! Pure window arithmetic for reminder selection.
//!
//! The data layer only pre-filters candidates coarsely (by date, status and
//! the sent flag); the exact instant check lives here so it can be unit
//! tested without a database. Nothing in this module mutates the sent
//! flags; the pipeline sets them only after a successful dispatch.

use chrono::{Duration, NaiveDateTime};

use crate::models::{ReminderCandidate, ReminderKind};

/// Whether an appointment starting at `starts_at` is inside the tolerance
/// band for `kind`, relative to `now`. Both bounds are inclusive; all
/// arithmetic is exact minutes.
pub fn in_window(kind: ReminderKind, starts_at: NaiveDateTime, now: NaiveDateTime) -> bool {
    let target = now + kind.lead();
    let slack = kind.slack();
    starts_at >= target - slack && starts_at <= target + slack
}

/// Filter candidates down to the ones due for `kind` right now: inside the
/// window, flag still false, status eligible for this pass.
///
/// `now` is naive UTC; each candidate's appointment time is clinic wall
/// clock, so `now` is shifted by that clinic's UTC offset before the
/// window check.
pub fn select_for_reminder<'a>(
    now: NaiveDateTime,
    kind: ReminderKind,
    candidates: &'a [ReminderCandidate],
) -> Vec<&'a ReminderCandidate> {
    candidates
        .iter()
        .filter(|c| !c.flag_sent(kind))
        .filter(|c| kind.eligible_statuses().contains(&c.status))
        .filter(|c| {
            let local_now = now + Duration::minutes(c.clinics.utc_offset_minutes.into());
            in_window(kind, c.starts_at(), local_now)
        })
        .collect()
}
