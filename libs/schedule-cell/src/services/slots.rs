use chrono::{Duration, NaiveTime};
use std::collections::HashSet;

/// Generate candidate slot start times for one day of working hours.
///
/// Slots start at `opens` and advance by `duration_minutes` while strictly
/// before `closes` (half-open interval: a slot landing exactly on `closes`
/// is excluded). `opens >= closes` means the day is closed and yields an
/// empty sequence rather than an error.
pub fn generate_slots(opens: NaiveTime, closes: NaiveTime, duration_minutes: i32) -> Vec<NaiveTime> {
    if duration_minutes <= 0 || opens >= closes {
        return Vec::new();
    }

    let step = Duration::minutes(duration_minutes as i64);
    let mut slots = Vec::new();
    let mut current = opens;

    while current < closes {
        slots.push(current);
        let (next, wrapped) = current.overflowing_add_signed(step);
        if wrapped != 0 {
            // Stepped past midnight; no further slots on this day.
            break;
        }
        current = next;
    }

    slots
}

/// Minute-precision key for slot matching; seconds are ignored.
fn minute_key(time: NaiveTime) -> (u32, u32) {
    use chrono::Timelike;
    (time.hour(), time.minute())
}

/// Ordered set difference: the slots of `all_slots` not present in
/// `booked_times`, preserving the original order. Times match when their
/// (hour, minute) pair matches.
pub fn available_slots(all_slots: &[NaiveTime], booked_times: &[NaiveTime]) -> Vec<NaiveTime> {
    let booked: HashSet<(u32, u32)> = booked_times.iter().copied().map(minute_key).collect();

    all_slots
        .iter()
        .copied()
        .filter(|slot| !booked.contains(&minute_key(*slot)))
        .collect()
}
