use chrono::{DateTime, Utc};

use crate::models::EventDetails;

// An event is published once its window has closed (end_time <= now).
// TODO: confirm with the lake-status API owners whether upcoming events
// (end_time > now) are the ones they expect.
pub fn is_publishable(event: &EventDetails, now: DateTime<Utc>) -> bool {
    event.end_time <= now
}

pub fn retain_publishable(events: Vec<EventDetails>, now: DateTime<Utc>) -> Vec<EventDetails> {
    events
        .into_iter()
        .filter(|event| is_publishable(event, now))
        .collect()
}
