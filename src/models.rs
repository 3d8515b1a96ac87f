use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A calendar entry as listed by the ticketing API. Only the id and the
/// booking link are read; the rest is kept for debugging.
#[derive(Deserialize, Clone, Debug)]
pub struct RawEvent {
    pub pf_id: Value, // numeric in practice, sometimes a string
    pub link: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawEvent {
    pub fn id(&self) -> String {
        match &self.pf_id {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventDetails {
    pub booking_link: String,
    pub begin_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub sale_start: DateTime<Utc>,
    pub is_available: bool,
}

impl fmt::Display for EventDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "is_available={} ({})", self.is_available, self.booking_link)
    }
}

impl EventDetails {
    pub fn to_published(&self) -> PublishedEvent {
        PublishedEvent {
            booking_link: self.booking_link.clone(),
            is_available: self.is_available,
            begin_time: utc_timestamp(&self.begin_time),
            end_time: utc_timestamp(&self.end_time),
            sale_start: utc_timestamp(&self.sale_start),
        }
    }
}

/// Wire shape of one event in the lake-status payload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PublishedEvent {
    pub booking_link: String,
    pub is_available: bool,
    pub begin_time: String,
    pub end_time: String,
    pub sale_start: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BookingBatch {
    pub variation: String,
    pub events: Vec<PublishedEvent>,
}

impl BookingBatch {
    pub fn new(variation: &str, details: &[EventDetails]) -> Self {
        Self {
            variation: variation.to_string(),
            events: details.iter().map(EventDetails::to_published).collect(),
        }
    }
}

/// ISO-8601 in UTC with a `Z` suffix; fractional seconds only when present.
pub fn utc_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
