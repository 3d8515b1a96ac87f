use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{FetchError, HttpResponse, HttpTransport, TransportError};

const BODY_EXCERPT_LEN: usize = 512;

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|err| TransportError(err.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|err| TransportError(err.to_string()))?;
        read_response(response)
    }

    fn put_json(
        &self,
        url: &Url,
        bearer_token: &str,
        body: &Value,
    ) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .put(url.clone())
            .bearer_auth(bearer_token)
            .json(body)
            .send()
            .map_err(|err| TransportError(err.to_string()))?;
        read_response(response)
    }
}

fn read_response(response: reqwest::blocking::Response) -> Result<HttpResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .map_err(|err| TransportError(format!("unable to read response body: {err}")))?;
    Ok(HttpResponse { status, body })
}

/// GET `url` and decode the JSON body, failing on any non-success status.
pub fn fetch_json<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    url: &Url,
) -> Result<T, FetchError> {
    debug!(%url, "GET");
    let response = transport.get(url).map_err(|source| FetchError::Transport {
        url: url.to_string(),
        source,
    })?;
    if !response.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status,
            body: excerpt(&response.body),
        });
    }
    serde_json::from_str(&response.body).map_err(|source| FetchError::Parse {
        url: url.to_string(),
        source,
    })
}

/// Resolves `path` below `base`, keeping any path prefix `base` already has.
pub fn endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path)
}

pub fn excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

/// Converts a wall-clock time in some zone to a UTC instant.
pub trait ZoneConverter {
    fn to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>>;
}

#[derive(Debug, Clone, Copy)]
pub struct NamedZone(pub Tz);

impl NamedZone {
    pub fn berlin() -> Self {
        Self(chrono_tz::Europe::Berlin)
    }
}

impl Default for NamedZone {
    fn default() -> Self {
        Self::berlin()
    }
}

impl ZoneConverter for NamedZone {
    fn to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self.0.from_local_datetime(&local) {
            LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
            // repeated hour: take standard time
            LocalResult::Ambiguous(_, later) => Some(later.with_timezone(&Utc)),
            // skipped hour: keep the offset from before the jump
            LocalResult::None => {
                let before = self
                    .0
                    .from_local_datetime(&(local - Duration::hours(3)))
                    .earliest()?;
                let offset = before.offset().fix().local_minus_utc();
                let utc = local - Duration::seconds(i64::from(offset));
                Some(Utc.from_utc_datetime(&utc))
            }
        }
    }
}

/// Parses an ISO-8601 timestamp as a wall-clock value. Any offset present is
/// dropped.
pub fn parse_wall_clock(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%dT%H:%M%z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M%:z",
        "%Y-%m-%d %H:%M%z",
    ] {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(naive);
        }
    }
    // a bare date means midnight
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub fn localize(zone: &dyn ZoneConverter, raw: &str) -> Result<DateTime<Utc>, FetchError> {
    parse_wall_clock(raw)
        .and_then(|local| zone.to_utc(local))
        .ok_or_else(|| FetchError::Timestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .expect("valid rfc3339")
            .with_timezone(&Utc)
    }

    #[test]
    fn converts_summer_and_winter_berlin_times() {
        let zone = NamedZone::berlin();
        assert_eq!(
            localize(&zone, "2024-07-15T10:00:00").expect("summer"),
            utc("2024-07-15T08:00:00Z")
        );
        assert_eq!(
            localize(&zone, "2024-01-15T10:00:00").expect("winter"),
            utc("2024-01-15T09:00:00Z")
        );
    }

    #[test]
    fn converts_around_dst_transitions() {
        let zone = NamedZone::berlin();
        // last minute of CET before the spring jump, first minute of CEST after
        assert_eq!(
            localize(&zone, "2024-03-31T01:59:00").expect("before spring"),
            utc("2024-03-31T00:59:00Z")
        );
        assert_eq!(
            localize(&zone, "2024-03-31T03:00:00").expect("after spring"),
            utc("2024-03-31T01:00:00Z")
        );
        assert_eq!(
            localize(&zone, "2024-03-31T02:30:00").expect("skipped hour"),
            utc("2024-03-31T01:30:00Z")
        );
        assert_eq!(
            localize(&zone, "2024-10-27T02:30:00").expect("repeated hour"),
            utc("2024-10-27T01:30:00Z")
        );
        assert_eq!(
            localize(&zone, "2024-10-27T03:00:00").expect("after autumn"),
            utc("2024-10-27T02:00:00Z")
        );
    }

    #[test]
    fn embedded_offsets_are_ignored() {
        let zone = NamedZone::berlin();
        assert_eq!(
            localize(&zone, "2024-07-15T10:00:00+00:00").expect("offset"),
            utc("2024-07-15T08:00:00Z")
        );
        assert_eq!(
            localize(&zone, "2024-07-15 10:00").expect("space separated"),
            utc("2024-07-15T08:00:00Z")
        );
    }

    #[test]
    fn accepts_other_iso_shapes() {
        let zone = NamedZone::berlin();
        assert_eq!(
            localize(&zone, "2024-07-15T10:00:00+0200").expect("offset without colon"),
            utc("2024-07-15T08:00:00Z")
        );
        assert_eq!(
            localize(&zone, "2024-07-15 10:00+02:00").expect("minutes with offset"),
            utc("2024-07-15T08:00:00Z")
        );
        assert_eq!(
            localize(&zone, "2024-07-15").expect("date only"),
            utc("2024-07-14T22:00:00Z")
        );
        assert_eq!(
            localize(&zone, "2024-01-15").expect("winter date only"),
            utc("2024-01-14T23:00:00Z")
        );
    }

    #[test]
    fn rejects_garbage_timestamps() {
        let err = localize(&NamedZone::berlin(), "next tuesday").unwrap_err();
        assert!(matches!(err, FetchError::Timestamp(ref raw) if raw == "next tuesday"));
    }

    #[test]
    fn fetch_json_reports_status_and_parse_failures() {
        let url = Url::parse("http://ticketing.test/a").expect("url");
        let transport = MockTransport::new();
        transport.respond(url.as_str(), 503, "maintenance");
        let err = fetch_json::<Value>(&transport, &url).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));

        transport.respond(url.as_str(), 200, "{not json");
        let err = fetch_json::<Value>(&transport, &url).unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[test]
    fn endpoint_keeps_base_prefix() {
        let root = Url::parse("http://ticketing.test").expect("url");
        assert_eq!(
            endpoint(&root, "sale/events/7/").expect("join").as_str(),
            "http://ticketing.test/sale/events/7/"
        );
        let prefixed = Url::parse("http://proxy.test/ztix").expect("url");
        assert_eq!(
            endpoint(&prefixed, "sale/events/7/").expect("join").as_str(),
            "http://proxy.test/ztix/sale/events/7/"
        );
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        let long = "x".repeat(BODY_EXCERPT_LEN + 10);
        assert_eq!(excerpt(&long).chars().count(), BODY_EXCERPT_LEN + 1);
        assert_eq!(excerpt("short"), "short");
    }
}
