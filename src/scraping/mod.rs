pub mod base;
pub mod ztix_details;
pub mod ztix_events;

use reqwest::Url;
use serde_json::Value;
use thiserror::Error;

pub use base::{NamedZone, ReqwestTransport, ZoneConverter};
pub use ztix_details::fetch_details;
pub use ztix_events::list_events;

/// Ticketing API scope shared by every request.
pub const BOOKING_OFFICE: &str = "129";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Blocking HTTP seam between the pipeline and the network.
pub trait HttpTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse, TransportError>;
    fn put_json(
        &self,
        url: &Url,
        bearer_token: &str,
        body: &Value,
    ) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },
    #[error("non-success status {status} for {url}: {body}")]
    Status { url: String, status: u16, body: String },
    #[error("malformed response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("event {event_id} is missing {field}")]
    MissingField {
        event_id: String,
        field: &'static str,
    },
    #[error("unparsable timestamp {0:?}")]
    Timestamp(String),
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
}
