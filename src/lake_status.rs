use reqwest::Url;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::VenueConfig;
use crate::models::{BookingBatch, EventDetails};
use crate::scraping::base::{endpoint, excerpt};
use crate::scraping::{HttpTransport, TransportError};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("http error: {0}")]
    Http(#[from] TransportError),
    #[error("lake status api error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
}

pub struct LakePublisher<'a> {
    transport: &'a dyn HttpTransport,
    url: Url,
    token: &'a str,
    variation: &'a str,
}

impl<'a> LakePublisher<'a> {
    pub fn from_config(
        transport: &'a dyn HttpTransport,
        config: &'a VenueConfig,
    ) -> Result<Self, PublishError> {
        Ok(Self {
            transport,
            url: booking_url(config)?,
            token: &config.api_key,
            variation: &config.display_name,
        })
    }

    /// Sends every event in a single PUT, including an empty batch.
    pub fn publish(&self, events: &[EventDetails]) -> Result<usize, PublishError> {
        let batch = BookingBatch::new(self.variation, events);
        let body = serde_json::to_value(&batch)?;

        debug!(url = %self.url, "PUT");
        let response = self.transport.put_json(&self.url, self.token, &body)?;
        if !response.is_success() {
            return Err(PublishError::Api {
                status: response.status,
                body: excerpt(&response.body),
            });
        }

        info!("Published {} events", batch.events.len());
        Ok(batch.events.len())
    }
}

pub fn booking_url(config: &VenueConfig) -> Result<Url, url::ParseError> {
    endpoint(
        &config.endpoints.lake_status,
        &format!("lake/{}/booking", config.venue_id),
    )
}
