use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use super::base::{self, ZoneConverter};
use super::{FetchError, HttpTransport, BOOKING_OFFICE};
use crate::config::VenueConfig;
use crate::models::{EventDetails, RawEvent};

/// Product names that represent a regular swim ticket. Matching is exact.
pub const TICKET_PRODUCTS: &[&str] = &["Einzelkarte"];

#[derive(Debug, Deserialize)]
struct DetailResponse {
    begin_time: Option<String>,
    end_time: Option<String>,
    #[serde(default)]
    sale_configs: Vec<SaleConfig>,
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct SaleConfig {
    start_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Product {
    pub name: String,
    pub is_available: bool,
}

pub fn detail_url(config: &VenueConfig, event_id: &str) -> Result<Url, FetchError> {
    let mut url = base::endpoint(&config.endpoints.ticketing, "sale/events/")?;
    url.path_segments_mut()
        .map_err(|_| FetchError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .push(event_id)
        .push("");
    url.query_pairs_mut()
        .append_pair("booking_office", BOOKING_OFFICE);
    Ok(url)
}

pub fn fetch_details(
    transport: &dyn HttpTransport,
    config: &VenueConfig,
    zone: &dyn ZoneConverter,
    event: &RawEvent,
) -> Result<EventDetails, FetchError> {
    let event_id = event.id();
    let url = detail_url(config, &event_id)?;
    let data: DetailResponse = base::fetch_json(transport, &url)?;

    let missing = |field: &'static str| FetchError::MissingField {
        event_id: event_id.clone(),
        field,
    };

    let begin_time = data
        .begin_time
        .as_deref()
        .ok_or_else(|| missing("begin_time"))?;
    let begin_time = base::localize(zone, begin_time)?;
    let end_time = data.end_time.as_deref().ok_or_else(|| missing("end_time"))?;
    let end_time = base::localize(zone, end_time)?;
    let sale_start = data
        .sale_configs
        .first()
        .ok_or_else(|| missing("sale_configs"))?
        .start_date
        .as_deref()
        .ok_or_else(|| missing("sale_configs[0].start_date"))?;
    let sale_start = base::localize(zone, sale_start)?;

    let details = EventDetails {
        booking_link: fix_booking_link(&event.link),
        begin_time,
        end_time,
        sale_start,
        is_available: availability(&data.products, TICKET_PRODUCTS),
    };
    debug!(event_id = %event_id, "{details}");
    Ok(details)
}

/// The first product whose name is in `names` decides; no match means
/// not bookable.
pub fn availability(products: &[Product], names: &[&str]) -> bool {
    products
        .iter()
        .find(|product| names.contains(&product.name.as_str()))
        .map(|product| product.is_available)
        .unwrap_or(false)
}

/// The source links contain a doubled slash after `hp`.
pub fn fix_booking_link(link: &str) -> String {
    link.replace("hp//", "hp/")
}
