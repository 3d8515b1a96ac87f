use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use super::base;
use super::{FetchError, HttpTransport, BOOKING_OFFICE};
use crate::config::VenueConfig;
use crate::models::RawEvent;

const EVENTS_PATH: &str = "homepage/calendar/events/";
const CATEGORY_FILTER: &str = "erleben";

#[derive(Debug, Deserialize)]
struct EventsPage {
    events: Vec<RawEvent>,
    meta: PageMeta,
}

#[derive(Debug, Deserialize)]
struct PageMeta {
    total_pages: u32,
}

pub fn events_url(config: &VenueConfig, page: u32) -> Result<Url, FetchError> {
    let mut url = base::endpoint(&config.endpoints.ticketing, EVENTS_PATH)?;
    // the filter key is sent with literal braces
    url.set_query(Some(&format!(
        "booking_office={BOOKING_OFFICE}&filter{{category}}={CATEGORY_FILTER}"
    )));
    url.query_pairs_mut()
        .append_pair("search", &config.search_query)
        .append_pair("page", &page.to_string());
    Ok(url)
}

/// Collects every calendar event matching the venue's search query, walking
/// pages from 1 until the reported total is reached.
pub fn list_events(
    transport: &dyn HttpTransport,
    config: &VenueConfig,
) -> Result<Vec<RawEvent>, FetchError> {
    let mut events = Vec::new();
    let mut page = 1;
    loop {
        let url = events_url(config, page)?;
        let payload: EventsPage = base::fetch_json(transport, &url)?;
        debug!(
            page,
            total_pages = payload.meta.total_pages,
            count = payload.events.len(),
            "fetched events page"
        );
        events.extend(payload.events);

        if page >= payload.meta.total_pages {
            break;
        }
        page += 1;
    }
    Ok(events)
}
