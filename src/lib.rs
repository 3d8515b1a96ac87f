pub mod config;
pub mod filter;
pub mod lake_status;
pub mod models;
pub mod scraping;
#[cfg(test)]
mod testing;

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use config::VenueConfig;
use lake_status::{LakePublisher, PublishError};
use scraping::{FetchError, HttpTransport, ZoneConverter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Listing,
    Detailing,
    Filtering,
    Publishing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Listing => "listing",
            Stage::Detailing => "detailing",
            Stage::Filtering => "filtering",
            Stage::Publishing => "publishing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("publish error: {0}")]
    Publish(#[from] PublishError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub listed: usize,
    pub published: usize,
}

/// One complete pass: list, detail each event in turn, filter against `now`,
/// then publish everything that survived in a single request. The first
/// failure aborts the run and nothing is published.
pub fn run(
    config: &VenueConfig,
    transport: &dyn HttpTransport,
    zone: &dyn ZoneConverter,
    now: DateTime<Utc>,
) -> Result<RunReport, RunError> {
    let mut stage = Stage::Listing;
    info!(%stage, venue = config.venue.selector(), "starting run");
    let events = scraping::list_events(transport, config)?;
    info!(
        "Got a list of {} events, proceeding to request details...",
        events.len()
    );

    stage = Stage::Detailing;
    info!(%stage, "fetching event details");
    let details = events
        .iter()
        .map(|event| scraping::fetch_details(transport, config, zone, event))
        .collect::<Result<Vec<_>, _>>()?;

    stage = Stage::Filtering;
    let publishable = filter::retain_publishable(details, now);
    info!(%stage, kept = publishable.len(), total = events.len(), "filtered events");

    stage = Stage::Publishing;
    info!(%stage, "publishing to lake status api");
    let published = LakePublisher::from_config(transport, config)?.publish(&publishable)?;

    stage = Stage::Done;
    info!(%stage, "run complete");
    Ok(RunReport {
        listed: events.len(),
        published,
    })
}
