use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lake_booking::config::VenueConfig;
use lake_booking::scraping::{NamedZone, ReqwestTransport};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match execute() {
        Ok(()) => {
            info!("Success.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Booking sync failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute() -> Result<()> {
    let config = VenueConfig::from_env().context("unable to resolve venue configuration")?;
    let transport = ReqwestTransport::new(&config.endpoints.user_agent)
        .context("unable to build http client")?;

    let report = lake_booking::run(&config, &transport, &NamedZone::berlin(), Utc::now())
        .with_context(|| format!("run for {} aborted", config.venue.selector()))?;
    info!(
        listed = report.listed,
        published = report.published,
        "booking sync finished"
    );
    Ok(())
}
