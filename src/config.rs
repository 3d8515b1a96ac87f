use std::{collections::HashMap, env, fmt, path::Path};

use reqwest::Url;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_TICKETING_API_URL: &str = "https://api.ztix-technik.de";
pub const DEFAULT_LAKE_STATUS_API_URL: &str = "https://api.woog.life";

const SELECTOR_VAR: &str = "LAKE_NAME";
const API_KEY_VAR: &str = "API_KEY";
const TICKETING_URL_VAR: &str = "TICKETING_API_URL";
const LAKE_STATUS_URL_VAR: &str = "LAKE_STATUS_API_URL";
const USER_AGENT_VAR: &str = "BOOKING_USER_AGENT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid or unset 'LAKE_NAME': {0:?}")]
    UnknownVenue(Option<String>),
    #[error("missing environment variable {0}")]
    MissingVariable(&'static str),
    #[error("{var} is not a valid uuid: {source}")]
    InvalidUuid {
        var: &'static str,
        #[source]
        source: uuid::Error,
    },
    #[error("{var} is not a valid url: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("unable to read .env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// One of the swim venues this tool knows how to publish for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue {
    WoogFamily,
    WoogIsland,
    Muehlchen,
}

impl Venue {
    pub const ALL: [Venue; 3] = [Venue::WoogFamily, Venue::WoogIsland, Venue::Muehlchen];

    pub fn from_selector(selector: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|venue| venue.selector() == selector)
    }

    pub fn selector(self) -> &'static str {
        match self {
            Venue::WoogFamily => "woog-family",
            Venue::WoogIsland => "woog-island",
            Venue::Muehlchen => "muehlchen",
        }
    }

    /// Environment variable holding the lake id the venue publishes under.
    /// Both Woog bathing spots share the same lake.
    pub fn id_variable(self) -> &'static str {
        match self {
            Venue::WoogFamily | Venue::WoogIsland => "LARGE_WOOG_UUID",
            Venue::Muehlchen => "ARHEILGER_MUEHLCHEN_UUID",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Venue::WoogFamily => "Badestelle Familienbad",
            Venue::WoogIsland => "Woog Badestelle Insel",
            Venue::Muehlchen => "Naturbadesee Arheilger Mühlchen",
        }
    }

    pub fn search_query(self) -> &'static str {
        match self {
            Venue::WoogFamily => "Landgraf-Georg-Straße 121 * 64287 Darmstadt",
            Venue::WoogIsland => "Heinrich-Fuhr-Str. 20 * 64287 Darmstadt",
            Venue::Muehlchen => "Brücherweg 1 * 64291 Darmstadt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub ticketing: Url,
    pub lake_status: Url,
    pub user_agent: String,
}

impl Endpoints {
    pub fn resolve<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            ticketing: url_or_default(lookup, TICKETING_URL_VAR, DEFAULT_TICKETING_API_URL)?,
            lake_status: url_or_default(
                lookup,
                LAKE_STATUS_URL_VAR,
                DEFAULT_LAKE_STATUS_API_URL,
            )?,
            user_agent: lookup(USER_AGENT_VAR)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(default_user_agent),
        })
    }
}

#[derive(Clone)]
pub struct VenueConfig {
    pub venue: Venue,
    pub venue_id: Uuid,
    pub display_name: String,
    pub search_query: String,
    pub api_key: String,
    pub endpoints: Endpoints,
}

impl fmt::Debug for VenueConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VenueConfig")
            .field("venue", &self.venue)
            .field("venue_id", &self.venue_id)
            .field("display_name", &self.display_name)
            .field("search_query", &self.search_query)
            .field("api_key", &"<redacted>")
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl VenueConfig {
    /// Loads `.env` (if present) and resolves the configuration from the
    /// process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_env_file(None)?;
        Self::resolve(|key| env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::resolve(|key| vars.get(key).cloned())
    }

    pub fn resolve<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let selector = lookup(SELECTOR_VAR);
        let venue = selector
            .as_deref()
            .map(str::trim)
            .and_then(Venue::from_selector)
            .ok_or(ConfigError::UnknownVenue(selector.clone()))?;

        let id_var = venue.id_variable();
        let raw_id = required(&lookup, id_var)?;
        let venue_id = Uuid::parse_str(raw_id.trim())
            .map_err(|source| ConfigError::InvalidUuid { var: id_var, source })?;

        let api_key = required(&lookup, API_KEY_VAR)?.trim().to_string();

        let endpoints = Endpoints::resolve(&lookup)?;

        Ok(Self {
            venue,
            venue_id,
            display_name: venue.display_name().to_string(),
            search_query: venue.search_query().to_string(),
            api_key,
            endpoints,
        })
    }
}

/// Loads `path`, or the nearest `.env` when no path is given. A missing
/// file is not an error.
pub fn load_env_file(path: Option<&Path>) -> Result<bool, ConfigError> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|_| ()),
        None => dotenvy::dotenv().map(|_| ()),
    };
    match loaded {
        Ok(()) => Ok(true),
        Err(err) if err.not_found() => Ok(false),
        Err(err) => Err(ConfigError::EnvFile(err)),
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingVariable(var))
}

fn url_or_default<F>(lookup: &F, var: &'static str, default: &str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(var)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { var, source })
}

fn default_user_agent() -> String {
    format!("lake-booking/{}", env!("CARGO_PKG_VERSION"))
}
