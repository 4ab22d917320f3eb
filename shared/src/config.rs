use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::{UrlError, ValidatedUrl};
use crate::selection::RegionCode;
use crate::{AppError, ErrorKind};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3333";
pub const DEFAULT_GEODATA_BASE_URL: &str = "https://servicodados.ibge.gov.br/api/v1";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(String),

    #[error("{field}: {source}")]
    Url {
        field: &'static str,
        #[source]
        source: UrlError,
    },
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::new(ErrorKind::Configuration, e.to_string())
    }
}

/// Where the backend and the geodata service live. Shells send this in
/// `Event::Configure`; anything left out falls back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointConfig {
    pub api_base_url: String,
    pub geodata_base_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            geodata_base_url: DEFAULT_GEODATA_BASE_URL.to_string(),
        }
    }
}

impl EndpointConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn resolve(&self) -> Result<Endpoints, ConfigError> {
        let api = ValidatedUrl::new(&self.api_base_url).map_err(|source| ConfigError::Url {
            field: "api_base_url",
            source,
        })?;
        let geodata =
            ValidatedUrl::new(&self.geodata_base_url).map_err(|source| ConfigError::Url {
                field: "geodata_base_url",
                source,
            })?;
        Ok(Endpoints { api, geodata })
    }
}

/// Validated endpoint set; every URL the core requests comes from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    api: ValidatedUrl,
    geodata: ValidatedUrl,
}

impl Endpoints {
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api.as_str()
    }

    #[must_use]
    pub fn items(&self) -> String {
        self.api.join_segments(&["items"])
    }

    #[must_use]
    pub fn points(&self) -> String {
        self.api.join_segments(&["points"])
    }

    #[must_use]
    pub fn regions(&self) -> String {
        self.geodata.join_segments(&["localidades", "estados"])
    }

    #[must_use]
    pub fn localities(&self, region: &RegionCode) -> String {
        self.geodata
            .join_segments(&["localidades", "estados", region.as_str(), "municipios"])
    }
}
