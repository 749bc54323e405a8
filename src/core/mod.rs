// geotag/src/core/mod.rs
mod orchestrator;
mod record;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::processors::{Axis, Hemisphere};

pub use orchestrator::{IngestionOrchestrator, PendingReview, SubmitOutcome};
pub use record::{
    Enrichment, Extracted, GeotagRecord, ImagePreview, Stage, NO_GPS_MESSAGE, UNAVAILABLE,
};

pub const DEFAULT_GEOCODE_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";
pub const DEFAULT_USER_AGENT: &str = concat!("geotag/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// What to do when a GPS coordinate is present but its hemisphere reference is not.
///
/// | policy    | missing latitude ref | missing longitude ref |
/// |-----------|----------------------|-----------------------|
/// | `Lenient` | `N`                  | `E`                   |
/// | `Strict`  | no coordinate        | no coordinate         |
///
/// Many devices leave the reference out when it is the positive hemisphere,
/// so `Lenient` is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HemisphereFallback {
    #[default]
    Lenient,
    Strict,
}

impl HemisphereFallback {
    pub fn resolve(self, reference: Option<Hemisphere>, axis: Axis) -> Option<Hemisphere> {
        match (reference, self) {
            (Some(reference), _) => Some(reference),
            (None, HemisphereFallback::Lenient) => Some(axis.positive()),
            (None, HemisphereFallback::Strict) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub geocode_endpoint: String,
    pub user_agent: String,
    pub geocode_timeout_secs: Option<u64>,
    pub enable_geocoding: bool,
    pub max_file_size: Option<u64>,
    pub hemisphere_fallback: HemisphereFallback,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            geocode_endpoint: DEFAULT_GEOCODE_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            geocode_timeout_secs: None,
            enable_geocoding: true,
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
            hemisphere_fallback: HemisphereFallback::default(),
        }
    }
}

impl IngestConfig {
    /// Reads a TOML config file. Keys left out keep their default value.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: IngestConfig = toml::from_str(&contents).map_err(|e| {
            GeotagError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let endpoint = reqwest::Url::parse(&self.geocode_endpoint).map_err(|e| {
            GeotagError::Config(format!(
                "Invalid geocode endpoint '{}': {}",
                self.geocode_endpoint, e
            ))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(GeotagError::Config(format!(
                "Geocode endpoint must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        if self.user_agent.trim().is_empty() {
            return Err(GeotagError::Config(
                "User agent must not be empty".to_string(),
            ));
        }

        if self.geocode_timeout_secs == Some(0) {
            return Err(GeotagError::Config(
                "Geocode timeout must be at least one second".to_string(),
            ));
        }

        if self.max_file_size == Some(0) {
            return Err(GeotagError::Config(
                "Maximum file size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum GeotagError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Cannot {operation} while the record is {stage}")]
    InvalidState {
        operation: &'static str,
        stage: Stage,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Memory limit exceeded: {0}")]
    MemoryLimitExceeded(String),
}

pub type Result<T> = std::result::Result<T, GeotagError>;
